//! Password hashing with bcrypt.

/// Hash a plaintext password at the default cost.
pub fn hash(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// Verify a plaintext password against a stored hash.
/// Any parse/verify failure counts as a mismatch.
pub fn verify(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}
