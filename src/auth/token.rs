//! Signed, time-limited bearer tokens.
//!
//! A token encodes the username in the `sub` claim and expires after the
//! configured lifetime. Verification failures of any kind (bad signature,
//! expired, malformed) collapse to `None`.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

fn algorithm(auth: &AuthConfig) -> Algorithm {
    auth.algorithm.parse().unwrap_or(Algorithm::HS256)
}

/// Issue a token for `subject`, valid for `auth.token_expire_minutes`.
pub fn create(auth: &AuthConfig, subject: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let expires_at = chrono::Utc::now() + chrono::Duration::minutes(auth.token_expire_minutes as i64);
    let claims = Claims {
        sub: subject.to_string(),
        exp: expires_at.timestamp() as usize,
    };

    encode(
        &Header::new(algorithm(auth)),
        &claims,
        &EncodingKey::from_secret(auth.secret_key.as_bytes()),
    )
}

/// Verify a token and return its subject, or `None` if invalid or expired.
pub fn verify(auth: &AuthConfig, token: &str) -> Option<String> {
    let validation = Validation::new(algorithm(auth));
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.secret_key.as_bytes()),
        &validation,
    )
    .map(|data| data.claims.sub)
    .ok()
}
