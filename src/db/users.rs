use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::password;
use crate::db::models::User;

pub struct NewUser<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

/// Create a user, hashing the password. Fails on duplicate email/username
/// via the unique constraints.
pub fn create(conn: &Connection, new_user: NewUser) -> rusqlite::Result<User> {
    let id = uuid::Uuid::now_v7().to_string();
    let password_hash = password::hash(new_user.password).map_err(|e| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(e))
    })?;

    conn.execute(
        "INSERT INTO users (id, email, username, password_hash) VALUES (?1, ?2, ?3, ?4)",
        params![id, new_user.email, new_user.username, password_hash],
    )?;

    by_id(conn, &id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

pub fn by_id(conn: &Connection, id: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT * FROM users WHERE id = ?1",
        params![id],
        User::from_row,
    )
    .optional()
}

pub fn by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT * FROM users WHERE email = ?1",
        params![email],
        User::from_row,
    )
    .optional()
}

pub fn by_username(conn: &Connection, username: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT * FROM users WHERE username = ?1",
        params![username],
        User::from_row,
    )
    .optional()
}

/// Look up by email and check the password. `None` for unknown email or
/// wrong password alike.
pub fn authenticate(
    conn: &Connection,
    email: &str,
    password_plain: &str,
) -> rusqlite::Result<Option<User>> {
    let user = by_email(conn, email)?;
    Ok(user.filter(|u| password::verify(password_plain, &u.password_hash)))
}

pub fn update_password(
    conn: &Connection,
    user_id: &str,
    new_password: &str,
) -> rusqlite::Result<()> {
    let password_hash = password::hash(new_password).map_err(|e| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(e))
    })?;
    conn.execute(
        "UPDATE users SET password_hash = ?1 WHERE id = ?2",
        params![password_hash, user_id],
    )?;
    Ok(())
}

pub fn count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
}

/// All users, newest first. Admin listing only.
pub fn list(conn: &Connection) -> rusqlite::Result<Vec<User>> {
    let mut stmt = conn.prepare("SELECT * FROM users ORDER BY created_at DESC, id DESC")?;
    let users = stmt
        .query_map([], User::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}
