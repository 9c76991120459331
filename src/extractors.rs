use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::auth::token;
use crate::db::users;
use crate::error::AppError;
use crate::state::AppState;

/// Represents the currently authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
}

/// Extractor that requires authentication.
/// Missing/malformed cookie, bad or expired token, and unknown username
/// all reject with 401.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state)?.ok_or(AppError::Unauthorized)
    }
}

/// Optional user extractor — returns None instead of 401 when not
/// authenticated.
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(resolve_user(parts, state)?))
    }
}

fn resolve_user(parts: &Parts, state: &AppState) -> Result<Option<CurrentUser>, AppError> {
    let cookie = match get_cookie_value(parts, &state.config.auth.cookie_name) {
        Some(value) => value,
        None => return Ok(None),
    };

    // Cookie carries "Bearer <token>"
    let raw_token = match cookie.strip_prefix("Bearer ") {
        Some(token) => token,
        None => return Ok(None),
    };

    let username = match token::verify(&state.config.auth, raw_token) {
        Some(subject) => subject,
        None => return Ok(None),
    };

    let conn = state.db.get()?;
    let user = users::by_username(&conn, &username)?;

    Ok(user.map(|u| {
        let is_admin = state.config.is_admin(&u.email, &u.username);
        CurrentUser {
            id: u.id,
            email: u.email,
            username: u.username,
            is_admin,
        }
    }))
}

pub fn get_cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name {
                Some(val)
            } else {
                None
            }
        })
}
