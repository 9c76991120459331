use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::auth::token;
use crate::db::users::{self, NewUser};
use crate::error::AppResult;
use crate::extractors::{CurrentUser, MaybeUser};
use crate::routes::home::Html;
use crate::state::AppState;

pub const MIN_PASSWORD_LENGTH: usize = 6;

// -- Templates --

#[derive(Template)]
#[template(path = "pages/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<CurrentUser>,
    pub errors: Vec<String>,
    pub email: String,
    pub username: String,
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
    pub email: String,
    pub next: String,
}

// -- Forms --

#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// -- Cookie helpers --

fn auth_cookie(name: &str, token: &str, max_age_minutes: u64) -> String {
    format!(
        "{}=Bearer {}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name,
        token,
        max_age_minutes * 60
    )
}

fn clear_auth_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

// -- Handlers --

/// GET /register
pub async fn register_page(MaybeUser(current_user): MaybeUser) -> Html<RegisterTemplate> {
    Html(RegisterTemplate {
        current_user,
        errors: Vec::new(),
        email: String::new(),
        username: String::new(),
    })
}

/// POST /register — validate, create the user, redirect to /login.
/// Validation failures re-render the form with inline errors.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let email = form.email.trim().to_string();
    let username = form.username.trim().to_string();

    let mut errors = Vec::new();

    if form.password != form.confirm_password {
        errors.push("Passwords do not match".to_string());
    }
    if form.password.len() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    if username.chars().count() < 3 || username.chars().count() > 50 {
        errors.push("Username must be between 3 and 50 characters".to_string());
    }

    let conn = state.db.get()?;
    if users::by_email(&conn, &email)?.is_some() {
        errors.push("A user with this email already exists".to_string());
    }
    if users::by_username(&conn, &username)?.is_some() {
        errors.push("A user with this name already exists".to_string());
    }

    if !errors.is_empty() {
        return Ok(Html(RegisterTemplate {
            current_user: None,
            errors,
            email,
            username,
        })
        .into_response());
    }

    users::create(
        &conn,
        NewUser {
            email: &email,
            username: &username,
            password: &form.password,
        },
    )?;

    Ok(Redirect::to("/login").into_response())
}

/// GET /login
pub async fn login_page(
    Query(query): Query<NextQuery>,
    MaybeUser(current_user): MaybeUser,
) -> Html<LoginTemplate> {
    Html(LoginTemplate {
        current_user,
        error: None,
        email: String::new(),
        next: query.next.unwrap_or_else(|| "/".to_string()),
    })
}

/// POST /login — verify credentials, set the bearer cookie, redirect to
/// `next`. Wrong password and unknown email render the same inline error
/// and set no cookie.
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let next = query.next.unwrap_or_else(|| "/".to_string());

    let conn = state.db.get()?;
    let user = users::authenticate(&conn, form.email.trim(), &form.password)?;

    let user = match user {
        Some(user) => user,
        None => {
            return Ok(Html(LoginTemplate {
                current_user: None,
                error: Some("Invalid email or password".to_string()),
                email: form.email,
                next,
            })
            .into_response());
        }
    };

    let access_token = token::create(&state.config.auth, &user.username)
        .map_err(|e| crate::error::AppError::Internal(format!("Token signing failed: {}", e)))?;

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, next),
            (
                header::SET_COOKIE,
                auth_cookie(
                    &state.config.auth.cookie_name,
                    &access_token,
                    state.config.auth.token_expire_minutes,
                ),
            ),
        ],
    )
        .into_response())
}

/// GET /logout — clear the cookie and go home
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/".to_string()),
            (
                header::SET_COOKIE,
                clear_auth_cookie(&state.config.auth.cookie_name),
            ),
        ],
    )
        .into_response()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}
