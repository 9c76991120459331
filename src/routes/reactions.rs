use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;

use crate::db::{posts, reactions};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/{id}/like", post(like_post))
        .route("/posts/{id}/dislike", post(dislike_post))
        .route("/posts/{id}/remove-reaction", post(remove_reaction))
}

/// Redirect back to wherever the reaction was clicked from.
fn back_to_referer(headers: &HeaderMap, post_id: &str) -> Response {
    let location = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("/posts/{}", post_id));
    (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response()
}

async fn react(
    state: AppState,
    headers: HeaderMap,
    post_id: String,
    user: CurrentUser,
    is_like: bool,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    posts::get(&conn, &post_id)?.ok_or(AppError::NotFound)?;
    reactions::react(&conn, &post_id, &user.id, is_like)?;

    Ok(back_to_referer(&headers, &post_id))
}

/// POST /posts/{id}/like — toggle a like
pub async fn like_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    user: CurrentUser,
    headers: HeaderMap,
) -> AppResult<Response> {
    react(state, headers, post_id, user, true).await
}

/// POST /posts/{id}/dislike — toggle a dislike
pub async fn dislike_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    user: CurrentUser,
    headers: HeaderMap,
) -> AppResult<Response> {
    react(state, headers, post_id, user, false).await
}

/// POST /posts/{id}/remove-reaction — drop any reaction outright
pub async fn remove_reaction(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    user: CurrentUser,
    headers: HeaderMap,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    reactions::remove(&conn, &post_id, &user.id)?;

    Ok(back_to_referer(&headers, &post_id))
}
