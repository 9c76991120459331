use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Router};
use serde::Deserialize;

use crate::db::{comments, posts};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;

pub const MAX_COMMENT_LENGTH: usize = 2000;

#[derive(Deserialize)]
pub struct CreateCommentForm {
    pub content: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/{id}/comments/", post(create_comment))
        .route(
            "/posts/{id}/comments/{comment_id}/delete",
            post(delete_comment),
        )
}

fn see_other(location: String) -> Response {
    (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response()
}

/// POST /posts/{id}/comments/ — add a comment, back to the post
pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    user: CurrentUser,
    Form(form): Form<CreateCommentForm>,
) -> AppResult<Response> {
    let content = form.content.trim().to_string();
    if content.is_empty() {
        return Err(AppError::BadRequest("Comment cannot be empty".into()));
    }
    if content.chars().count() > MAX_COMMENT_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Comment must be {} characters or less",
            MAX_COMMENT_LENGTH
        )));
    }

    let conn = state.db.get()?;
    posts::get(&conn, &post_id)?.ok_or(AppError::NotFound)?;
    comments::create(&conn, &post_id, &user.id, &content)?;

    Ok(see_other(format!("/posts/{}", post_id)))
}

/// POST /posts/{id}/comments/{comment_id}/delete — 404 when missing,
/// 403 when not the author
pub async fn delete_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(String, String)>,
    user: CurrentUser,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let comment = comments::get(&conn, &comment_id)?.ok_or(AppError::NotFound)?;

    if comment.author_id != user.id {
        return Err(AppError::Forbidden);
    }

    comments::delete(&conn, &comment_id, &user.id)?;

    Ok(see_other(format!("/posts/{}", post_id)))
}
