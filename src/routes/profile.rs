use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use crate::auth::password;
use crate::db::{comments, posts, reactions, users};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser};
use crate::routes::home::Html;
use crate::routes::{format_datetime, post_summaries, PageQuery, Pagination, PostSummary};
use crate::routes::auth::MIN_PASSWORD_LENGTH;
use crate::state::AppState;

// -- View structs --

pub struct ProfileStats {
    pub posts_count: i64,
    pub comments_count: i64,
    pub likes_given: i64,
    pub dislikes_given: i64,
}

pub struct ProfileComment {
    pub post_id: String,
    pub content: String,
    pub created_at: String,
}

// -- Templates --

#[derive(Template)]
#[template(path = "pages/profile.html")]
pub struct ProfileTemplate {
    pub current_user: Option<CurrentUser>,
    pub profile_username: String,
    pub profile_joined: String,
    pub is_owner: bool,
    pub tab: String,
    pub stats: ProfileStats,
    pub posts: Vec<PostSummary>,
    pub comments: Vec<ProfileComment>,
    pub pagination: Pagination,
    pub message: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/change_password.html")]
pub struct ChangePasswordTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
}

// -- Queries / forms --

#[derive(Deserialize)]
pub struct ProfileQuery {
    pub tab: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

// -- Router --

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(my_profile))
        .route("/profile/{username}", get(user_profile))
        .route(
            "/change-password",
            get(change_password_page).post(change_password),
        )
}

// -- Handlers --

/// GET /profile — redirect to the caller's own profile
pub async fn my_profile(user: CurrentUser) -> Response {
    Redirect::to(&format!("/profile/{}", user.username)).into_response()
}

/// GET /profile/{username} — stats plus a tabbed, paginated listing
/// (tab = posts | liked | comments)
pub async fn user_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<ProfileQuery>,
    MaybeUser(current_user): MaybeUser,
) -> AppResult<Html<ProfileTemplate>> {
    let (page, per_page, offset) = PageQuery {
        page: query.page,
        per_page: query.per_page,
    }
    .resolve();
    let tab = query.tab.unwrap_or_else(|| "posts".to_string());

    let conn = state.db.get()?;
    let profile_user = users::by_username(&conn, &username)?.ok_or(AppError::NotFound)?;

    let stats = ProfileStats {
        posts_count: posts::count_by_author(&conn, &profile_user.id)?,
        comments_count: comments::count_by_author(&conn, &profile_user.id)?,
        likes_given: reactions::likes_given(&conn, &profile_user.id)?,
        dislikes_given: reactions::dislikes_given(&conn, &profile_user.id)?,
    };

    let mut post_views = Vec::new();
    let mut comment_views = Vec::new();
    let total_items = match tab.as_str() {
        "liked" => {
            let liked = posts::liked_by(&conn, &profile_user.id, offset, per_page)?;
            post_views = post_summaries(&conn, liked)?;
            stats.likes_given
        }
        "comments" => {
            comment_views = comments::by_author(&conn, &profile_user.id, offset, per_page)?
                .into_iter()
                .map(|c| ProfileComment {
                    post_id: c.post_id,
                    content: c.content,
                    created_at: format_datetime(&c.created_at),
                })
                .collect();
            stats.comments_count
        }
        _ => {
            let own = posts::by_author(&conn, &profile_user.id, offset, per_page)?;
            post_views = post_summaries(&conn, own)?;
            stats.posts_count
        }
    };

    let is_owner = current_user
        .as_ref()
        .map(|u| u.id == profile_user.id)
        .unwrap_or(false);

    Ok(Html(ProfileTemplate {
        current_user,
        profile_username: profile_user.username,
        profile_joined: format_datetime(&profile_user.created_at),
        is_owner,
        tab,
        stats,
        posts: post_views,
        comments: comment_views,
        pagination: Pagination::new(page, per_page, total_items),
        message: query.message,
    }))
}

/// GET /change-password
pub async fn change_password_page(user: CurrentUser) -> Html<ChangePasswordTemplate> {
    Html(ChangePasswordTemplate {
        current_user: Some(user),
        error: None,
    })
}

/// POST /change-password — verify the current password, confirm the new
/// one, then redirect to the profile with a flash message
pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<ChangePasswordForm>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let account = users::by_id(&conn, &user.id)?.ok_or(AppError::Unauthorized)?;

    let error = if !password::verify(&form.current_password, &account.password_hash) {
        Some("Current password is incorrect".to_string())
    } else if form.new_password != form.confirm_password {
        Some("New passwords do not match".to_string())
    } else if form.new_password.len() < MIN_PASSWORD_LENGTH {
        Some(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ))
    } else {
        None
    };

    if let Some(error) = error {
        return Ok(Html(ChangePasswordTemplate {
            current_user: Some(user),
            error: Some(error),
        })
        .into_response());
    }

    users::update_password(&conn, &user.id, &form.new_password)?;

    Ok(Redirect::to(&format!(
        "/profile/{}?message=Password+changed",
        user.username
    ))
    .into_response())
}
