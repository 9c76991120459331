use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::db::{comments, posts, users};
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::routes::format_datetime;
use crate::routes::home::Html;
use crate::state::AppState;

// -- View structs --

pub struct AdminUserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub is_admin: bool,
}

pub struct AdminPostRow {
    pub id: String,
    pub title: String,
    pub author_username: String,
    pub created_at: String,
    pub comment_count: i64,
}

// -- Templates --

#[derive(Template)]
#[template(path = "pages/admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub current_user: Option<CurrentUser>,
    pub total_users: i64,
    pub total_posts: i64,
    pub total_comments: i64,
}

#[derive(Template)]
#[template(path = "pages/admin/users.html")]
pub struct AdminUsersTemplate {
    pub current_user: Option<CurrentUser>,
    pub users: Vec<AdminUserRow>,
}

#[derive(Template)]
#[template(path = "pages/admin/posts.html")]
pub struct AdminPostsTemplate {
    pub current_user: Option<CurrentUser>,
    pub posts: Vec<AdminPostRow>,
}

#[derive(Template)]
#[template(path = "pages/admin/forbidden.html")]
pub struct AdminForbiddenTemplate {
    pub current_user: Option<CurrentUser>,
}

// -- Router --

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard))
        .route("/admin/users", get(list_users))
        .route("/admin/posts", get(list_posts))
}

fn forbidden(user: CurrentUser) -> Response {
    (
        StatusCode::FORBIDDEN,
        Html(AdminForbiddenTemplate {
            current_user: Some(user),
        }),
    )
        .into_response()
}

// -- Handlers --

/// GET /admin — counts dashboard, allowlisted users only
pub async fn dashboard(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    if !user.is_admin {
        return Ok(forbidden(user));
    }

    let conn = state.db.get()?;
    let total_users = users::count(&conn)?;
    let total_posts = posts::count(&conn)?;
    let total_comments: i64 =
        conn.query_row("SELECT COUNT(*) FROM comments", [], |row| row.get(0))?;

    Ok(Html(AdminDashboardTemplate {
        current_user: Some(user),
        total_users,
        total_posts,
        total_comments,
    })
    .into_response())
}

/// GET /admin/users — every account, newest first
pub async fn list_users(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    if !user.is_admin {
        return Ok(forbidden(user));
    }

    let conn = state.db.get()?;
    let rows = users::list(&conn)?
        .into_iter()
        .map(|u| AdminUserRow {
            is_admin: state.config.is_admin(&u.email, &u.username),
            id: u.id,
            username: u.username,
            email: u.email,
            created_at: format_datetime(&u.created_at),
        })
        .collect();

    Ok(Html(AdminUsersTemplate {
        current_user: Some(user),
        users: rows,
    })
    .into_response())
}

/// GET /admin/posts — the 50 most recent posts
pub async fn list_posts(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    if !user.is_admin {
        return Ok(forbidden(user));
    }

    let conn = state.db.get()?;
    let rows = posts::list(&conn, 0, 50)?
        .into_iter()
        .map(|p| {
            let author_username = users::by_id(&conn, &p.author_id)?
                .map(|u| u.username)
                .unwrap_or_else(|| "unknown".to_string());
            let comment_count = comments::count_by_post(&conn, &p.id)?;
            Ok(AdminPostRow {
                id: p.id,
                title: p.title,
                author_username,
                created_at: format_datetime(&p.created_at),
                comment_count,
            })
        })
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Html(AdminPostsTemplate {
        current_user: Some(user),
        posts: rows,
    })
    .into_response())
}
