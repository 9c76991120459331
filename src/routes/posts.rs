use askama::Template;
use axum::extract::{Multipart, Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::models::{Post, Tag};
use crate::db::{comments, posts, reactions, tags, users};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser};
use crate::routes::format_datetime;
use crate::routes::home::Html;
use crate::state::AppState;
use crate::upload;

pub const MAX_TITLE_LENGTH: usize = 200;

// -- View structs --

pub struct CommentView {
    pub id: String,
    pub username: String,
    pub content: String,
    pub created_at: String,
    pub can_delete: bool,
}

// -- Templates --

#[derive(Template)]
#[template(path = "pages/create_post.html")]
pub struct CreatePostTemplate {
    pub current_user: Option<CurrentUser>,
}

#[derive(Template)]
#[template(path = "pages/edit_post.html")]
pub struct EditPostTemplate {
    pub current_user: Option<CurrentUser>,
    pub post: Post,
}

#[derive(Template)]
#[template(path = "pages/post_detail.html")]
pub struct PostDetailTemplate {
    pub current_user: Option<CurrentUser>,
    pub post: Post,
    pub author_username: String,
    pub created_at: String,
    pub tags: Vec<String>,
    pub comments: Vec<CommentView>,
    pub comment_count: i64,
    pub like_count: i64,
    pub dislike_count: i64,
    pub user_liked: bool,
    pub user_disliked: bool,
    pub is_owner: bool,
}

// -- Forms --

#[derive(Deserialize)]
pub struct EditPostForm {
    pub title: String,
    pub content: String,
}

// -- JSON API types --

#[derive(Serialize)]
pub struct ApiUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct ApiPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub image_filename: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub tags: Vec<Tag>,
    pub author: ApiUser,
}

#[derive(Deserialize)]
pub struct ApiListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct ApiCreatePost {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image_filename: Option<String>,
}

#[derive(Deserialize)]
pub struct ApiUpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

// -- Router --

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/", get(list_posts_api).post(create_post_api))
        .route("/posts/create", get(create_post_page).post(create_post))
        .route(
            "/posts/{id}",
            get(post_detail).put(update_post_api).delete(delete_post_api),
        )
        .route("/posts/{id}/api", get(read_post_api))
        .route("/posts/{id}/edit", get(edit_post_page).post(edit_post))
        .route("/posts/{id}/delete", post(delete_post))
}

// -- Validation --

fn validate_post_input(title: &str, content: &str) -> Result<(), AppError> {
    if title.is_empty() {
        return Err(AppError::BadRequest("Title cannot be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Title must be {} characters or less",
            MAX_TITLE_LENGTH
        )));
    }
    if content.is_empty() {
        return Err(AppError::BadRequest("Content cannot be empty".into()));
    }
    Ok(())
}

fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

// -- Page handlers --

/// GET /posts/create — anonymous visitors are bounced to login
pub async fn create_post_page(MaybeUser(current_user): MaybeUser) -> Response {
    if current_user.is_none() {
        return Redirect::to("/login?next=/posts/create").into_response();
    }
    Html(CreatePostTemplate { current_user }).into_response()
}

/// POST /posts/create — multipart form: title, content, tags, optional image
pub async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut title = String::new();
    let mut content = String::new();
    let mut tags_raw = String::new();
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Invalid multipart body: {}", e))
    })? {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("title") => {
                title = field
                    .text()
                    .await
                    .map_err(|_| AppError::BadRequest("Invalid title field".into()))?
                    .trim()
                    .to_string();
            }
            Some("content") => {
                content = field
                    .text()
                    .await
                    .map_err(|_| AppError::BadRequest("Invalid content field".into()))?
                    .trim()
                    .to_string();
            }
            Some("tags") => {
                tags_raw = field
                    .text()
                    .await
                    .map_err(|_| AppError::BadRequest("Invalid tags field".into()))?;
            }
            Some("image") => {
                let filename = field.file_name().map(|f| f.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::BadRequest("Image upload failed".into()))?;
                if let Some(filename) = filename.filter(|f| !f.is_empty()) {
                    if !bytes.is_empty() {
                        image = Some((filename, bytes.to_vec()));
                    }
                }
            }
            _ => {}
        }
    }

    validate_post_input(&title, &content)?;

    let image_filename = match image {
        Some((filename, bytes)) => Some(upload::save(
            state.config.uploads_path(),
            &state.config.uploads,
            &filename,
            &bytes,
        )?),
        None => None,
    };

    let conn = state.db.get()?;
    posts::create(
        &conn,
        posts::NewPost {
            title: &title,
            content: &content,
            author_id: &user.id,
            image_filename: image_filename.as_deref(),
        },
        &parse_tag_list(&tags_raw),
    )?;

    Ok(Redirect::to("/").into_response())
}

/// GET /posts/{id} — post detail with comments and reactions
pub async fn post_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    MaybeUser(current_user): MaybeUser,
) -> AppResult<Html<PostDetailTemplate>> {
    let conn = state.db.get()?;
    let post = posts::get(&conn, &id)?.ok_or(AppError::NotFound)?;

    let author_username = users::by_id(&conn, &post.author_id)?
        .map(|u| u.username)
        .unwrap_or_else(|| "unknown".to_string());
    let tag_names = tags::for_post(&conn, &post.id)?
        .into_iter()
        .map(|t| t.name)
        .collect();

    let current_user_id = current_user.as_ref().map(|u| u.id.clone());
    let comment_rows = comments::list_by_post(&conn, &post.id, 0, 100)?;
    let comment_count = comments::count_by_post(&conn, &post.id)?;
    let comment_views = comment_rows
        .into_iter()
        .map(|c| {
            let username = users::by_id(&conn, &c.author_id)?
                .map(|u| u.username)
                .unwrap_or_else(|| "unknown".to_string());
            let can_delete = current_user_id.as_deref() == Some(c.author_id.as_str());
            Ok(CommentView {
                id: c.id,
                username,
                content: c.content,
                created_at: format_datetime(&c.created_at),
                can_delete,
            })
        })
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let (like_count, dislike_count) = reactions::counts(&conn, &post.id)?;
    let user_reaction = match &current_user_id {
        Some(uid) => reactions::of_user(&conn, &post.id, uid)?.map(|r| r.is_like),
        None => None,
    };
    let user_liked = user_reaction == Some(true);
    let user_disliked = user_reaction == Some(false);
    let is_owner = current_user_id.as_deref() == Some(post.author_id.as_str());
    let created_at = format_datetime(&post.created_at);

    Ok(Html(PostDetailTemplate {
        current_user,
        post,
        author_username,
        created_at,
        tags: tag_names,
        comments: comment_views,
        comment_count,
        like_count,
        dislike_count,
        user_liked,
        user_disliked,
        is_owner,
    }))
}

/// GET /posts/{id}/edit — owner only, 404 otherwise
pub async fn edit_post_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
) -> AppResult<Html<EditPostTemplate>> {
    let conn = state.db.get()?;
    let post = posts::get(&conn, &id)?
        .filter(|p| p.author_id == user.id)
        .ok_or(AppError::NotFound)?;

    Ok(Html(EditPostTemplate {
        current_user: Some(user),
        post,
    }))
}

/// POST /posts/{id}/edit — update title/content, owner only
pub async fn edit_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
    Form(form): Form<EditPostForm>,
) -> AppResult<Response> {
    let title = form.title.trim().to_string();
    let content = form.content.trim().to_string();
    validate_post_input(&title, &content)?;

    let conn = state.db.get()?;
    posts::update(
        &conn,
        &id,
        &user.id,
        posts::PostUpdate {
            title: Some(title),
            content: Some(content),
            tags: None,
        },
    )?
    .ok_or(AppError::NotFound)?;

    Ok(Redirect::to(&format!("/posts/{}", id)).into_response())
}

/// POST /posts/{id}/delete — owner only, cascades comments/reactions
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    if !posts::delete(&conn, &id, &user.id)? {
        return Err(AppError::NotFound);
    }
    Ok(Redirect::to("/").into_response())
}

// -- JSON API handlers --

fn api_post(conn: &rusqlite::Connection, post: Post) -> rusqlite::Result<ApiPost> {
    let author = users::by_id(conn, &post.author_id)?
        .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
    let post_tags = tags::for_post(conn, &post.id)?;

    Ok(ApiPost {
        id: post.id,
        title: post.title,
        content: post.content,
        author_id: post.author_id,
        image_filename: post.image_filename,
        created_at: post.created_at,
        updated_at: post.updated_at,
        tags: post_tags,
        author: ApiUser {
            id: author.id,
            email: author.email,
            username: author.username,
            created_at: author.created_at,
        },
    })
}

/// GET /posts/ — JSON list
pub async fn list_posts_api(
    State(state): State<AppState>,
    Query(query): Query<ApiListQuery>,
) -> AppResult<Json<Vec<ApiPost>>> {
    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let conn = state.db.get()?;
    let page = posts::list(&conn, skip, limit)?;
    let out = page
        .into_iter()
        .map(|p| api_post(&conn, p))
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(Json(out))
}

/// POST /posts/ — JSON create
pub async fn create_post_api(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<ApiCreatePost>,
) -> AppResult<Json<ApiPost>> {
    let title = body.title.trim().to_string();
    let content = body.content.trim().to_string();
    validate_post_input(&title, &content)?;

    let conn = state.db.get()?;
    let post = posts::create(
        &conn,
        posts::NewPost {
            title: &title,
            content: &content,
            author_id: &user.id,
            image_filename: body.image_filename.as_deref(),
        },
        &body.tags,
    )?;
    Ok(Json(api_post(&conn, post)?))
}

/// GET /posts/{id}/api — JSON detail
pub async fn read_post_api(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiPost>> {
    let conn = state.db.get()?;
    let post = posts::get(&conn, &id)?.ok_or(AppError::NotFound)?;
    Ok(Json(api_post(&conn, post)?))
}

/// PUT /posts/{id} — JSON update, owner only
pub async fn update_post_api(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
    Json(body): Json<ApiUpdatePost>,
) -> AppResult<Json<ApiPost>> {
    let conn = state.db.get()?;
    let post = posts::update(
        &conn,
        &id,
        &user.id,
        posts::PostUpdate {
            title: body.title,
            content: body.content,
            tags: body.tags,
        },
    )?
    .ok_or(AppError::NotFound)?;
    Ok(Json(api_post(&conn, post)?))
}

/// DELETE /posts/{id} — JSON delete, owner only
pub async fn delete_post_api(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    if !posts::delete(&conn, &id, &user.id)? {
        return Err(AppError::NotFound);
    }
    Ok(Json(serde_json::json!({ "message": "Post deleted successfully" })))
}
