use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::db::models::TagUsage;
use crate::db::{posts, tags, users};
use crate::error::AppResult;
use crate::extractors::{CurrentUser, MaybeUser};
use crate::routes::{post_summaries, PageQuery, Pagination, PostSummary};
use crate::state::AppState;

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub current_user: Option<CurrentUser>,
    pub posts: Vec<PostSummary>,
    pub post_count: i64,
    pub user_count: i64,
    pub popular_tags: Vec<TagUsage>,
    pub pagination: Pagination,
}

#[derive(Template)]
#[template(path = "pages/search.html")]
pub struct SearchTemplate {
    pub current_user: Option<CurrentUser>,
    pub query: String,
    pub posts: Vec<PostSummary>,
    pub total_results: i64,
    pub pagination: Pagination,
}

#[derive(Template)]
#[template(path = "pages/tag.html")]
pub struct TagTemplate {
    pub current_user: Option<CurrentUser>,
    pub tag_name: String,
    pub posts: Vec<PostSummary>,
    pub total_posts: i64,
    pub pagination: Pagination,
}

/// GET / — paginated front page, newest posts first
pub async fn index(
    State(state): State<AppState>,
    Query(page_query): Query<PageQuery>,
    MaybeUser(current_user): MaybeUser,
) -> AppResult<Html<HomeTemplate>> {
    let (page, per_page, offset) = page_query.resolve();

    let conn = state.db.get()?;
    let post_count = posts::count(&conn)?;
    let user_count = users::count(&conn)?;
    let page_posts = posts::list(&conn, offset, per_page)?;
    let posts = post_summaries(&conn, page_posts)?;
    let popular_tags = tags::popular(&conn, 10)?;

    Ok(Html(HomeTemplate {
        current_user,
        posts,
        post_count,
        user_count,
        popular_tags,
        pagination: Pagination::new(page, per_page, post_count),
    }))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// GET /search?q= — case-insensitive substring search over title+content
pub async fn search(
    State(state): State<AppState>,
    Query(search_query): Query<SearchQuery>,
    MaybeUser(current_user): MaybeUser,
) -> AppResult<Html<SearchTemplate>> {
    let (page, per_page, offset) = PageQuery {
        page: search_query.page,
        per_page: search_query.per_page,
    }
    .resolve();
    // Cap query length like the form does
    let query: String = search_query.q.chars().take(100).collect();

    let conn = state.db.get()?;
    let total_results = posts::count_search(&conn, &query)?;
    let page_posts = posts::search(&conn, &query, offset, per_page)?;
    let posts = post_summaries(&conn, page_posts)?;

    Ok(Html(SearchTemplate {
        current_user,
        query,
        posts,
        total_results,
        pagination: Pagination::new(page, per_page, total_results),
    }))
}

/// GET /tag/{name} — posts carrying the tag
pub async fn posts_by_tag(
    State(state): State<AppState>,
    Path(tag_name): Path<String>,
    Query(page_query): Query<PageQuery>,
    MaybeUser(current_user): MaybeUser,
) -> AppResult<Html<TagTemplate>> {
    let (page, per_page, offset) = page_query.resolve();

    let conn = state.db.get()?;
    let total_posts = posts::count_by_tag(&conn, &tag_name)?;
    let page_posts = posts::by_tag(&conn, &tag_name, offset, per_page)?;
    let posts = post_summaries(&conn, page_posts)?;

    Ok(Html(TagTemplate {
        current_user,
        tag_name,
        posts,
        total_posts,
        pagination: Pagination::new(page, per_page, total_posts),
    }))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
