pub mod admin;
pub mod assets;
pub mod auth;
pub mod comments;
pub mod home;
pub mod posts;
pub mod profile;
pub mod reactions;

use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::Deserialize;

use crate::db::models::Post;
use crate::db::{comments as db_comments, reactions as db_reactions, tags as db_tags, users};

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 50;

/// 1-indexed pagination query parameters.
#[derive(Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageQuery {
    /// Clamped (page, per_page, offset).
    pub fn resolve(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        (page, per_page, (page - 1) * per_page)
    }
}

/// Ceiling division, with a floor of one page so empty listings still
/// render "page 1 of 1".
pub fn total_pages(total: i64, per_page: i64) -> i64 {
    ((total + per_page - 1) / per_page).max(1)
}

/// Pagination state handed to templates.
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        }
    }
}

/// Listing-card view of a post.
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_username: String,
    pub image_filename: Option<String>,
    pub created_at: String,
    pub tags: Vec<String>,
    pub comment_count: i64,
    pub like_count: i64,
    pub dislike_count: i64,
}

/// Build listing cards for a page of posts.
pub fn post_summaries(
    conn: &Connection,
    posts: Vec<Post>,
) -> rusqlite::Result<Vec<PostSummary>> {
    posts
        .into_iter()
        .map(|post| {
            let author_username = users::by_id(conn, &post.author_id)?
                .map(|u| u.username)
                .unwrap_or_else(|| "unknown".to_string());
            let tags = db_tags::for_post(conn, &post.id)?
                .into_iter()
                .map(|t| t.name)
                .collect();
            let comment_count = db_comments::count_by_post(conn, &post.id)?;
            let (like_count, dislike_count) = db_reactions::counts(conn, &post.id)?;

            Ok(PostSummary {
                id: post.id,
                title: post.title,
                content: post.content,
                author_username,
                image_filename: post.image_filename,
                created_at: format_datetime(&post.created_at),
                tags,
                comment_count,
                like_count,
                dislike_count,
            })
        })
        .collect()
}

/// Render a DB timestamp ("YYYY-MM-DD HH:MM:SS") for display; unparsable
/// input comes back untouched.
pub fn format_datetime(db_time: &str) -> String {
    NaiveDateTime::parse_from_str(db_time, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_else(|_| db_time.to_string())
}
