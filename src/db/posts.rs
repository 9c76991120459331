use rusqlite::{params, Connection, OptionalExtension};

use crate::db::models::Post;
use crate::db::tags;

pub struct NewPost<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub author_id: &'a str,
    pub image_filename: Option<&'a str>,
}

#[derive(Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    /// `Some` replaces the full tag set; `None` leaves tags untouched.
    pub tags: Option<Vec<String>>,
}

/// Create a post and attach its tags (get-or-create by exact name).
/// Blank tag names are skipped.
pub fn create(
    conn: &Connection,
    new_post: NewPost,
    tag_names: &[String],
) -> rusqlite::Result<Post> {
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO posts (id, title, content, author_id, image_filename)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id,
            new_post.title,
            new_post.content,
            new_post.author_id,
            new_post.image_filename
        ],
    )?;

    link_tags(conn, &id, tag_names)?;

    get(conn, &id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

fn link_tags(conn: &Connection, post_id: &str, tag_names: &[String]) -> rusqlite::Result<()> {
    for name in tag_names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let tag = tags::get_or_create(conn, name)?;
        conn.execute(
            "INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?1, ?2)",
            params![post_id, tag.id],
        )?;
    }
    Ok(())
}

pub fn get(conn: &Connection, id: &str) -> rusqlite::Result<Option<Post>> {
    conn.query_row(
        "SELECT * FROM posts WHERE id = ?1",
        params![id],
        Post::from_row,
    )
    .optional()
}

/// Posts newest-first. `id` breaks same-second timestamp ties (v7 ids sort
/// by creation time).
pub fn list(conn: &Connection, offset: i64, limit: i64) -> rusqlite::Result<Vec<Post>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM posts ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
    )?;
    let posts = stmt
        .query_map(params![limit, offset], Post::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

pub fn count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))
}

/// Case-insensitive substring search over title and content, newest-first.
pub fn search(
    conn: &Connection,
    query: &str,
    offset: i64,
    limit: i64,
) -> rusqlite::Result<Vec<Post>> {
    let pattern = format!("%{}%", query);
    let mut stmt = conn.prepare(
        "SELECT * FROM posts
         WHERE title LIKE ?1 OR content LIKE ?1
         ORDER BY created_at DESC, id DESC
         LIMIT ?2 OFFSET ?3",
    )?;
    let posts = stmt
        .query_map(params![pattern, limit, offset], Post::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

pub fn count_search(conn: &Connection, query: &str) -> rusqlite::Result<i64> {
    let pattern = format!("%{}%", query);
    conn.query_row(
        "SELECT COUNT(*) FROM posts WHERE title LIKE ?1 OR content LIKE ?1",
        params![pattern],
        |row| row.get(0),
    )
}

/// Posts carrying the named tag, newest-first.
pub fn by_tag(
    conn: &Connection,
    tag_name: &str,
    offset: i64,
    limit: i64,
) -> rusqlite::Result<Vec<Post>> {
    let mut stmt = conn.prepare(
        "SELECT p.* FROM posts p
         JOIN post_tags pt ON pt.post_id = p.id
         JOIN tags t ON t.id = pt.tag_id
         WHERE t.name = ?1
         ORDER BY p.created_at DESC, p.id DESC
         LIMIT ?2 OFFSET ?3",
    )?;
    let posts = stmt
        .query_map(params![tag_name, limit, offset], Post::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

pub fn count_by_tag(conn: &Connection, tag_name: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM posts p
         JOIN post_tags pt ON pt.post_id = p.id
         JOIN tags t ON t.id = pt.tag_id
         WHERE t.name = ?1",
        params![tag_name],
        |row| row.get(0),
    )
}

pub fn by_author(
    conn: &Connection,
    author_id: &str,
    offset: i64,
    limit: i64,
) -> rusqlite::Result<Vec<Post>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM posts WHERE author_id = ?1
         ORDER BY created_at DESC, id DESC
         LIMIT ?2 OFFSET ?3",
    )?;
    let posts = stmt
        .query_map(params![author_id, limit, offset], Post::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

pub fn count_by_author(conn: &Connection, author_id: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM posts WHERE author_id = ?1",
        params![author_id],
        |row| row.get(0),
    )
}

/// Posts the user has liked, most recent like first.
pub fn liked_by(
    conn: &Connection,
    user_id: &str,
    offset: i64,
    limit: i64,
) -> rusqlite::Result<Vec<Post>> {
    let mut stmt = conn.prepare(
        "SELECT p.* FROM posts p
         JOIN reactions r ON r.post_id = p.id
         WHERE r.user_id = ?1 AND r.is_like = 1
         ORDER BY r.created_at DESC, r.id DESC
         LIMIT ?2 OFFSET ?3",
    )?;
    let posts = stmt
        .query_map(params![user_id, limit, offset], Post::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

/// Update title/content (and optionally replace tags) when `author_id`
/// owns the post. Returns the updated post, or `None` when the post is
/// missing or owned by someone else.
pub fn update(
    conn: &Connection,
    id: &str,
    author_id: &str,
    update: PostUpdate,
) -> rusqlite::Result<Option<Post>> {
    let owned: Option<String> = conn
        .query_row(
            "SELECT id FROM posts WHERE id = ?1 AND author_id = ?2",
            params![id, author_id],
            |row| row.get(0),
        )
        .optional()?;
    if owned.is_none() {
        return Ok(None);
    }

    if let Some(title) = &update.title {
        conn.execute(
            "UPDATE posts SET title = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![title, id],
        )?;
    }
    if let Some(content) = &update.content {
        conn.execute(
            "UPDATE posts SET content = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![content, id],
        )?;
    }
    if let Some(tag_names) = &update.tags {
        conn.execute("DELETE FROM post_tags WHERE post_id = ?1", params![id])?;
        link_tags(conn, id, tag_names)?;
    }

    get(conn, id)
}

/// Delete a post owned by `author_id`, removing its reactions and comments
/// first. The schema-level cascade covers them too; the explicit deletes
/// keep the write set visible in one place.
pub fn delete(conn: &Connection, id: &str, author_id: &str) -> rusqlite::Result<bool> {
    let owned: Option<String> = conn
        .query_row(
            "SELECT id FROM posts WHERE id = ?1 AND author_id = ?2",
            params![id, author_id],
            |row| row.get(0),
        )
        .optional()?;
    if owned.is_none() {
        return Ok(false);
    }

    conn.execute("BEGIN IMMEDIATE", [])?;

    let result: rusqlite::Result<()> = (|| {
        conn.execute("DELETE FROM reactions WHERE post_id = ?1", params![id])?;
        conn.execute("DELETE FROM comments WHERE post_id = ?1", params![id])?;
        conn.execute("DELETE FROM post_tags WHERE post_id = ?1", params![id])?;
        conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        Ok(())
    })();

    match result {
        Ok(()) => {
            conn.execute("COMMIT", [])?;
            Ok(true)
        }
        Err(e) => {
            let _ = conn.execute("ROLLBACK", []);
            Err(e)
        }
    }
}
