use rusqlite::{params, Connection, OptionalExtension};

use crate::db::models::Comment;

pub fn create(
    conn: &Connection,
    post_id: &str,
    author_id: &str,
    content: &str,
) -> rusqlite::Result<Comment> {
    let id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO comments (id, content, author_id, post_id) VALUES (?1, ?2, ?3, ?4)",
        params![id, content, author_id, post_id],
    )?;

    get(conn, &id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

pub fn get(conn: &Connection, id: &str) -> rusqlite::Result<Option<Comment>> {
    conn.query_row(
        "SELECT * FROM comments WHERE id = ?1",
        params![id],
        Comment::from_row,
    )
    .optional()
}

/// Comments on a post, newest first.
pub fn list_by_post(
    conn: &Connection,
    post_id: &str,
    offset: i64,
    limit: i64,
) -> rusqlite::Result<Vec<Comment>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM comments WHERE post_id = ?1
         ORDER BY created_at DESC, id DESC
         LIMIT ?2 OFFSET ?3",
    )?;
    let comments = stmt
        .query_map(params![post_id, limit, offset], Comment::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(comments)
}

pub fn count_by_post(conn: &Connection, post_id: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM comments WHERE post_id = ?1",
        params![post_id],
        |row| row.get(0),
    )
}

pub fn by_author(
    conn: &Connection,
    author_id: &str,
    offset: i64,
    limit: i64,
) -> rusqlite::Result<Vec<Comment>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM comments WHERE author_id = ?1
         ORDER BY created_at DESC, id DESC
         LIMIT ?2 OFFSET ?3",
    )?;
    let comments = stmt
        .query_map(params![author_id, limit, offset], Comment::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(comments)
}

pub fn count_by_author(conn: &Connection, author_id: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM comments WHERE author_id = ?1",
        params![author_id],
        |row| row.get(0),
    )
}

/// Update a comment's content when `author_id` owns it. Returns the
/// updated comment, or `None` when missing or owned by someone else.
pub fn update(
    conn: &Connection,
    id: &str,
    author_id: &str,
    content: &str,
) -> rusqlite::Result<Option<Comment>> {
    let changed = conn.execute(
        "UPDATE comments SET content = ?1, updated_at = datetime('now')
         WHERE id = ?2 AND author_id = ?3",
        params![content, id, author_id],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    get(conn, id)
}

/// Delete a comment when `author_id` owns it.
pub fn delete(conn: &Connection, id: &str, author_id: &str) -> rusqlite::Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM comments WHERE id = ?1 AND author_id = ?2",
        params![id, author_id],
    )?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::posts::{self, NewPost};
    use crate::db::test_pool;
    use crate::db::users::{self, NewUser};

    fn seed(conn: &Connection) -> (String, String) {
        let user_id = users::create(
            conn,
            NewUser {
                email: "alice@x.com",
                username: "alice",
                password: "secret1",
            },
        )
        .unwrap()
        .id;
        let post = posts::create(
            conn,
            NewPost {
                title: "post",
                content: "content",
                author_id: &user_id,
                image_filename: None,
            },
            &[],
        )
        .unwrap();
        (user_id, post.id)
    }

    #[test]
    fn create_list_count() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let (user_id, post_id) = seed(&conn);

        create(&conn, &post_id, &user_id, "first").unwrap();
        create(&conn, &post_id, &user_id, "second").unwrap();

        assert_eq!(count_by_post(&conn, &post_id).unwrap(), 2);
        let listed = list_by_post(&conn, &post_id, 0, 100).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].content, "second"); // newest first
        assert_eq!(count_by_author(&conn, &user_id).unwrap(), 2);
    }

    #[test]
    fn update_respects_ownership() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let (user_id, post_id) = seed(&conn);
        let other = users::create(
            &conn,
            NewUser {
                email: "bob@x.com",
                username: "bob",
                password: "secret1",
            },
        )
        .unwrap()
        .id;

        let comment = create(&conn, &post_id, &user_id, "original").unwrap();

        assert!(update(&conn, &comment.id, &other, "hijacked")
            .unwrap()
            .is_none());
        let updated = update(&conn, &comment.id, &user_id, "edited")
            .unwrap()
            .unwrap();
        assert_eq!(updated.content, "edited");
    }

    #[test]
    fn delete_respects_ownership() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let (user_id, post_id) = seed(&conn);
        let other = users::create(
            &conn,
            NewUser {
                email: "bob@x.com",
                username: "bob",
                password: "secret1",
            },
        )
        .unwrap()
        .id;

        let comment = create(&conn, &post_id, &user_id, "hello").unwrap();

        assert!(!delete(&conn, &comment.id, &other).unwrap());
        assert!(get(&conn, &comment.id).unwrap().is_some());
        assert!(delete(&conn, &comment.id, &user_id).unwrap());
        assert!(get(&conn, &comment.id).unwrap().is_none());
    }
}
