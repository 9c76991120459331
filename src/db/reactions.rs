use rusqlite::{params, Connection, OptionalExtension};

use crate::db::models::Reaction;

/// Upsert-toggle a reaction:
/// - no existing row: insert
/// - existing row with the same value: delete it (toggle off), returns `None`
/// - existing row with the opposite value: flip it, refreshing created_at
///
/// The UNIQUE(post_id, user_id) constraint keeps concurrent racers from
/// ever producing a second row.
pub fn react(
    conn: &Connection,
    post_id: &str,
    user_id: &str,
    is_like: bool,
) -> rusqlite::Result<Option<Reaction>> {
    let existing = of_user(conn, post_id, user_id)?;

    match existing {
        Some(reaction) if reaction.is_like == is_like => {
            conn.execute(
                "DELETE FROM reactions WHERE post_id = ?1 AND user_id = ?2",
                params![post_id, user_id],
            )?;
            Ok(None)
        }
        Some(reaction) => {
            conn.execute(
                "UPDATE reactions SET is_like = ?1, created_at = datetime('now') WHERE id = ?2",
                params![is_like, reaction.id],
            )?;
            get(conn, &reaction.id)
        }
        None => {
            let id = uuid::Uuid::now_v7().to_string();
            conn.execute(
                "INSERT INTO reactions (id, post_id, user_id, is_like) VALUES (?1, ?2, ?3, ?4)",
                params![id, post_id, user_id, is_like],
            )?;
            get(conn, &id)
        }
    }
}

fn get(conn: &Connection, id: &str) -> rusqlite::Result<Option<Reaction>> {
    conn.query_row(
        "SELECT * FROM reactions WHERE id = ?1",
        params![id],
        Reaction::from_row,
    )
    .optional()
}

/// The user's reaction to a post, if any.
pub fn of_user(
    conn: &Connection,
    post_id: &str,
    user_id: &str,
) -> rusqlite::Result<Option<Reaction>> {
    conn.query_row(
        "SELECT * FROM reactions WHERE post_id = ?1 AND user_id = ?2",
        params![post_id, user_id],
        Reaction::from_row,
    )
    .optional()
}

/// (likes, dislikes) for a post.
pub fn counts(conn: &Connection, post_id: &str) -> rusqlite::Result<(i64, i64)> {
    conn.query_row(
        "SELECT
            COALESCE(SUM(CASE WHEN is_like = 1 THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN is_like = 0 THEN 1 ELSE 0 END), 0)
         FROM reactions WHERE post_id = ?1",
        params![post_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
}

/// Remove the user's reaction outright.
pub fn remove(conn: &Connection, post_id: &str, user_id: &str) -> rusqlite::Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM reactions WHERE post_id = ?1 AND user_id = ?2",
        params![post_id, user_id],
    )?;
    Ok(deleted > 0)
}

pub fn likes_given(conn: &Connection, user_id: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM reactions WHERE user_id = ?1 AND is_like = 1",
        params![user_id],
        |row| row.get(0),
    )
}

pub fn dislikes_given(conn: &Connection, user_id: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM reactions WHERE user_id = ?1 AND is_like = 0",
        params![user_id],
        |row| row.get(0),
    )
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

    fn row_count(conn: &Connection, post_id: &str, user_id: &str) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM reactions WHERE post_id = ?1 AND user_id = ?2",
            params![post_id, user_id],
            |r| r.get(0),
        )
        .unwrap()
    }

    #[test]
    fn like_then_like_again_removes() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let (user_id, post_id) = seed(&conn);

        let first = react(&conn, &post_id, &user_id, true).unwrap();
        assert!(first.is_some());
        assert_eq!(counts(&conn, &post_id).unwrap(), (1, 0));

        let second = react(&conn, &post_id, &user_id, true).unwrap();
        assert!(second.is_none());
        assert_eq!(counts(&conn, &post_id).unwrap(), (0, 0));
        assert_eq!(row_count(&conn, &post_id, &user_id), 0);
    }

    #[test]
    fn like_then_dislike_flips() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let (user_id, post_id) = seed(&conn);

        react(&conn, &post_id, &user_id, true).unwrap();
        let flipped = react(&conn, &post_id, &user_id, false).unwrap().unwrap();
        assert!(!flipped.is_like);
        assert_eq!(counts(&conn, &post_id).unwrap(), (0, 1));

        // Never more than one row per (post, user)
        assert_eq!(row_count(&conn, &post_id, &user_id), 1);
    }

    #[test]
    fn of_user_reports_current_state() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let (user_id, post_id) = seed(&conn);

        assert!(of_user(&conn, &post_id, &user_id).unwrap().is_none());
        react(&conn, &post_id, &user_id, false).unwrap();
        let reaction = of_user(&conn, &post_id, &user_id).unwrap().unwrap();
        assert!(!reaction.is_like);
    }

    #[test]
    fn remove_deletes_any_reaction() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let (user_id, post_id) = seed(&conn);

        assert!(!remove(&conn, &post_id, &user_id).unwrap());
        react(&conn, &post_id, &user_id, true).unwrap();
        assert!(remove(&conn, &post_id, &user_id).unwrap());
        assert_eq!(counts(&conn, &post_id).unwrap(), (0, 0));
    }

    #[test]
    fn duplicate_insert_hits_unique_constraint() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let (user_id, post_id) = seed(&conn);

        react(&conn, &post_id, &user_id, true).unwrap();
        // A raw second insert (simulating a lost race) is refused by the
        // UNIQUE(post_id, user_id) constraint.
        let result = conn.execute(
            "INSERT INTO reactions (id, post_id, user_id, is_like) VALUES (?1, ?2, ?3, 0)",
            params![uuid::Uuid::now_v7().to_string(), post_id, user_id],
        );
        assert!(result.is_err());
    }

    #[test]
    fn per_user_stats() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let (user_id, post_id) = seed(&conn);
        let other_post = posts::create(
            &conn,
            NewPost {
                title: "other",
                content: "content",
                author_id: &user_id,
                image_filename: None,
            },
            &[],
        )
        .unwrap();

        react(&conn, &post_id, &user_id, true).unwrap();
        react(&conn, &other_post.id, &user_id, false).unwrap();

        assert_eq!(likes_given(&conn, &user_id).unwrap(), 1);
        assert_eq!(dislikes_given(&conn, &user_id).unwrap(), 1);
    }
}
