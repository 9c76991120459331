use rusqlite::{params, Connection, OptionalExtension};

use crate::db::models::{Tag, TagUsage};

pub fn by_name(conn: &Connection, name: &str) -> rusqlite::Result<Option<Tag>> {
    conn.query_row(
        "SELECT * FROM tags WHERE name = ?1",
        params![name],
        Tag::from_row,
    )
    .optional()
}

/// Fetch a tag by exact name, creating it on first use.
pub fn get_or_create(conn: &Connection, name: &str) -> rusqlite::Result<Tag> {
    if let Some(tag) = by_name(conn, name)? {
        return Ok(tag);
    }

    let id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO tags (id, name) VALUES (?1, ?2)
         ON CONFLICT(name) DO NOTHING",
        params![id, name],
    )?;

    by_name(conn, name)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

/// All tags, ordered by name.
pub fn list(conn: &Connection) -> rusqlite::Result<Vec<Tag>> {
    let mut stmt = conn.prepare("SELECT * FROM tags ORDER BY name")?;
    let tags = stmt
        .query_map([], Tag::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

/// Tags ranked by how many posts carry them, most used first.
/// Tags with no posts are not included.
pub fn popular(conn: &Connection, limit: i64) -> rusqlite::Result<Vec<TagUsage>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name, t.created_at, COUNT(pt.post_id) AS post_count
         FROM tags t
         JOIN post_tags pt ON pt.tag_id = t.id
         GROUP BY t.id
         ORDER BY post_count DESC, t.name
         LIMIT ?1",
    )?;

    let usages = stmt
        .query_map(params![limit], |row| {
            Ok(TagUsage {
                tag: Tag {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    created_at: row.get("created_at")?,
                },
                post_count: row.get("post_count")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(usages)
}

/// Names of the tags attached to a post, ordered by name.
pub fn for_post(conn: &Connection, post_id: &str) -> rusqlite::Result<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.* FROM tags t
         JOIN post_tags pt ON pt.tag_id = t.id
         WHERE pt.post_id = ?1
         ORDER BY t.name",
    )?;
    let tags = stmt
        .query_map(params![post_id], Tag::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}
