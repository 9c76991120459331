//! End-to-end flows through the data-access layer: authoring, tagging,
//! search, reactions, and cascade deletes.

use scrawl::db::{self, comments, posts, reactions, tags, users};
use tempfile::TempDir;

fn create_test_db() -> (TempDir, scrawl::state::DbPool) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let pool = db::create_pool(&db_path).expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");
    (temp_dir, pool)
}

fn register_alice(conn: &rusqlite::Connection) -> scrawl::db::models::User {
    users::create(
        conn,
        users::NewUser {
            email: "alice@x.com",
            username: "alice",
            password: "secret1",
        },
    )
    .unwrap()
}

#[test]
fn tagged_post_appears_in_tag_listing_and_search_until_deleted() {
    let (_tmp, pool) = create_test_db();
    let conn = pool.get().unwrap();
    let alice = register_alice(&conn);

    let post = posts::create(
        &conn,
        posts::NewPost {
            title: "Hello",
            content: "World",
            author_id: &alice.id,
            image_filename: None,
        },
        &["a".to_string(), "b".to_string()],
    )
    .unwrap();

    // Tag listing includes the post
    let tagged = posts::by_tag(&conn, "a", 0, 10).unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].title, "Hello");

    // Search finds it
    let found = posts::search(&conn, "Hello", 0, 10).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(posts::count_search(&conn, "Hello").unwrap(), 1);

    // Deleting removes it from both
    assert!(posts::delete(&conn, &post.id, &alice.id).unwrap());
    assert!(posts::by_tag(&conn, "a", 0, 10).unwrap().is_empty());
    assert_eq!(posts::count_search(&conn, "Hello").unwrap(), 0);
}

#[test]
fn post_delete_leaves_no_orphaned_comments_or_reactions() {
    let (_tmp, pool) = create_test_db();
    let conn = pool.get().unwrap();
    let alice = register_alice(&conn);
    let bob = users::create(
        &conn,
        users::NewUser {
            email: "bob@x.com",
            username: "bob",
            password: "secret2",
        },
    )
    .unwrap();

    let post = posts::create(
        &conn,
        posts::NewPost {
            title: "Doomed",
            content: "Soon gone",
            author_id: &alice.id,
            image_filename: None,
        },
        &[],
    )
    .unwrap();

    comments::create(&conn, &post.id, &bob.id, "nice one").unwrap();
    comments::create(&conn, &post.id, &alice.id, "thanks").unwrap();
    reactions::react(&conn, &post.id, &bob.id, true).unwrap();
    reactions::react(&conn, &post.id, &alice.id, false).unwrap();

    assert!(posts::delete(&conn, &post.id, &alice.id).unwrap());

    let orphan_comments: i64 = conn
        .query_row("SELECT COUNT(*) FROM comments", [], |r| r.get(0))
        .unwrap();
    let orphan_reactions: i64 = conn
        .query_row("SELECT COUNT(*) FROM reactions", [], |r| r.get(0))
        .unwrap();
    let orphan_links: i64 = conn
        .query_row("SELECT COUNT(*) FROM post_tags", [], |r| r.get(0))
        .unwrap();
    assert_eq!(orphan_comments, 0);
    assert_eq!(orphan_reactions, 0);
    assert_eq!(orphan_links, 0);
}

#[test]
fn reaction_toggles_are_idempotent_in_pairs() {
    let (_tmp, pool) = create_test_db();
    let conn = pool.get().unwrap();
    let alice = register_alice(&conn);

    let post = posts::create(
        &conn,
        posts::NewPost {
            title: "Reactions",
            content: "body",
            author_id: &alice.id,
            image_filename: None,
        },
        &[],
    )
    .unwrap();

    // like, like → gone
    assert!(reactions::react(&conn, &post.id, &alice.id, true)
        .unwrap()
        .is_some());
    assert!(reactions::react(&conn, &post.id, &alice.id, true)
        .unwrap()
        .is_none());
    assert_eq!(reactions::counts(&conn, &post.id).unwrap(), (0, 0));

    // like, dislike → dislike
    reactions::react(&conn, &post.id, &alice.id, true).unwrap();
    let flipped = reactions::react(&conn, &post.id, &alice.id, false)
        .unwrap()
        .unwrap();
    assert!(!flipped.is_like);
    assert_eq!(reactions::counts(&conn, &post.id).unwrap(), (0, 1));

    // Invariant: at most one row per (post, user) at any point
    let rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM reactions WHERE post_id = ?1 AND user_id = ?2",
            rusqlite::params![post.id, alice.id],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn pagination_is_ceiling_divided_and_fails_soft_beyond_last_page() {
    let (_tmp, pool) = create_test_db();
    let conn = pool.get().unwrap();
    let alice = register_alice(&conn);

    for i in 0..23 {
        posts::create(
            &conn,
            posts::NewPost {
                title: &format!("post {:02}", i),
                content: "body",
                author_id: &alice.id,
                image_filename: None,
            },
            &[],
        )
        .unwrap();
    }

    let total = posts::count(&conn).unwrap();
    assert_eq!(total, 23);

    let per_page = 10;
    assert_eq!(scrawl::routes::total_pages(total, per_page), 3);

    // Page 1 starts at offset 0
    let page1 = posts::list(&conn, 0, per_page).unwrap();
    assert_eq!(page1.len(), 10);
    assert_eq!(page1[0].title, "post 22");

    // Last page holds the remainder
    let page3 = posts::list(&conn, 20, per_page).unwrap();
    assert_eq!(page3.len(), 3);

    // Beyond the last page: empty list, not an error
    let page4 = posts::list(&conn, 30, per_page).unwrap();
    assert!(page4.is_empty());
}

#[test]
fn non_owner_cannot_edit_or_delete() {
    let (_tmp, pool) = create_test_db();
    let conn = pool.get().unwrap();
    let alice = register_alice(&conn);
    let mallory = users::create(
        &conn,
        users::NewUser {
            email: "mallory@x.com",
            username: "mallory",
            password: "secret3",
        },
    )
    .unwrap();

    let post = posts::create(
        &conn,
        posts::NewPost {
            title: "Alice's",
            content: "body",
            author_id: &alice.id,
            image_filename: None,
        },
        &[],
    )
    .unwrap();
    let comment = comments::create(&conn, &post.id, &alice.id, "mine").unwrap();

    assert!(posts::update(
        &conn,
        &post.id,
        &mallory.id,
        posts::PostUpdate {
            title: Some("hijacked".to_string()),
            ..Default::default()
        },
    )
    .unwrap()
    .is_none());
    assert!(!posts::delete(&conn, &post.id, &mallory.id).unwrap());
    assert!(!comments::delete(&conn, &comment.id, &mallory.id).unwrap());

    // Everything still intact
    assert_eq!(posts::get(&conn, &post.id).unwrap().unwrap().title, "Alice's");
    assert!(comments::get(&conn, &comment.id).unwrap().is_some());
}

#[test]
fn popular_tags_reflect_usage_across_posts() {
    let (_tmp, pool) = create_test_db();
    let conn = pool.get().unwrap();
    let alice = register_alice(&conn);

    for i in 0..4 {
        let tag_set: Vec<String> = if i % 2 == 0 {
            vec!["even".to_string(), "all".to_string()]
        } else {
            vec!["all".to_string()]
        };
        posts::create(
            &conn,
            posts::NewPost {
                title: &format!("post {}", i),
                content: "body",
                author_id: &alice.id,
                image_filename: None,
            },
            &tag_set,
        )
        .unwrap();
    }

    let ranked = tags::popular(&conn, 10).unwrap();
    assert_eq!(ranked[0].tag.name, "all");
    assert_eq!(ranked[0].post_count, 4);
    assert_eq!(ranked[1].tag.name, "even");
    assert_eq!(ranked[1].post_count, 2);
}
