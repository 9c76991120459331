//! Registration, login, and bearer-token flows.

use scrawl::auth::token;
use scrawl::config::AuthConfig;
use scrawl::db::{self, users};
use tempfile::TempDir;

fn create_test_db() -> (TempDir, scrawl::state::DbPool) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let pool = db::create_pool(&db_path).expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");
    (temp_dir, pool)
}

fn test_auth_config() -> AuthConfig {
    AuthConfig {
        cookie_name: "access_token".to_string(),
        secret_key: "integration-test-secret".to_string(),
        algorithm: "HS256".to_string(),
        token_expire_minutes: 30,
    }
}

#[test]
fn register_then_login_round_trip() {
    let (_tmp, pool) = create_test_db();
    let conn = pool.get().unwrap();

    users::create(
        &conn,
        users::NewUser {
            email: "alice@x.com",
            username: "alice",
            password: "secret1",
        },
    )
    .unwrap();

    let user = users::authenticate(&conn, "alice@x.com", "secret1")
        .unwrap()
        .expect("login with registered credentials should succeed");
    assert_eq!(user.username, "alice");
}

#[test]
fn reused_email_or_username_is_rejected() {
    let (_tmp, pool) = create_test_db();
    let conn = pool.get().unwrap();

    users::create(
        &conn,
        users::NewUser {
            email: "alice@x.com",
            username: "alice",
            password: "secret1",
        },
    )
    .unwrap();

    assert!(users::create(
        &conn,
        users::NewUser {
            email: "alice@x.com",
            username: "different",
            password: "secret1",
        },
    )
    .is_err());
    assert!(users::create(
        &conn,
        users::NewUser {
            email: "different@x.com",
            username: "alice",
            password: "secret1",
        },
    )
    .is_err());

    // Only the original row exists
    assert_eq!(users::count(&conn).unwrap(), 1);
}

#[test]
fn wrong_credentials_authenticate_to_none() {
    let (_tmp, pool) = create_test_db();
    let conn = pool.get().unwrap();

    users::create(
        &conn,
        users::NewUser {
            email: "alice@x.com",
            username: "alice",
            password: "secret1",
        },
    )
    .unwrap();

    assert!(users::authenticate(&conn, "alice@x.com", "bad-password")
        .unwrap()
        .is_none());
    assert!(users::authenticate(&conn, "unknown@x.com", "secret1")
        .unwrap()
        .is_none());
}

#[test]
fn bearer_token_resolves_back_to_the_user() {
    let (_tmp, pool) = create_test_db();
    let conn = pool.get().unwrap();
    let auth = test_auth_config();

    let user = users::create(
        &conn,
        users::NewUser {
            email: "alice@x.com",
            username: "alice",
            password: "secret1",
        },
    )
    .unwrap();

    // What /login does: issue a token for the username
    let bearer = token::create(&auth, &user.username).unwrap();

    // What the guard does: verify, then resolve the subject
    let subject = token::verify(&auth, &bearer).expect("fresh token should verify");
    let resolved = users::by_username(&conn, &subject).unwrap().unwrap();
    assert_eq!(resolved.id, user.id);
}

#[test]
fn token_for_unknown_username_resolves_to_no_user() {
    let (_tmp, pool) = create_test_db();
    let conn = pool.get().unwrap();
    let auth = test_auth_config();

    let bearer = token::create(&auth, "ghost").unwrap();
    let subject = token::verify(&auth, &bearer).unwrap();
    assert!(users::by_username(&conn, &subject).unwrap().is_none());
}
