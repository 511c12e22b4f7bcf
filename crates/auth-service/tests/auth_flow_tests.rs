//! Account lifecycle tests against a migrated database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use hostel_test_utils::*;
use reqwest::{header, StatusCode};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn post(server: &TestAuthServer, path: &str, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}{path}", server.url()))
        .json(&body)
        .send()
        .await
        .unwrap()
}

async fn signup(server: &TestAuthServer, email: &str, role: Option<&str>) -> Value {
    let mut body = json!({"email": email, "password": "correct-horse", "name": "Tenzin"});
    if let Some(role) = role {
        body["role"] = json!(role);
    }
    let response = post(server, "/api/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

#[sqlx::test(migrations = "../../migrations/auth")]
async fn test_signup_returns_token_and_user(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(pool).await?;

    let body = signup(&server, "tenzin@example.com", None).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["email"], "tenzin@example.com");
    assert_eq!(body["user"]["role"], "student");
    assert!(body["user"].get("password_hash").is_none());
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["expires_in"], 86_400);

    // Only the hash is stored
    let stored: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE email = $1")
        .bind("tenzin@example.com")
        .fetch_one(server.pool())
        .await?;
    assert_ne!(stored, "correct-horse");
    assert!(stored.starts_with("$2"));

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/auth")]
async fn test_signup_as_admin(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(pool).await?;

    let body = signup(&server, "warden@example.com", Some("admin")).await;
    assert_eq!(body["user"]["role"], "admin");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/auth")]
async fn test_signup_rejections(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(pool).await?;

    let cases = [
        (
            json!({"email": "a@example.com", "name": "A"}),
            "Email, password, and name are required",
        ),
        (
            json!({"email": "a@example.com", "password": "12345", "name": "A"}),
            "Password must be at least 6 characters",
        ),
        (
            json!({"email": "a@example.com", "password": "123456", "name": "A", "role": "warden"}),
            "Role must be either student or admin",
        ),
    ];

    for (body, message) in cases {
        let response = post(&server, "/api/auth/signup", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await?;
        assert_eq!(body["error"], message);
    }

    let response = reqwest::Client::new()
        .post(format!("{}/api/auth/signup", server.url()))
        .header(header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(server.pool())
        .await?;
    assert_eq!(users, 0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/auth")]
async fn test_duplicate_email_conflicts(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(pool).await?;
    signup(&server, "dup@example.com", None).await;

    let response = post(
        &server,
        "/api/auth/signup",
        json!({"email": "dup@example.com", "password": "another-pass", "name": "Other"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "User with this email already exists");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/auth")]
async fn test_login(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(pool).await?;
    let created = signup(&server, "login@example.com", None).await;

    let response = post(
        &server,
        "/api/auth/login",
        json!({"email": "login@example.com", "password": "correct-horse"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["expires_in"], 86_400);
    assert_eq!(body["user"]["id"], created["user"]["id"]);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/auth")]
async fn test_login_failures_are_indistinguishable(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(pool).await?;
    signup(&server, "known@example.com", None).await;

    let wrong_password = post(
        &server,
        "/api/auth/login",
        json!({"email": "known@example.com", "password": "wrong-horse"}),
    )
    .await;
    let unknown_email = post(
        &server,
        "/api/auth/login",
        json!({"email": "nobody@example.com", "password": "correct-horse"}),
    )
    .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let a: Value = wrong_password.json().await?;
    let b: Value = unknown_email.json().await?;
    assert_eq!(a, b);
    assert_eq!(a["error"], "Invalid email or password");

    let missing = post(&server, "/api/auth/login", json!({"email": "known@example.com"})).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/auth")]
async fn test_validate(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(pool).await?;
    let created = signup(&server, "val@example.com", None).await;
    let token = created["token"].as_str().unwrap();
    let client = reqwest::Client::new();
    let url = format!("{}/api/auth/validate", server.url());

    let response = client.post(&url).bearer_auth(token).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["valid"], true);
    assert_eq!(body["claims"]["email"], "val@example.com");
    assert_eq!(body["claims"]["user_id"], created["user"]["id"]);
    assert!(body.get("error").is_none());

    for bad in [expired_token("x"), foreign_token("x"), "garbage".to_string()] {
        let response = client.post(&url).bearer_auth(&bad).send().await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = response.json().await?;
        assert_eq!(body["valid"], false);
        assert_eq!(body["error"], "Invalid or expired token");
    }

    let response = client.post(&url).send().await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::WWW_AUTHENTICATE).is_some());
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "No authorization token provided");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/auth")]
async fn test_profile(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(pool).await?;
    let created = signup(&server, "me@example.com", None).await;
    let token = created["token"].as_str().unwrap();
    let client = reqwest::Client::new();
    let url = format!("{}/api/auth/profile", server.url());

    let response = client.get(&url).bearer_auth(token).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["user"]["email"], "me@example.com");

    let response = client.get(&url).send().await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A valid token for an account that no longer exists
    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind("me@example.com")
        .execute(server.pool())
        .await?;
    let response = client.get(&url).bearer_auth(token).send().await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "User not found");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/auth")]
async fn test_issued_token_is_accepted_by_shared_verifier(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(pool).await?;
    let created = signup(&server, "shared@example.com", Some("admin")).await;

    // Other services verify with the same secret
    let claims = test_token_service().verify(created["token"].as_str().unwrap())?;
    assert_eq!(claims.email, "shared@example.com");
    assert_eq!(claims.role, common::types::Role::Admin);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/auth")]
async fn test_expires_in_follows_configured_expiry(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn_with(pool, &[("JWT_EXPIRY", "1h30m")]).await?;

    let body = signup(&server, "ttl@example.com", None).await;
    assert_eq!(body["expires_in"], 5_400);

    let claims = test_token_service().verify(body["token"].as_str().unwrap())?;
    assert_eq!(claims.exp - claims.iat, 5_400);

    Ok(())
}
