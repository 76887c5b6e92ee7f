//! Integration tests for accounts, sessions and XSRF protection.

mod common;

use axum::http::StatusCode;
use common::{test_config, TestClient};
use serde_json::json;

#[tokio::test]
async fn test_health_is_public() {
    let client = TestClient::new();
    let (status, body) = client.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_api_requires_session() {
    let client = TestClient::new();
    let (status, body) = client.get("/api/items").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_signup_starts_session_with_role_theme() {
    let client = TestClient::new();
    let user = client.signup("alex@example.com", "Alex", "groom").await;
    assert!(user["household_id"].is_i64(), "signup should create a household");
    assert!(client.xsrf_token().is_some());

    let (status, me) = client.get("/api/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["email"], "alex@example.com");
    assert_eq!(me["theme"], "blue");
}

#[tokio::test]
async fn test_mutation_without_xsrf_token_is_rejected() {
    let client = TestClient::new();
    client.signup("alex@example.com", "Alex", "groom").await;
    client.drop_xsrf_token();

    let (status, body) = client
        .post_json("/api/categories", json!({ "name": "Kitchen" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "permission");

    // Reads stay allowed.
    let (status, _) = client.get("/api/categories").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_and_logout() {
    let client = TestClient::new();
    client.signup("sam@example.com", "Sam", "bride").await;

    let (status, _) = client.post("/api/auth/logout").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = client.get("/api/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = client
        .post_json(
            "/api/auth/login",
            json!({ "email": "sam@example.com", "password": "wrong password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, body) = client.login("SAM@example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theme"], "rose");

    let (status, _) = client.get("/api/me").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_signup_validation() {
    let client = TestClient::new();

    let (status, body) = client
        .post_json(
            "/api/auth/signup",
            json!({ "email": "not-an-email", "password": "long enough", "first_name": "A" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let (status, _) = client
        .post_json(
            "/api/auth/signup",
            json!({ "email": "a@example.com", "password": "short", "first_name": "A" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_email_is_a_conflict() {
    let client = TestClient::new();
    client.signup("alex@example.com", "Alex", "groom").await;

    let other = client.second_browser();
    let (status, body) = other
        .post_json(
            "/api/auth/signup",
            json!({
                "email": "Alex@Example.com",
                "password": common::PASSWORD,
                "first_name": "Alex",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "business_rule");

    let (status, _) = other
        .post_json(
            "/api/auth/signup",
            json!({
                "email": "  alex@example.com ",
                "password": common::PASSWORD,
                "first_name": "Alex",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = other.login(" alex@example.com").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_signup_can_be_disabled() {
    let mut config = test_config();
    config.allow_signup = false;
    let client = TestClient::with_config(config);

    let (status, _) = client
        .post_json(
            "/api/auth/signup",
            json!({ "email": "a@example.com", "password": "long enough", "first_name": "A" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_theme_override_beats_role_default() {
    let client = TestClient::new();
    client.signup("alex@example.com", "Alex", "groom").await;

    let (status, user) = client
        .put_json("/api/me/theme", json!({ "theme": "green" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["theme_override"], true);

    // Switching role does not touch a pinned theme.
    client.put_json("/api/me/role", json!({ "role": "bride" })).await;
    let (_, me) = client.get("/api/me").await;
    assert_eq!(me["theme"], "green");

    let (status, _) = client.delete("/api/me/theme").await;
    assert_eq!(status, StatusCode::OK);
    let (_, me) = client.get("/api/me").await;
    assert_eq!(me["theme"], "rose");

    let (status, _) = client
        .put_json("/api/me/theme", json!({ "theme": "neon" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_json_404() {
    let client = TestClient::new();
    client.signup("alex@example.com", "Alex", "groom").await;

    let (status, body) = client.get("/api/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}
