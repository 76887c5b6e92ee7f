//! Shared test utilities for integration tests.
//!
//! `TestClient` drives the full router (auth and XSRF included) against an
//! in-memory database. It remembers the session cookie and XSRF token from
//! the last sign-up or login, so requests read like a logged-in browser.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tower::ServiceExt;
use trousseau::config::Config;
use trousseau::db::{create_in_memory_pool, migrations};
use trousseau::server;
use trousseau::state::AppState;
use trousseau::xsrf::XSRF_HEADER;

pub const PASSWORD: &str = "correct horse battery";

#[derive(Clone, Default)]
struct Credentials {
    cookie: Option<String>,
    xsrf: Option<String>,
}

/// A browser-like client: one session at a time, sharing the app with any
/// clients created through [`TestClient::second_browser`].
pub struct TestClient {
    state: AppState,
    credentials: Mutex<Credentials>,
}

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 7171,
        database_path: PathBuf::from(":memory:"),
        migrations_path: PathBuf::from("migrations"),
        allow_signup: true,
        secure_cookies: false,
    }
}

impl TestClient {
    /// Create a new test client with a fresh in-memory database.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let pool = create_in_memory_pool().expect("Failed to create in-memory pool");
        {
            let mut conn = pool.get().expect("Failed to get connection");
            migrations::run_migrations(&mut conn, Path::new("migrations"))
                .expect("Failed to run migrations");
        }

        Self {
            state: AppState::new(pool, config),
            credentials: Mutex::new(Credentials::default()),
        }
    }

    /// Another client against the same app and database, with no session.
    pub fn second_browser(&self) -> Self {
        Self {
            state: self.state.clone(),
            credentials: Mutex::new(Credentials::default()),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        server::router(self.state.clone())
    }

    pub fn xsrf_token(&self) -> Option<String> {
        self.credentials.lock().unwrap().xsrf.clone()
    }

    /// Forget the XSRF token but keep the cookie.
    pub fn drop_xsrf_token(&self) {
        self.credentials.lock().unwrap().xsrf = None;
    }

    async fn send(&self, builder: axum::http::request::Builder, body: Body) -> (StatusCode, Value) {
        let creds = self.credentials.lock().unwrap().clone();
        let mut builder = builder;
        if let Some(cookie) = &creds.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(xsrf) = &creds.xsrf {
            builder = builder.header(XSRF_HEADER, xsrf);
        }

        let response = self
            .router()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            let mut creds = self.credentials.lock().unwrap();
            creds.cookie = if pair.ends_with('=') { None } else { Some(pair) };
        }

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        if let Some(token) = value.get("xsrf_token").and_then(Value::as_str) {
            self.credentials.lock().unwrap().xsrf = Some(token.to_string());
        }
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri), Body::empty()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send_json("POST", uri, body).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send_json("PUT", uri, body).await
    }

    pub async fn post(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().method("POST").uri(uri), Body::empty())
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().method("DELETE").uri(uri), Body::empty())
            .await
    }

    async fn send_json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json"),
            Body::from(body.to_string()),
        )
        .await
    }

    /// POST a multipart form with a `file` part and optional text parts.
    pub async fn post_multipart(
        &self,
        uri: &str,
        file: &str,
        fields: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let boundary = "----trousseau-test-boundary";
        let mut body = String::new();
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"list.csv\"\r\nContent-Type: text/csv\r\n\r\n{file}\r\n"
        ));
        for (name, value) in fields {
            body.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{boundary}--\r\n"));

        self.send(
            Request::builder().method("POST").uri(uri).header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            ),
            Body::from(body),
        )
        .await
    }

    // =========================================================================
    // Helpers for creating entities through the API
    // =========================================================================

    /// Register and log in. Returns the new user's profile.
    pub async fn signup(&self, email: &str, first_name: &str, role: &str) -> Value {
        let (status, body) = self
            .post_json(
                "/api/auth/signup",
                json!({
                    "email": email,
                    "password": PASSWORD,
                    "first_name": first_name,
                    "role": role,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "signup failed: {body}");
        body["user"].clone()
    }

    pub async fn login(&self, email: &str) -> (StatusCode, Value) {
        self.post_json(
            "/api/auth/login",
            json!({ "email": email, "password": PASSWORD }),
        )
        .await
    }

    pub async fn create_category(&self, name: &str, parent_id: Option<i64>) -> i64 {
        let (status, body) = self
            .post_json(
                "/api/categories",
                json!({ "name": name, "parent_id": parent_id }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create category failed: {body}");
        body["id"].as_i64().unwrap()
    }

    pub async fn create_item(&self, name: &str, category_id: i64, min: i64, max: i64) -> i64 {
        let (status, body) = self
            .post_json(
                "/api/items",
                json!({
                    "name": name,
                    "category_id": category_id,
                    "min_price_cents": min,
                    "max_price_cents": max,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create item failed: {body}");
        body["id"].as_i64().unwrap()
    }

    /// A section with one sub-category; returns `(section_id, sub_id)`.
    pub async fn section_with_sub(&self, section: &str, sub: &str) -> (i64, i64) {
        let section_id = self.create_category(section, None).await;
        let sub_id = self.create_category(sub, Some(section_id)).await;
        (section_id, sub_id)
    }
}
