//! XSRF (Cross-Site Request Forgery) tokens.
//!
//! Every session gets its own token at login. Clients echo it back in the
//! `X-XSRF-Token` header on state-changing requests (POST, PUT, DELETE,
//! PATCH); [`auth::auth_middleware`](crate::auth::auth_middleware) rejects
//! those requests when the header is missing or does not match.

use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use uuid::Uuid;

/// The header name for XSRF tokens.
pub const XSRF_HEADER: &str = "X-XSRF-Token";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XsrfToken(String);

impl XsrfToken {
    /// Generate a new random XSRF token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the token value as a string.
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Whether the request headers carry this token.
    pub fn matches(&self, headers: &HeaderMap) -> bool {
        headers
            .get(XSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|token| token == self.0)
    }
}

pub fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::DELETE | Method::PATCH
    )
}

pub fn xsrf_error_response() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "permission", "message": "Invalid or missing XSRF token" })),
    )
        .into_response()
}
