use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

/// Newtype for passing error messages through response extensions.
#[derive(Clone)]
pub struct ErrorMessage(pub String);

/// Middleware that logs every 4xx/5xx response with the message the
/// handler attached, so rejected actions show up next to the request trace.
pub async fn error_logging_middleware(request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let method = request.method().clone();
    let response = next.run(request).await;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let message = response
            .extensions()
            .get::<ErrorMessage>()
            .map(|e| e.0.as_str())
            .unwrap_or("");
        tracing::warn!(
            %status,
            %method,
            %path,
            message,
            "request failed"
        );
    }

    response
}

/// Fallback handler for unmatched routes.
pub async fn fallback_handler() -> Response {
    let message = "No such endpoint.";
    let mut response = (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not_found", "message": message })),
    )
        .into_response();
    response
        .extensions_mut()
        .insert(ErrorMessage(message.into()));
    response
}
