use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_cookies::CookieManagerLayer;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::config::Config;
use crate::db::{create_pool, migrations};
use crate::error_pages::{error_logging_middleware, fallback_handler};
use crate::handlers;
use crate::state::AppState;

/// Largest accepted request body; checklist CSVs are small.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Build the application state and Axum router from a [`Config`].
///
/// Creates the database pool, runs migrations and assembles the full
/// middleware stack.
pub fn build_app(config: Config) -> Result<(AppState, Router), Box<dyn std::error::Error>> {
    let db = create_pool(&config.database_path)?;

    {
        let mut conn = db.get()?;
        let applied = migrations::run_migrations(&mut conn, &config.migrations_path)?;
        tracing::info!(applied, "Database migrations checked");
    }

    let state = AppState::new(db, config);
    let app = router(state.clone());
    Ok((state, app))
}

/// The routes with every middleware layer applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::routes())
        .fallback(fallback_handler)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .layer(middleware::from_fn(error_logging_middleware))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CookieManagerLayer::new())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the router to `host:port` and spawn the server as a tokio task.
///
/// Returns the actual port the server bound to (useful when `port` is 0 for
/// OS-assigned ports) and a [`JoinHandle`] for the server task.
pub async fn serve(
    app: Router,
    host: &str,
    port: u16,
) -> Result<(u16, JoinHandle<()>), Box<dyn std::error::Error>> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    Ok((actual_port, handle))
}
