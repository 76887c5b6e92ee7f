pub mod activity;
pub mod analyses;
pub mod categories;
pub mod dashboard;
pub mod household;
pub mod import;
pub mod invitations;
pub mod items;
pub mod settings;

use axum::routing::{get, post, put};
use axum::Router;

use crate::auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Accounts & sessions
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/me", get(auth::me))
        .route("/api/me/role", put(settings::update_role))
        .route(
            "/api/me/theme",
            put(settings::set_theme).delete(settings::reset_theme),
        )
        // Household
        .route("/api/household", get(household::show))
        .route("/api/household/setup", post(household::setup))
        .route(
            "/api/invitations",
            get(invitations::index).post(invitations::create),
        )
        .route("/api/invitations/:id/accept", post(invitations::accept))
        .route("/api/invitations/:id/decline", post(invitations::decline))
        // Dashboard
        .route("/api/dashboard", get(dashboard::index))
        // Categories
        .route(
            "/api/categories",
            get(categories::index).post(categories::create),
        )
        .route("/api/categories/tree", get(categories::tree))
        .route(
            "/api/categories/:id",
            get(categories::show)
                .put(categories::update)
                .delete(categories::delete),
        )
        // Checklist items
        .route("/api/items", get(items::index).post(items::create))
        .route(
            "/api/items/:id",
            get(items::show).put(items::update).delete(items::delete),
        )
        .route("/api/items/:id/purchase", post(items::purchase))
        .route("/api/items/:id/unpurchase", post(items::unpurchase))
        // Analyses
        .route(
            "/api/analyses",
            get(analyses::index).post(analyses::create),
        )
        .route(
            "/api/analyses/:id",
            get(analyses::show)
                .put(analyses::update)
                .delete(analyses::delete),
        )
        .route("/api/analyses/:id/featured", put(analyses::set_featured))
        // Activity
        .route("/api/activity", get(activity::index))
        .route("/api/activity/:id/revert", post(activity::revert))
        // CSV import
        .route("/api/import/headers", post(import::headers))
        .route("/api/import", post(import::upload))
        // Health check
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "OK"
}
