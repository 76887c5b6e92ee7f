use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;
use tracing::info;

use crate::auth::CurrentUser;
use crate::db::queries::users;
use crate::error::{AppError, AppResult};
use crate::models::{Role, UserProfile};
use crate::state::AppState;

/// Themes the client knows how to draw.
pub const THEMES: &[&str] = &["blue", "rose", "green", "amber", "slate", "dark"];

#[derive(Debug, Deserialize)]
pub struct ThemeData {
    pub theme: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleData {
    pub role: Role,
}

fn reload(state: &AppState, user_id: i64) -> AppResult<UserProfile> {
    let conn = state.db.get()?;
    users::get_user(&conn, user_id)?.ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Pin an explicit theme; it then wins over the role default.
pub async fn set_theme(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(data): Json<ThemeData>,
) -> AppResult<Json<UserProfile>> {
    let theme = data.theme.trim();
    if !THEMES.contains(&theme) {
        return Err(AppError::Validation(format!("Unknown theme '{}'", theme)));
    }

    {
        let conn = state.db.get()?;
        users::set_theme(&conn, user.id, Some(theme))?;
    }
    info!(user_id = user.id, theme, "Theme pinned");

    Ok(Json(reload(&state, user.id)?))
}

/// Drop the manual choice so the theme follows the role again.
pub async fn reset_theme(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<UserProfile>> {
    {
        let conn = state.db.get()?;
        users::set_theme(&conn, user.id, None)?;
    }
    info!(user_id = user.id, "Theme override cleared");

    Ok(Json(reload(&state, user.id)?))
}

pub async fn update_role(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(data): Json<RoleData>,
) -> AppResult<Json<UserProfile>> {
    {
        let conn = state.db.get()?;
        users::update_role(&conn, user.id, data.role)?;
    }
    info!(user_id = user.id, role = %data.role, "Role updated");

    Ok(Json(reload(&state, user.id)?))
}
