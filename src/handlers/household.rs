use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;

use crate::auth::{CurrentUser, Member};
use crate::db::queries::users;
use crate::error::AppResult;
use crate::models::{HouseholdSummary, Role};
use crate::services::households;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetupData {
    #[serde(default)]
    pub role: Option<Role>,
}

pub async fn show(
    State(state): State<AppState>,
    member: Member,
) -> AppResult<Json<HouseholdSummary>> {
    let conn = state.db.get()?;
    let summary = households::load_summary(&conn, member.household_id, member.user.id)?;
    Ok(Json(summary))
}

/// First-run setup for accounts that do not belong to a household yet.
pub async fn setup(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(data): Json<SetupData>,
) -> AppResult<Json<HouseholdSummary>> {
    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;

    if let Some(role) = data.role {
        users::update_role(&tx, user.id, role)?;
    }
    let household_id = households::setup_household(&tx, &user)?;
    tx.commit()?;

    let summary = households::load_summary(&conn, household_id, user.id)?;
    Ok(Json(summary))
}
