use axum::extract::{Path, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{validate_email, CurrentUser, Member};
use crate::db::queries::invitations;
use crate::error::{AppError, AppResult};
use crate::models::{HouseholdSummary, Invitation};
use crate::services::households;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InviteData {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct InvitationLists {
    /// Pending invitations addressed to the current user.
    pub incoming: Vec<Invitation>,
    /// Everything sent from the current user's household.
    pub outgoing: Vec<Invitation>,
}

pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<InvitationLists>> {
    let conn = state.db.get()?;
    let incoming = invitations::list_pending_for_email(&conn, &user.email)?;
    let outgoing = match user.household_id {
        Some(household_id) => invitations::list_for_household(&conn, household_id)?,
        None => Vec::new(),
    };
    Ok(Json(InvitationLists { incoming, outgoing }))
}

pub async fn create(
    State(state): State<AppState>,
    member: Member,
    Json(data): Json<InviteData>,
) -> AppResult<Json<Invitation>> {
    validate_email(&data.email)?;
    let conn = state.db.get()?;
    let invitation =
        households::invite_partner(&conn, &member.user, member.household_id, &data.email)?;
    Ok(Json(invitation))
}

pub async fn accept(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<HouseholdSummary>> {
    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;
    let household_id = households::accept_invitation(&tx, id, &user)?;
    tx.commit()?;

    let summary = households::load_summary(&conn, household_id, user.id)?;
    Ok(Json(summary))
}

pub async fn decline(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Invitation>> {
    let conn = state.db.get()?;
    households::decline_invitation(&conn, id, &user)?;
    let invitation = invitations::get_invitation(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Invitation not found".into()))?;
    Ok(Json(invitation))
}
