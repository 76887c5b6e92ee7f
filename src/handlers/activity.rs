use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::Deserialize;

use crate::auth::Member;
use crate::db::queries::activity_logs;
use crate::error::{AppError, AppResult};
use crate::models::ActivityLog;
use crate::services::activity;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

pub async fn index(
    State(state): State<AppState>,
    member: Member,
    Query(query): Query<ActivityQuery>,
) -> AppResult<Json<Vec<ActivityLog>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let conn = state.db.get()?;
    Ok(Json(activity_logs::list_logs(&conn, member.household_id, limit)?))
}

/// Undo a logged change. Responds with the entry recording the revert.
pub async fn revert(
    State(state): State<AppState>,
    member: Member,
    Path(id): Path<i64>,
) -> AppResult<Json<ActivityLog>> {
    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;
    let new_id = activity::revert(&tx, member.household_id, &member.user, id)?;
    tx.commit()?;

    let log = activity_logs::get_log(&conn, new_id)?
        .ok_or_else(|| AppError::Internal("Revert entry vanished after insert".into()))?;
    Ok(Json(log))
}
