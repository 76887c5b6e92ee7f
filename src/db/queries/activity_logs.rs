use crate::models::activity_log::{ActivityAction, ActivityLog, NewActivityLog};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, warn};

fn map_log(row: &Row<'_>) -> rusqlite::Result<ActivityLog> {
    let id: i64 = row.get(0)?;
    let action_str: String = row.get(4)?;
    let payload: Option<String> = row.get(6)?;
    let action = ActivityAction::parse(&action_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown activity action '{action_str}'").into(),
        )
    })?;
    Ok(ActivityLog {
        id,
        household_id: row.get(1)?,
        user_id: row.get(2)?,
        user_name: row.get(3)?,
        action,
        details: row.get(5)?,
        payload: payload.and_then(|p| match serde_json::from_str(&p) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(log_id = id, error = %e, "Dropping unreadable activity payload");
                None
            }
        }),
        reverted: row.get(7)?,
        created_at: row.get(8)?,
    })
}

pub fn insert_log(conn: &Connection, log: &NewActivityLog) -> rusqlite::Result<i64> {
    let payload = log.payload.as_ref().map(|p| p.to_string());
    conn.execute(
        "INSERT INTO activity_logs (household_id, user_id, user_name, action, details, payload)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
            log.household_id,
            log.user_id,
            log.user_name,
            log.action.as_str(),
            log.details,
            payload
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(log_id = id, action = %log.action, "Recorded activity");
    Ok(id)
}

/// Newest first.
pub fn list_logs(
    conn: &Connection,
    household_id: i64,
    limit: i64,
) -> rusqlite::Result<Vec<ActivityLog>> {
    let mut stmt = conn.prepare(
        "SELECT id, household_id, user_id, user_name, action, details, payload, reverted, created_at
         FROM activity_logs
         WHERE household_id = ?
         ORDER BY id DESC
         LIMIT ?",
    )?;

    let logs = stmt
        .query_map(params![household_id, limit], map_log)?
        .filter_map(|l| l.ok())
        .collect();

    Ok(logs)
}

pub fn get_log(conn: &Connection, id: i64) -> rusqlite::Result<Option<ActivityLog>> {
    conn.query_row(
        "SELECT id, household_id, user_id, user_name, action, details, payload, reverted, created_at
         FROM activity_logs WHERE id = ?",
        [id],
        map_log,
    )
    .optional()
}

pub fn mark_reverted(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE activity_logs SET reverted = 1 WHERE id = ? AND reverted = 0",
        [id],
    )?;
    Ok(rows > 0)
}
