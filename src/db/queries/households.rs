use crate::models::household::Household;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

pub fn create_household(conn: &Connection) -> rusqlite::Result<i64> {
    conn.execute("INSERT INTO households DEFAULT VALUES", [])?;
    let id = conn.last_insert_rowid();
    debug!(household_id = id, "Created household");
    Ok(id)
}

pub fn get_household(conn: &Connection, id: i64) -> rusqlite::Result<Option<Household>> {
    let created_at: Option<String> = conn
        .query_row(
            "SELECT created_at FROM households WHERE id = ?",
            [id],
            |row| row.get(0),
        )
        .optional()?;

    let Some(created_at) = created_at else {
        return Ok(None);
    };

    let mut stmt = conn.prepare("SELECT id FROM users WHERE household_id = ? ORDER BY id")?;
    let member_ids = stmt
        .query_map([id], |row| row.get(0))?
        .filter_map(|m| m.ok())
        .collect();

    Ok(Some(Household {
        id,
        member_ids,
        created_at,
    }))
}

pub fn count_members(conn: &Connection, household_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM users WHERE household_id = ?",
        [household_id],
        |row| row.get(0),
    )
}

/// Moves every household-owned row from `from` into `into` and deletes the
/// emptied household. Callers run this inside a transaction.
pub fn merge_households(conn: &Connection, from: i64, into: i64) -> rusqlite::Result<()> {
    for table in ["categories", "checklist_items", "analyses", "activity_logs"] {
        let moved = conn.execute(
            &format!("UPDATE {table} SET household_id = ? WHERE household_id = ?"),
            params![into, from],
        )?;
        debug!(table, moved, "Moved household rows");
    }
    conn.execute(
        "UPDATE users SET household_id = ? WHERE household_id = ?",
        params![into, from],
    )?;
    conn.execute(
        "UPDATE invitations SET status = 'declined', updated_at = datetime('now')
         WHERE household_id = ? AND status = 'pending'",
        [from],
    )?;
    conn.execute("DELETE FROM households WHERE id = ?", [from])?;
    info!(from, into, "Merged households");
    Ok(())
}
