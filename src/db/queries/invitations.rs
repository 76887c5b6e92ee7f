use crate::models::invitation::{Invitation, InvitationStatus};
use crate::models::user::Role;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

const INVITATION_COLUMNS: &str = "id, inviter_id, inviter_name, inviter_role, invitee_email,
     household_id, status, created_at, updated_at";

fn map_invitation(row: &Row<'_>) -> rusqlite::Result<Invitation> {
    let role_str: String = row.get(3)?;
    let status_str: String = row.get(6)?;
    Ok(Invitation {
        id: row.get(0)?,
        inviter_id: row.get(1)?,
        inviter_name: row.get(2)?,
        inviter_role: Role::parse(&role_str).unwrap_or_default(),
        invitee_email: row.get(4)?,
        household_id: row.get(5)?,
        status: InvitationStatus::parse(&status_str).unwrap_or(InvitationStatus::Pending),
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub fn create_invitation(
    conn: &Connection,
    inviter_id: i64,
    inviter_name: &str,
    inviter_role: Role,
    invitee_email: &str,
    household_id: i64,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO invitations (inviter_id, inviter_name, inviter_role, invitee_email, household_id)
         VALUES (?, ?, ?, ?, ?)",
        params![
            inviter_id,
            inviter_name,
            inviter_role.as_str(),
            invitee_email.trim(),
            household_id
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(invitation_id = id, household_id, "Created invitation");
    Ok(id)
}

pub fn get_invitation(conn: &Connection, id: i64) -> rusqlite::Result<Option<Invitation>> {
    conn.query_row(
        &format!("SELECT {INVITATION_COLUMNS} FROM invitations WHERE id = ?"),
        [id],
        map_invitation,
    )
    .optional()
}

pub fn list_pending_for_email(conn: &Connection, email: &str) -> rusqlite::Result<Vec<Invitation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INVITATION_COLUMNS} FROM invitations
         WHERE invitee_email = ? COLLATE NOCASE AND status = 'pending'
         ORDER BY id DESC"
    ))?;

    let invitations = stmt
        .query_map([email.trim()], map_invitation)?
        .filter_map(|i| i.ok())
        .collect();

    Ok(invitations)
}

pub fn list_for_household(conn: &Connection, household_id: i64) -> rusqlite::Result<Vec<Invitation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INVITATION_COLUMNS} FROM invitations
         WHERE household_id = ?
         ORDER BY id DESC"
    ))?;

    let invitations = stmt
        .query_map([household_id], map_invitation)?
        .filter_map(|i| i.ok())
        .collect();

    Ok(invitations)
}

pub fn has_pending(conn: &Connection, household_id: i64, email: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM invitations
         WHERE household_id = ? AND invitee_email = ? COLLATE NOCASE AND status = 'pending')",
        params![household_id, email.trim()],
        |row| row.get(0),
    )
}

pub fn set_status(conn: &Connection, id: i64, status: InvitationStatus) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE invitations SET status = ?, updated_at = datetime('now') WHERE id = ?",
        params![status.as_str(), id],
    )?;
    if rows > 0 {
        debug!(invitation_id = id, status = status.as_str(), "Updated invitation status");
    }
    Ok(rows > 0)
}
