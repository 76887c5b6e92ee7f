use crate::models::user::{NewUser, Role, UserProfile};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, role, household_id, theme, theme_override, created_at";

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserProfile> {
    let role_str: String = row.get(4)?;
    Ok(UserProfile {
        id: row.get(0)?,
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        role: Role::parse(&role_str).unwrap_or_default(),
        household_id: row.get(5)?,
        theme: row.get(6)?,
        theme_override: row.get(7)?,
        created_at: row.get(8)?,
    })
}

pub fn create_user(
    conn: &Connection,
    user: &NewUser,
    password_hash: Option<&str>,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO users (email, password_hash, first_name, last_name, role)
         VALUES (?, ?, ?, ?, ?)",
        params![
            user.email.trim(),
            password_hash,
            user.first_name,
            user.last_name,
            user.role.as_str()
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(user_id = id, email = %user.email, "Created user");
    Ok(id)
}

pub fn get_user(conn: &Connection, id: i64) -> rusqlite::Result<Option<UserProfile>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
        [id],
        map_user,
    )
    .optional()
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<UserProfile>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"),
        [email.trim()],
        map_user,
    )
    .optional()
}

/// Returns the user id together with the stored hash, for login.
pub fn get_credentials(conn: &Connection, email: &str) -> rusqlite::Result<Option<(i64, String)>> {
    conn.query_row(
        "SELECT id, password_hash FROM users
         WHERE email = ? COLLATE NOCASE AND password_hash IS NOT NULL",
        [email.trim()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

pub fn list_household_members(
    conn: &Connection,
    household_id: i64,
) -> rusqlite::Result<Vec<UserProfile>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE household_id = ? ORDER BY id"
    ))?;

    let users = stmt
        .query_map([household_id], map_user)?
        .filter_map(|u| u.ok())
        .collect();

    Ok(users)
}

pub fn set_household(
    conn: &Connection,
    user_id: i64,
    household_id: Option<i64>,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE users SET household_id = ? WHERE id = ?",
        params![household_id, user_id],
    )?;
    if rows > 0 {
        debug!(user_id, ?household_id, "Linked user to household");
    }
    Ok(rows > 0)
}

pub fn update_role(conn: &Connection, user_id: i64, role: Role) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE users SET role = ? WHERE id = ?",
        params![role.as_str(), user_id],
    )?;
    Ok(rows > 0)
}

/// `Some(theme)` pins the theme; `None` drops the override so the role decides again.
pub fn set_theme(conn: &Connection, user_id: i64, theme: Option<&str>) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE users SET theme = ?, theme_override = ? WHERE id = ?",
        params![theme, theme.is_some(), user_id],
    )?;
    if rows > 0 {
        debug!(user_id, ?theme, "Updated theme preference");
    }
    Ok(rows > 0)
}
