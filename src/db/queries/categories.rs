use crate::models::category::{Category, NewCategory};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

fn map_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        household_id: row.get(1)?,
        name: row.get(2)?,
        parent_id: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

pub fn list_categories(conn: &Connection, household_id: i64) -> rusqlite::Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, household_id, name, parent_id, created_at, updated_at
         FROM categories
         WHERE household_id = ?
         ORDER BY name",
    )?;

    let categories = stmt
        .query_map([household_id], map_category)?
        .filter_map(|c| c.ok())
        .collect();

    Ok(categories)
}

pub fn get_category(conn: &Connection, id: i64) -> rusqlite::Result<Option<Category>> {
    conn.query_row(
        "SELECT id, household_id, name, parent_id, created_at, updated_at
         FROM categories WHERE id = ?",
        [id],
        map_category,
    )
    .optional()
}

/// Looks a category up by exact name under the given parent (or among sections).
pub fn find_by_name(
    conn: &Connection,
    household_id: i64,
    name: &str,
    parent_id: Option<i64>,
) -> rusqlite::Result<Option<Category>> {
    conn.query_row(
        "SELECT id, household_id, name, parent_id, created_at, updated_at
         FROM categories
         WHERE household_id = ? AND name = ? AND parent_id IS ?",
        params![household_id, name, parent_id],
        map_category,
    )
    .optional()
}

pub fn create_category(
    conn: &Connection,
    household_id: i64,
    category: &NewCategory,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO categories (household_id, name, parent_id) VALUES (?, ?, ?)",
        params![household_id, category.name.trim(), category.parent_id],
    )?;
    let id = conn.last_insert_rowid();
    debug!(category_id = id, name = %category.name, "Created category");
    Ok(id)
}

pub fn update_category(
    conn: &Connection,
    id: i64,
    category: &NewCategory,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE categories SET name = ?, parent_id = ?, updated_at = datetime('now')
         WHERE id = ?",
        params![category.name.trim(), category.parent_id, id],
    )?;
    if rows > 0 {
        debug!(category_id = id, name = %category.name, "Updated category");
    }
    Ok(rows > 0)
}

pub fn delete_category(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM categories WHERE id = ?", [id])?;
    if rows > 0 {
        debug!(category_id = id, "Deleted category");
    }
    Ok(rows > 0)
}

pub fn count_children(conn: &Connection, id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM categories WHERE parent_id = ?",
        [id],
        |row| row.get(0),
    )
}

pub fn count_items(conn: &Connection, id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM checklist_items WHERE category_id = ?",
        [id],
        |row| row.get(0),
    )
}
