use crate::models::item::{ChecklistItem, NewChecklistItem, Priority};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

const ITEM_COLUMNS: &str = "id, household_id, category_id, name, min_price_cents, max_price_cents,
     is_purchased, final_price_cents, priority, notes, created_at, updated_at";

fn map_item(row: &Row<'_>) -> rusqlite::Result<ChecklistItem> {
    let priority_str: String = row.get(8)?;
    Ok(ChecklistItem {
        id: row.get(0)?,
        household_id: row.get(1)?,
        category_id: row.get(2)?,
        name: row.get(3)?,
        min_price_cents: row.get(4)?,
        max_price_cents: row.get(5)?,
        is_purchased: row.get(6)?,
        final_price_cents: row.get(7)?,
        priority: Priority::parse(&priority_str).unwrap_or_default(),
        notes: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

pub fn list_items(conn: &Connection, household_id: i64) -> rusqlite::Result<Vec<ChecklistItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ITEM_COLUMNS} FROM checklist_items
         WHERE household_id = ?
         ORDER BY is_purchased, name"
    ))?;

    let items = stmt
        .query_map([household_id], map_item)?
        .filter_map(|i| i.ok())
        .collect();

    Ok(items)
}

pub fn get_item(conn: &Connection, id: i64) -> rusqlite::Result<Option<ChecklistItem>> {
    conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM checklist_items WHERE id = ?"),
        [id],
        map_item,
    )
    .optional()
}

pub fn create_item(
    conn: &Connection,
    household_id: i64,
    item: &NewChecklistItem,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO checklist_items
         (household_id, category_id, name, min_price_cents, max_price_cents, priority, notes)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            household_id,
            item.category_id,
            item.name.trim(),
            item.min_price_cents,
            item.max_price_cents,
            item.priority.as_str(),
            item.notes
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(item_id = id, name = %item.name, "Created checklist item");
    Ok(id)
}

/// Re-inserts a previously deleted item under its original id.
pub fn restore_item(conn: &Connection, item: &ChecklistItem) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO checklist_items
         (id, household_id, category_id, name, min_price_cents, max_price_cents,
          is_purchased, final_price_cents, priority, notes, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'))",
        params![
            item.id,
            item.household_id,
            item.category_id,
            item.name,
            item.min_price_cents,
            item.max_price_cents,
            item.is_purchased,
            item.final_price_cents,
            item.priority.as_str(),
            item.notes,
            item.created_at
        ],
    )?;
    debug!(item_id = item.id, "Restored checklist item");
    Ok(())
}

pub fn update_item(conn: &Connection, id: i64, item: &NewChecklistItem) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE checklist_items
         SET category_id = ?, name = ?, min_price_cents = ?, max_price_cents = ?,
             priority = ?, notes = ?, updated_at = datetime('now')
         WHERE id = ?",
        params![
            item.category_id,
            item.name.trim(),
            item.min_price_cents,
            item.max_price_cents,
            item.priority.as_str(),
            item.notes,
            id
        ],
    )?;
    if rows > 0 {
        debug!(item_id = id, "Updated checklist item");
    }
    Ok(rows > 0)
}

/// `Some(price)` marks the item purchased, `None` clears the purchase.
pub fn set_purchase(
    conn: &Connection,
    id: i64,
    final_price_cents: Option<i64>,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE checklist_items
         SET is_purchased = ?, final_price_cents = ?, updated_at = datetime('now')
         WHERE id = ?",
        params![final_price_cents.is_some(), final_price_cents, id],
    )?;
    if rows > 0 {
        debug!(item_id = id, ?final_price_cents, "Updated purchase state");
    }
    Ok(rows > 0)
}

pub fn delete_item(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM checklist_items WHERE id = ?", [id])?;
    if rows > 0 {
        debug!(item_id = id, "Deleted checklist item");
    }
    Ok(rows > 0)
}
