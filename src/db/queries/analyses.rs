use crate::models::analysis::{Analysis, NewAnalysis};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, warn};

fn map_analysis(row: &Row<'_>) -> rusqlite::Result<Analysis> {
    let id: i64 = row.get(0)?;
    let raw_ids: String = row.get(3)?;
    let category_ids = serde_json::from_str(&raw_ids).unwrap_or_else(|e| {
        warn!(analysis_id = id, error = %e, "Unreadable category selection, treating as empty");
        Vec::new()
    });
    Ok(Analysis {
        id,
        household_id: row.get(1)?,
        title: row.get(2)?,
        category_ids,
        is_featured: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn encode_ids(ids: &[i64]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".into())
}

pub fn list_analyses(conn: &Connection, household_id: i64) -> rusqlite::Result<Vec<Analysis>> {
    let mut stmt = conn.prepare(
        "SELECT id, household_id, title, category_ids, is_featured, created_at, updated_at
         FROM analyses
         WHERE household_id = ?
         ORDER BY is_featured DESC, title",
    )?;

    let analyses = stmt
        .query_map([household_id], map_analysis)?
        .filter_map(|a| a.ok())
        .collect();

    Ok(analyses)
}

pub fn get_analysis(conn: &Connection, id: i64) -> rusqlite::Result<Option<Analysis>> {
    conn.query_row(
        "SELECT id, household_id, title, category_ids, is_featured, created_at, updated_at
         FROM analyses WHERE id = ?",
        [id],
        map_analysis,
    )
    .optional()
}

pub fn create_analysis(
    conn: &Connection,
    household_id: i64,
    analysis: &NewAnalysis,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO analyses (household_id, title, category_ids, is_featured)
         VALUES (?, ?, ?, ?)",
        params![
            household_id,
            analysis.title.trim(),
            encode_ids(&analysis.category_ids),
            analysis.is_featured
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(analysis_id = id, title = %analysis.title, "Created analysis");
    Ok(id)
}

pub fn update_analysis(conn: &Connection, id: i64, analysis: &NewAnalysis) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE analyses SET title = ?, category_ids = ?, is_featured = ?,
         updated_at = datetime('now') WHERE id = ?",
        params![
            analysis.title.trim(),
            encode_ids(&analysis.category_ids),
            analysis.is_featured,
            id
        ],
    )?;
    if rows > 0 {
        debug!(analysis_id = id, "Updated analysis");
    }
    Ok(rows > 0)
}

pub fn set_featured(conn: &Connection, id: i64, featured: bool) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE analyses SET is_featured = ?, updated_at = datetime('now') WHERE id = ?",
        params![featured, id],
    )?;
    Ok(rows > 0)
}

pub fn delete_analysis(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM analyses WHERE id = ?", [id])?;
    if rows > 0 {
        debug!(analysis_id = id, "Deleted analysis");
    }
    Ok(rows > 0)
}
