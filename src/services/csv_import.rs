use std::collections::HashMap;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::db::queries::{categories, items};
use crate::error::AppError;
use crate::models::{NewCategory, NewChecklistItem, Priority};
use crate::services::money::{parse_amount_cents, MAX_PRICE_CENTS};

/// Sub-category used for rows that name a section but no category.
pub const FALLBACK_CATEGORY: &str = "General";

/// Which header column feeds which field. Names are matched
/// case-insensitively after trimming.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColumnMapping {
    pub section: String,
    #[serde(default)]
    pub category: Option<String>,
    pub name: String,
    #[serde(default)]
    pub min_price: Option<String>,
    #[serde(default)]
    pub max_price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedRow {
    pub section: String,
    pub category: String,
    pub name: String,
    pub min_price_cents: i64,
    pub max_price_cents: i64,
    pub row_number: usize,
}

#[derive(Debug, Default)]
pub struct ParseResult {
    pub rows: Vec<ParsedRow>,
    pub errors: Vec<String>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportSummary {
    pub categories_created: usize,
    pub items_created: usize,
    pub errors: Vec<String>,
}

fn reader(content: &[u8]) -> Result<csv::Reader<&[u8]>, AppError> {
    std::str::from_utf8(content).map_err(|e| AppError::CsvParse(e.to_string()))?;
    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content))
}

/// Header names of the file, for building a column mapping.
pub fn read_headers(content: &[u8]) -> Result<Vec<String>, AppError> {
    let mut reader = reader(content)?;
    let headers = reader
        .headers()
        .map_err(|e| AppError::CsvParse(e.to_string()))?;
    if headers.iter().all(|h| h.is_empty()) {
        return Err(AppError::CsvParse("CSV file has no header row".into()));
    }
    Ok(headers.iter().map(str::to_string).collect())
}

pub fn parse_checklist_csv(content: &[u8], mapping: &ColumnMapping) -> Result<ParseResult, AppError> {
    trace!(content_size = content.len(), "Starting checklist CSV parsing");

    let mut reader = reader(content)?;
    let headers = reader
        .headers()
        .map_err(|e| AppError::CsvParse(e.to_string()))?
        .clone();

    let require = |name: &str, field: &str| {
        find_column(&headers, name).ok_or_else(|| {
            AppError::CsvParse(format!("Column '{name}' mapped to {field} not found in CSV"))
        })
    };
    let optional = |name: &Option<String>, field: &str| -> Result<Option<usize>, AppError> {
        match name.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(n) => require(n, field).map(Some),
        }
    };

    let section_col = require(mapping.section.as_str(), "section")?;
    let name_col = require(mapping.name.as_str(), "item name")?;
    let category_col = optional(&mapping.category, "category")?;
    let min_col = optional(&mapping.min_price, "minimum price")?;
    let max_col = optional(&mapping.max_price, "maximum price")?;

    debug!(column_count = headers.len(), "CSV headers mapped");

    let mut result = ParseResult::default();

    for (row_idx, record) in reader.records().enumerate() {
        let row_number = row_idx + 2;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                result.errors.push(format!("Row {}: {}", row_number, e));
                continue;
            }
        };

        if record.iter().all(|f| f.is_empty()) {
            continue;
        }

        let name = field(&record, Some(name_col));
        let section = field(&record, Some(section_col));
        let Some(name) = name else {
            result
                .errors
                .push(format!("Row {}: Missing item name", row_number));
            continue;
        };
        let Some(section) = section else {
            result
                .errors
                .push(format!("Row {}: Missing section for '{}'", row_number, name));
            continue;
        };
        let category = field(&record, category_col).unwrap_or_else(|| FALLBACK_CATEGORY.into());

        let mut min_price_cents = price(&record, min_col);
        let mut max_price_cents = price(&record, max_col);
        if min_price_cents > max_price_cents {
            std::mem::swap(&mut min_price_cents, &mut max_price_cents);
        }

        result.rows.push(ParsedRow {
            section,
            category,
            name,
            min_price_cents,
            max_price_cents,
            row_number,
        });
    }

    if !result.errors.is_empty() {
        warn!(
            error_count = result.errors.len(),
            "CSV parsing completed with errors"
        );
    }
    debug!(
        row_count = result.rows.len(),
        error_count = result.errors.len(),
        "CSV parsing completed"
    );

    Ok(result)
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name.trim()))
}

fn field(record: &csv::StringRecord, col: Option<usize>) -> Option<String> {
    col.and_then(|c| record.get(c))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Missing, unparsable, negative or out-of-range prices count as zero.
fn price(record: &csv::StringRecord, col: Option<usize>) -> i64 {
    col.and_then(|c| record.get(c))
        .and_then(parse_amount_cents)
        .filter(|cents| (0..=MAX_PRICE_CENTS).contains(cents))
        .unwrap_or(0)
}

/// Writes parsed rows into the household, creating sections and
/// sub-categories by name as needed. Run inside a transaction.
pub fn import_rows(
    conn: &Connection,
    household_id: i64,
    rows: &[ParsedRow],
) -> Result<ImportSummary, AppError> {
    let mut summary = ImportSummary::default();
    let mut resolved: HashMap<(Option<i64>, String), i64> = HashMap::new();

    let mut resolve = |name: &str,
                       parent_id: Option<i64>,
                       summary: &mut ImportSummary|
     -> Result<i64, AppError> {
        let key = (parent_id, name.to_string());
        if let Some(&id) = resolved.get(&key) {
            return Ok(id);
        }
        let id = match categories::find_by_name(conn, household_id, name, parent_id)? {
            Some(existing) => existing.id,
            None => {
                summary.categories_created += 1;
                categories::create_category(
                    conn,
                    household_id,
                    &NewCategory {
                        name: name.to_string(),
                        parent_id,
                    },
                )?
            }
        };
        resolved.insert(key, id);
        Ok(id)
    };

    for row in rows {
        let section_id = resolve(row.section.as_str(), None, &mut summary)?;
        if categories::count_items(conn, section_id)? > 0 {
            summary.errors.push(format!(
                "Row {}: '{}' holds items directly and cannot get sub-categories, item '{}' skipped",
                row.row_number, row.section, row.name
            ));
            continue;
        }
        let category_id = resolve(row.category.as_str(), Some(section_id), &mut summary)?;

        // Items may only hang off leaves; a previously-empty sub-category
        // that gained children is not one.
        if categories::count_children(conn, category_id)? > 0 {
            summary.errors.push(format!(
                "Row {}: '{}' has sub-categories, item '{}' skipped",
                row.row_number, row.category, row.name
            ));
            continue;
        }

        items::create_item(
            conn,
            household_id,
            &NewChecklistItem {
                name: row.name.clone(),
                category_id,
                min_price_cents: row.min_price_cents,
                max_price_cents: row.max_price_cents,
                priority: Priority::default(),
                notes: None,
            },
        )?;
        summary.items_created += 1;
    }

    Ok(summary)
}
