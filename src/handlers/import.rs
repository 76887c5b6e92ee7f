use axum::extract::{Multipart, State};
use axum::response::Json;
use tracing::{debug, info, warn};

use crate::auth::Member;
use crate::error::{AppError, AppResult};
use crate::models::ActivityAction;
use crate::services::activity;
use crate::services::csv_import::{self, ColumnMapping, ImportSummary};
use crate::state::AppState;

struct Upload {
    file: Vec<u8>,
    mapping: Option<ColumnMapping>,
}

/// Reads the `file` part and, when present, the `mapping` part (JSON text).
async fn read_upload(mut multipart: Multipart) -> AppResult<Upload> {
    let mut file = None;
    let mut mapping = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::CsvParse(e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::CsvParse(e.to_string()))?
                    .to_vec();
                debug!(size_bytes = content.len(), "Received CSV file");
                file = Some(content);
            }
            Some("mapping") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::CsvParse(e.to_string()))?;
                let parsed: ColumnMapping = serde_json::from_str(&text).map_err(|e| {
                    AppError::Validation(format!("Invalid column mapping: {}", e))
                })?;
                mapping = Some(parsed);
            }
            _ => {}
        }
    }

    match file {
        Some(file) if !file.is_empty() => Ok(Upload { file, mapping }),
        _ => {
            warn!("Import request without a file");
            Err(AppError::Validation("No file uploaded".into()))
        }
    }
}

/// Header names of an uploaded file, so the client can build a mapping.
pub async fn headers(_member: Member, multipart: Multipart) -> AppResult<Json<Vec<String>>> {
    let upload = read_upload(multipart).await?;
    let headers = csv_import::read_headers(&upload.file)?;
    Ok(Json(headers))
}

pub async fn upload(
    State(state): State<AppState>,
    member: Member,
    multipart: Multipart,
) -> AppResult<Json<ImportSummary>> {
    let upload = read_upload(multipart).await?;
    let mapping = upload
        .mapping
        .ok_or_else(|| AppError::Validation("A column mapping is required".into()))?;

    let parsed = csv_import::parse_checklist_csv(&upload.file, &mapping)?;
    info!(
        rows = parsed.rows.len(),
        errors = parsed.errors.len(),
        "Parsed checklist CSV"
    );

    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;
    let mut summary = csv_import::import_rows(&tx, member.household_id, &parsed.rows)?;
    if summary.items_created > 0 || summary.categories_created > 0 {
        activity::record(
            &tx,
            member.household_id,
            &member.user,
            ActivityAction::ChecklistImported,
            format!(
                "Imported {} items into {} new categories",
                summary.items_created, summary.categories_created
            ),
            None,
        )?;
    }
    tx.commit()?;

    let mut errors = parsed.errors;
    errors.append(&mut summary.errors);
    summary.errors = errors;

    info!(
        household_id = member.household_id,
        items = summary.items_created,
        categories = summary.categories_created,
        "Checklist import finished"
    );
    Ok(Json(summary))
}
