//! Activity log entries and undoing them.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::queries::{activity_logs, categories, items};
use crate::error::{AppError, AppResult};
use crate::models::{ActivityAction, ChecklistItem, NewActivityLog, UserProfile};

/// State captured alongside a log entry so the action can be undone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityPayload {
    Item {
        item: ChecklistItem,
    },
    ItemChange {
        before: ChecklistItem,
        after: ChecklistItem,
    },
    Purchase {
        item_id: i64,
        final_price_cents: Option<i64>,
        previous_price_cents: Option<i64>,
    },
}

pub fn record(
    conn: &Connection,
    household_id: i64,
    user: &UserProfile,
    action: ActivityAction,
    details: impl Into<String>,
    payload: Option<ActivityPayload>,
) -> AppResult<i64> {
    let payload = payload
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| AppError::Internal(format!("Failed to serialize activity payload: {}", e)))?;
    let id = activity_logs::insert_log(
        conn,
        &NewActivityLog {
            household_id,
            user_id: user.id,
            user_name: user.display_name(),
            action,
            details: details.into(),
            payload,
        },
    )?;
    Ok(id)
}

fn existing_item(conn: &Connection, household_id: i64, id: i64) -> AppResult<ChecklistItem> {
    let item = items::get_item(conn, id)?
        .ok_or_else(|| AppError::BusinessRule("The item no longer exists".into()))?;
    if item.household_id != household_id {
        return Err(AppError::Forbidden(
            "This belongs to another household".into(),
        ));
    }
    Ok(item)
}

fn ensure_category(conn: &Connection, household_id: i64, category_id: i64) -> AppResult<()> {
    match categories::get_category(conn, category_id)? {
        Some(c) if c.household_id == household_id => Ok(()),
        _ => Err(AppError::BusinessRule(
            "The item's category has been deleted".into(),
        )),
    }
}

/// Undoes the logged action, marks the entry reverted and logs the revert
/// itself. Returns the id of the new entry. Run inside a transaction.
pub fn revert(
    conn: &Connection,
    household_id: i64,
    user: &UserProfile,
    log_id: i64,
) -> AppResult<i64> {
    let log = activity_logs::get_log(conn, log_id)?
        .ok_or_else(|| AppError::NotFound("Activity entry not found".into()))?;
    if log.household_id != household_id {
        return Err(AppError::Forbidden(
            "This belongs to another household".into(),
        ));
    }
    if log.reverted {
        return Err(AppError::BusinessRule(
            "This change was already reverted".into(),
        ));
    }
    if !log.action.is_revertible() {
        return Err(AppError::BusinessRule(format!(
            "'{}' entries cannot be reverted",
            log.action
        )));
    }

    let payload: ActivityPayload = log
        .payload
        .clone()
        .ok_or_else(|| AppError::BusinessRule("Nothing was recorded to revert".into()))
        .and_then(|v| {
            serde_json::from_value(v).map_err(|e| {
                warn!(log_id, error = %e, "Unreadable activity payload");
                AppError::BusinessRule("The recorded change cannot be read".into())
            })
        })?;

    match (log.action, payload) {
        (ActivityAction::ItemDeleted, ActivityPayload::Item { item }) => {
            if items::get_item(conn, item.id)?.is_some() {
                return Err(AppError::BusinessRule("The item already exists".into()));
            }
            ensure_category(conn, household_id, item.category_id)?;
            items::restore_item(conn, &ChecklistItem {
                household_id,
                ..item
            })?;
        }
        (ActivityAction::ItemCreated, ActivityPayload::Item { item }) => {
            existing_item(conn, household_id, item.id)?;
            items::delete_item(conn, item.id)?;
        }
        (ActivityAction::ItemUpdated, ActivityPayload::ItemChange { before, .. }) => {
            existing_item(conn, household_id, before.id)?;
            ensure_category(conn, household_id, before.category_id)?;
            items::update_item(conn, before.id, &before.to_new())?;
        }
        (
            ActivityAction::ItemPurchased,
            ActivityPayload::Purchase {
                item_id,
                previous_price_cents,
                ..
            },
        ) => {
            // A re-purchase goes back to the earlier price, a first purchase to open.
            existing_item(conn, household_id, item_id)?;
            items::set_purchase(conn, item_id, previous_price_cents)?;
        }
        (
            ActivityAction::ItemUnpurchased,
            ActivityPayload::Purchase {
                item_id,
                previous_price_cents,
                ..
            },
        ) => {
            let price = previous_price_cents.ok_or_else(|| {
                AppError::BusinessRule("The previous price was not recorded".into())
            })?;
            existing_item(conn, household_id, item_id)?;
            items::set_purchase(conn, item_id, Some(price))?;
        }
        (action, _) => {
            warn!(log_id, %action, "Activity payload does not match its action");
            return Err(AppError::BusinessRule(
                "The recorded change does not match this entry".into(),
            ));
        }
    }

    activity_logs::mark_reverted(conn, log_id)?;
    let id = record(
        conn,
        household_id,
        user,
        ActivityAction::Reverted,
        format!("Reverted: {}", log.details),
        None,
    )?;
    info!(log_id, user_id = user.id, "Activity reverted");
    Ok(id)
}
