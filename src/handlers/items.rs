use axum::extract::{Path, Query, State};
use axum::response::Json;
use rusqlite::Connection;
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::Member;
use crate::db::queries::{categories, items};
use crate::error::{AppError, AppResult};
use crate::models::{ActivityAction, ChecklistItem, NewChecklistItem};
use crate::services::activity::{self, ActivityPayload};
use crate::services::category_tree::CategoryTree;
use crate::services::money::{format_cents, MAX_PRICE_CENTS};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ItemFilter {
    /// Restrict to this category and everything beneath it.
    pub category_id: Option<i64>,
    pub purchased: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseData {
    pub final_price_cents: i64,
}

fn load_owned(conn: &Connection, member: &Member, id: i64) -> AppResult<ChecklistItem> {
    let item = items::get_item(conn, id)?
        .ok_or_else(|| AppError::NotFound("Item not found".into()))?;
    member.authorize(item.household_id)?;
    Ok(item)
}

fn validate(conn: &Connection, member: &Member, data: &NewChecklistItem) -> AppResult<NewChecklistItem> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Item name is required".into()));
    }
    if data.min_price_cents < 0 || data.max_price_cents < 0 {
        return Err(AppError::Validation("Prices cannot be negative".into()));
    }
    if data.min_price_cents > MAX_PRICE_CENTS || data.max_price_cents > MAX_PRICE_CENTS {
        return Err(AppError::Validation(format!(
            "Prices cannot exceed {}",
            format_cents(MAX_PRICE_CENTS)
        )));
    }
    if data.max_price_cents < data.min_price_cents {
        return Err(AppError::Validation(
            "Maximum price must not be below the minimum price".into(),
        ));
    }

    let category = categories::get_category(conn, data.category_id)?
        .ok_or_else(|| AppError::Validation("Choose an existing category".into()))?;
    member.authorize(category.household_id)?;
    if categories::count_children(conn, category.id)? > 0 {
        return Err(AppError::Validation(
            "Items go into a sub-category, not a section with sub-categories".into(),
        ));
    }

    Ok(NewChecklistItem {
        name: name.to_string(),
        notes: data
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from),
        ..data.clone()
    })
}

fn reload(conn: &Connection, id: i64) -> AppResult<ChecklistItem> {
    items::get_item(conn, id)?.ok_or_else(|| AppError::NotFound("Item not found".into()))
}

pub async fn index(
    State(state): State<AppState>,
    member: Member,
    Query(filter): Query<ItemFilter>,
) -> AppResult<Json<Vec<ChecklistItem>>> {
    let conn = state.db.get()?;
    let mut item_list = items::list_items(&conn, member.household_id)?;

    if let Some(category_id) = filter.category_id {
        let cats = categories::list_categories(&conn, member.household_id)?;
        let tree = CategoryTree::build(&cats, &[]);
        if !tree.contains(category_id) {
            return Err(AppError::NotFound("Category not found".into()));
        }
        let mut scope = tree.descendants(category_id);
        scope.push(category_id);
        item_list.retain(|i| scope.contains(&i.category_id));
    }
    if let Some(purchased) = filter.purchased {
        item_list.retain(|i| i.is_purchased == purchased);
    }

    debug!(count = item_list.len(), "Listed checklist items");
    Ok(Json(item_list))
}

pub async fn show(
    State(state): State<AppState>,
    member: Member,
    Path(id): Path<i64>,
) -> AppResult<Json<ChecklistItem>> {
    let conn = state.db.get()?;
    Ok(Json(load_owned(&conn, &member, id)?))
}

pub async fn create(
    State(state): State<AppState>,
    member: Member,
    Json(data): Json<NewChecklistItem>,
) -> AppResult<Json<ChecklistItem>> {
    let mut conn = state.db.get()?;
    let new_item = validate(&conn, &member, &data)?;

    let tx = conn.transaction()?;
    let id = items::create_item(&tx, member.household_id, &new_item)?;
    let item = reload(&tx, id)?;
    activity::record(
        &tx,
        member.household_id,
        &member.user,
        ActivityAction::ItemCreated,
        format!("Added \"{}\"", item.name),
        Some(ActivityPayload::Item { item: item.clone() }),
    )?;
    tx.commit()?;

    info!(item_id = id, "Checklist item created");
    Ok(Json(item))
}

pub async fn update(
    State(state): State<AppState>,
    member: Member,
    Path(id): Path<i64>,
    Json(data): Json<NewChecklistItem>,
) -> AppResult<Json<ChecklistItem>> {
    let mut conn = state.db.get()?;
    let before = load_owned(&conn, &member, id)?;
    let new_item = validate(&conn, &member, &data)?;

    let tx = conn.transaction()?;
    items::update_item(&tx, id, &new_item)?;
    let after = reload(&tx, id)?;
    activity::record(
        &tx,
        member.household_id,
        &member.user,
        ActivityAction::ItemUpdated,
        format!("Edited \"{}\"", after.name),
        Some(ActivityPayload::ItemChange {
            before,
            after: after.clone(),
        }),
    )?;
    tx.commit()?;

    info!(item_id = id, "Checklist item updated");
    Ok(Json(after))
}

pub async fn purchase(
    State(state): State<AppState>,
    member: Member,
    Path(id): Path<i64>,
    Json(data): Json<PurchaseData>,
) -> AppResult<Json<ChecklistItem>> {
    if data.final_price_cents < 0 {
        return Err(AppError::Validation("Final price cannot be negative".into()));
    }
    if data.final_price_cents > MAX_PRICE_CENTS {
        return Err(AppError::Validation(format!(
            "Final price cannot exceed {}",
            format_cents(MAX_PRICE_CENTS)
        )));
    }

    let mut conn = state.db.get()?;
    let before = load_owned(&conn, &member, id)?;

    let tx = conn.transaction()?;
    items::set_purchase(&tx, id, Some(data.final_price_cents))?;
    activity::record(
        &tx,
        member.household_id,
        &member.user,
        ActivityAction::ItemPurchased,
        format!(
            "Bought \"{}\" for {}",
            before.name,
            format_cents(data.final_price_cents)
        ),
        Some(ActivityPayload::Purchase {
            item_id: id,
            final_price_cents: Some(data.final_price_cents),
            previous_price_cents: before.final_price_cents,
        }),
    )?;
    let item = reload(&tx, id)?;
    tx.commit()?;

    info!(item_id = id, "Checklist item purchased");
    Ok(Json(item))
}

pub async fn unpurchase(
    State(state): State<AppState>,
    member: Member,
    Path(id): Path<i64>,
) -> AppResult<Json<ChecklistItem>> {
    let mut conn = state.db.get()?;
    let before = load_owned(&conn, &member, id)?;
    if !before.is_purchased {
        return Ok(Json(before));
    }

    let tx = conn.transaction()?;
    items::set_purchase(&tx, id, None)?;
    activity::record(
        &tx,
        member.household_id,
        &member.user,
        ActivityAction::ItemUnpurchased,
        format!("Marked \"{}\" as not bought", before.name),
        Some(ActivityPayload::Purchase {
            item_id: id,
            final_price_cents: None,
            previous_price_cents: before.final_price_cents,
        }),
    )?;
    let item = reload(&tx, id)?;
    tx.commit()?;

    info!(item_id = id, "Checklist item unpurchased");
    Ok(Json(item))
}

/// Deletes the item; the activity entry keeps a snapshot so it can be restored.
pub async fn delete(
    State(state): State<AppState>,
    member: Member,
    Path(id): Path<i64>,
) -> AppResult<Json<ChecklistItem>> {
    let mut conn = state.db.get()?;
    let item = load_owned(&conn, &member, id)?;

    let tx = conn.transaction()?;
    items::delete_item(&tx, id)?;
    activity::record(
        &tx,
        member.household_id,
        &member.user,
        ActivityAction::ItemDeleted,
        format!("Removed \"{}\"", item.name),
        Some(ActivityPayload::Item { item: item.clone() }),
    )?;
    tx.commit()?;

    info!(item_id = id, "Checklist item deleted");
    Ok(Json(item))
}
