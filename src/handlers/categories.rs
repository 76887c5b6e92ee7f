use axum::extract::{Path, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::Member;
use crate::db::queries::{categories, items};
use crate::error::{AppError, AppResult};
use crate::models::{ActivityAction, Category, NewCategory};
use crate::services::activity;
use crate::services::category_tree::{would_create_cycle, CategoryTotals, CategoryTree, TreeRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryData {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub totals: CategoryTotals,
    pub children: Vec<Category>,
}

fn load_owned(conn: &rusqlite::Connection, member: &Member, id: i64) -> AppResult<Category> {
    let category = categories::get_category(conn, id)?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;
    member.authorize(category.household_id)?;
    Ok(category)
}

fn validate(conn: &rusqlite::Connection, member: &Member, data: &CategoryData) -> AppResult<NewCategory> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Category name is required".into()));
    }
    if let Some(parent_id) = data.parent_id {
        load_owned(conn, member, parent_id)?;
    }
    Ok(NewCategory {
        name: name.to_string(),
        parent_id: data.parent_id,
    })
}

/// Flat list, sorted by name.
pub async fn index(State(state): State<AppState>, member: Member) -> AppResult<Json<Vec<Category>>> {
    let conn = state.db.get()?;
    let cats = categories::list_categories(&conn, member.household_id)?;
    Ok(Json(cats))
}

/// Every category as a depth-ordered row with rolled-up totals.
pub async fn tree(State(state): State<AppState>, member: Member) -> AppResult<Json<Vec<TreeRow>>> {
    let conn = state.db.get()?;
    let cats = categories::list_categories(&conn, member.household_id)?;
    let item_list = items::list_items(&conn, member.household_id)?;
    Ok(Json(CategoryTree::build(&cats, &item_list).flatten_all()))
}

pub async fn show(
    State(state): State<AppState>,
    member: Member,
    Path(id): Path<i64>,
) -> AppResult<Json<CategoryDetail>> {
    let conn = state.db.get()?;
    let category = load_owned(&conn, &member, id)?;

    let cats = categories::list_categories(&conn, member.household_id)?;
    let item_list = items::list_items(&conn, member.household_id)?;
    let tree = CategoryTree::build(&cats, &item_list);

    let children = tree
        .children_of(id)
        .iter()
        .filter_map(|c| tree.get(*c).cloned())
        .collect();

    Ok(Json(CategoryDetail {
        totals: tree.totals(id),
        category,
        children,
    }))
}

pub async fn create(
    State(state): State<AppState>,
    member: Member,
    Json(data): Json<CategoryData>,
) -> AppResult<Json<Category>> {
    let mut conn = state.db.get()?;
    let new_category = validate(&conn, &member, &data)?;

    if let Some(parent_id) = new_category.parent_id {
        if categories::count_items(&conn, parent_id)? > 0 {
            return Err(AppError::BusinessRule(
                "Move the items out of this category before nesting categories under it".into(),
            ));
        }
    }

    let tx = conn.transaction()?;
    let id = categories::create_category(&tx, member.household_id, &new_category)?;
    activity::record(
        &tx,
        member.household_id,
        &member.user,
        ActivityAction::CategoryCreated,
        format!("Added category \"{}\"", new_category.name),
        None,
    )?;
    tx.commit()?;

    info!(category_id = id, "Category created");
    let category = categories::get_category(&conn, id)?
        .ok_or_else(|| AppError::Internal("Category vanished after insert".into()))?;
    Ok(Json(category))
}

pub async fn update(
    State(state): State<AppState>,
    member: Member,
    Path(id): Path<i64>,
    Json(data): Json<CategoryData>,
) -> AppResult<Json<Category>> {
    let mut conn = state.db.get()?;
    let existing = load_owned(&conn, &member, id)?;
    let new_category = validate(&conn, &member, &data)?;

    if new_category.parent_id != existing.parent_id {
        let all = categories::list_categories(&conn, member.household_id)?;
        if would_create_cycle(&all, id, new_category.parent_id) {
            warn!(category_id = id, parent_id = ?new_category.parent_id, "Rejected circular parent");
            return Err(AppError::Validation(
                "Cannot set parent: would create a circular reference".into(),
            ));
        }
        if let Some(parent_id) = new_category.parent_id {
            if categories::count_items(&conn, parent_id)? > 0 {
                return Err(AppError::BusinessRule(
                    "The new parent category holds items directly".into(),
                ));
            }
        }
    }

    let tx = conn.transaction()?;
    categories::update_category(&tx, id, &new_category)?;
    activity::record(
        &tx,
        member.household_id,
        &member.user,
        ActivityAction::CategoryUpdated,
        format!("Updated category \"{}\"", new_category.name),
        None,
    )?;
    tx.commit()?;

    let category = categories::get_category(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;
    Ok(Json(category))
}

pub async fn delete(
    State(state): State<AppState>,
    member: Member,
    Path(id): Path<i64>,
) -> AppResult<Json<Category>> {
    let mut conn = state.db.get()?;
    let category = load_owned(&conn, &member, id)?;

    if categories::count_children(&conn, id)? > 0 {
        return Err(AppError::BusinessRule(
            "Delete or move the sub-categories first".into(),
        ));
    }
    if categories::count_items(&conn, id)? > 0 {
        return Err(AppError::BusinessRule(
            "This category still has items".into(),
        ));
    }

    let tx = conn.transaction()?;
    categories::delete_category(&tx, id)?;
    activity::record(
        &tx,
        member.household_id,
        &member.user,
        ActivityAction::CategoryDeleted,
        format!("Deleted category \"{}\"", category.name),
        None,
    )?;
    tx.commit()?;

    info!(category_id = id, "Category deleted");
    Ok(Json(category))
}
