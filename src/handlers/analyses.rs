use axum::extract::{Path, State};
use axum::response::Json;
use rusqlite::Connection;
use serde::Deserialize;
use tracing::info;

use crate::auth::Member;
use crate::db::queries::{analyses, categories, items};
use crate::error::{AppError, AppResult};
use crate::models::{ActivityAction, Analysis, NewAnalysis};
use crate::services::activity;
use crate::services::analysis::AnalysisWithStats;
use crate::services::category_tree::CategoryTree;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeaturedData {
    pub is_featured: bool,
}

fn load_owned(conn: &Connection, member: &Member, id: i64) -> AppResult<Analysis> {
    let analysis = analyses::get_analysis(conn, id)?
        .ok_or_else(|| AppError::NotFound("Analysis not found".into()))?;
    member.authorize(analysis.household_id)?;
    Ok(analysis)
}

fn validate(conn: &Connection, member: &Member, data: &NewAnalysis) -> AppResult<NewAnalysis> {
    let title = data.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Analysis title is required".into()));
    }

    let mut category_ids = data.category_ids.clone();
    category_ids.sort_unstable();
    category_ids.dedup();
    for &id in &category_ids {
        let category = categories::get_category(conn, id)?
            .ok_or_else(|| AppError::Validation(format!("Unknown category {}", id)))?;
        member.authorize(category.household_id)?;
    }

    Ok(NewAnalysis {
        title: title.to_string(),
        category_ids,
        is_featured: data.is_featured,
    })
}

fn with_stats(conn: &Connection, member: &Member, list: Vec<Analysis>) -> AppResult<Vec<AnalysisWithStats>> {
    let cats = categories::list_categories(conn, member.household_id)?;
    let item_list = items::list_items(conn, member.household_id)?;
    let tree = CategoryTree::build(&cats, &item_list);
    Ok(list
        .into_iter()
        .map(|a| AnalysisWithStats::new(a, &tree, &item_list))
        .collect())
}

fn single(conn: &Connection, member: &Member, analysis: Analysis) -> AppResult<AnalysisWithStats> {
    with_stats(conn, member, vec![analysis])?
        .pop()
        .ok_or_else(|| AppError::Internal("Analysis stats missing".into()))
}

pub async fn index(
    State(state): State<AppState>,
    member: Member,
) -> AppResult<Json<Vec<AnalysisWithStats>>> {
    let conn = state.db.get()?;
    let list = analyses::list_analyses(&conn, member.household_id)?;
    Ok(Json(with_stats(&conn, &member, list)?))
}

pub async fn show(
    State(state): State<AppState>,
    member: Member,
    Path(id): Path<i64>,
) -> AppResult<Json<AnalysisWithStats>> {
    let conn = state.db.get()?;
    let analysis = load_owned(&conn, &member, id)?;
    Ok(Json(single(&conn, &member, analysis)?))
}

pub async fn create(
    State(state): State<AppState>,
    member: Member,
    Json(data): Json<NewAnalysis>,
) -> AppResult<Json<AnalysisWithStats>> {
    let mut conn = state.db.get()?;
    let new_analysis = validate(&conn, &member, &data)?;

    let tx = conn.transaction()?;
    let id = analyses::create_analysis(&tx, member.household_id, &new_analysis)?;
    activity::record(
        &tx,
        member.household_id,
        &member.user,
        ActivityAction::AnalysisCreated,
        format!("Created analysis \"{}\"", new_analysis.title),
        None,
    )?;
    tx.commit()?;

    info!(analysis_id = id, "Analysis created");
    let analysis = load_owned(&conn, &member, id)?;
    Ok(Json(single(&conn, &member, analysis)?))
}

pub async fn update(
    State(state): State<AppState>,
    member: Member,
    Path(id): Path<i64>,
    Json(data): Json<NewAnalysis>,
) -> AppResult<Json<AnalysisWithStats>> {
    let mut conn = state.db.get()?;
    load_owned(&conn, &member, id)?;
    let new_analysis = validate(&conn, &member, &data)?;

    let tx = conn.transaction()?;
    analyses::update_analysis(&tx, id, &new_analysis)?;
    activity::record(
        &tx,
        member.household_id,
        &member.user,
        ActivityAction::AnalysisUpdated,
        format!("Edited analysis \"{}\"", new_analysis.title),
        None,
    )?;
    tx.commit()?;
    info!(analysis_id = id, "Analysis updated");

    let analysis = load_owned(&conn, &member, id)?;
    Ok(Json(single(&conn, &member, analysis)?))
}

pub async fn set_featured(
    State(state): State<AppState>,
    member: Member,
    Path(id): Path<i64>,
    Json(data): Json<FeaturedData>,
) -> AppResult<Json<AnalysisWithStats>> {
    let mut conn = state.db.get()?;
    let before = load_owned(&conn, &member, id)?;

    let tx = conn.transaction()?;
    analyses::set_featured(&tx, id, data.is_featured)?;
    activity::record(
        &tx,
        member.household_id,
        &member.user,
        ActivityAction::AnalysisUpdated,
        if data.is_featured {
            format!("Featured analysis \"{}\"", before.title)
        } else {
            format!("Removed analysis \"{}\" from the dashboard", before.title)
        },
        None,
    )?;
    tx.commit()?;
    info!(analysis_id = id, featured = data.is_featured, "Analysis featured flag changed");

    let analysis = load_owned(&conn, &member, id)?;
    Ok(Json(single(&conn, &member, analysis)?))
}

pub async fn delete(
    State(state): State<AppState>,
    member: Member,
    Path(id): Path<i64>,
) -> AppResult<Json<Analysis>> {
    let mut conn = state.db.get()?;
    let analysis = load_owned(&conn, &member, id)?;

    let tx = conn.transaction()?;
    analyses::delete_analysis(&tx, id)?;
    activity::record(
        &tx,
        member.household_id,
        &member.user,
        ActivityAction::AnalysisDeleted,
        format!("Deleted analysis \"{}\"", analysis.title),
        None,
    )?;
    tx.commit()?;

    info!(analysis_id = id, "Analysis deleted");
    Ok(Json(analysis))
}
