use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use crate::auth::Member;
use crate::db::queries::{analyses, categories, items};
use crate::error::AppResult;
use crate::models::HouseholdSummary;
use crate::services::analysis::{AnalysisStats, AnalysisWithStats};
use crate::services::category_tree::{CategoryTree, TreeRow};
use crate::services::households;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub totals: AnalysisStats,
    pub sections: Vec<TreeRow>,
    pub featured: Vec<AnalysisWithStats>,
    pub household: HouseholdSummary,
}

pub async fn index(State(state): State<AppState>, member: Member) -> AppResult<Json<Dashboard>> {
    let conn = state.db.get()?;

    let cats = categories::list_categories(&conn, member.household_id)?;
    let item_list = items::list_items(&conn, member.household_id)?;
    let tree = CategoryTree::build(&cats, &item_list);

    let featured = analyses::list_analyses(&conn, member.household_id)?
        .into_iter()
        .filter(|a| a.is_featured)
        .map(|a| AnalysisWithStats::new(a, &tree, &item_list))
        .collect();

    let household = households::load_summary(&conn, member.household_id, member.user.id)?;

    Ok(Json(Dashboard {
        totals: AnalysisStats::from(tree.grand_totals()),
        sections: tree.flatten(),
        featured,
        household,
    }))
}
