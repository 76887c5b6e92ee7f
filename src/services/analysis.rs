use std::collections::HashSet;

use serde::Serialize;

use crate::models::{Analysis, ChecklistItem};
use crate::services::category_tree::{CategoryTotals, CategoryTree};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisStats {
    pub expected_cents: i64,
    pub paid_cents: i64,
    pub item_count: i64,
    pub purchased_count: i64,
    pub progress_percent: f64,
}

impl AnalysisStats {
    pub fn compute(tree: &CategoryTree, items: &[ChecklistItem], selected: &[i64]) -> Self {
        let expanded = expand_selection(tree, selected);
        let totals =
            CategoryTotals::from_items(items.iter().filter(|i| expanded.contains(&i.category_id)));
        Self::from(totals)
    }
}

impl From<CategoryTotals> for AnalysisStats {
    fn from(totals: CategoryTotals) -> Self {
        Self {
            expected_cents: totals.expected_cents,
            paid_cents: totals.paid_cents,
            item_count: totals.item_count,
            purchased_count: totals.purchased_count,
            progress_percent: totals.progress_percent(),
        }
    }
}

/// Selected ids plus everything beneath them. Picking a section therefore
/// pulls in all of its sub-categories.
pub fn expand_selection(tree: &CategoryTree, selected: &[i64]) -> HashSet<i64> {
    let mut expanded = HashSet::new();
    for &id in selected {
        if expanded.insert(id) {
            expanded.extend(tree.descendants(id));
        }
    }
    expanded
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisWithStats {
    #[serde(flatten)]
    pub analysis: Analysis,
    pub stats: AnalysisStats,
}

impl AnalysisWithStats {
    pub fn new(analysis: Analysis, tree: &CategoryTree, items: &[ChecklistItem]) -> Self {
        let stats = AnalysisStats::compute(tree, items, &analysis.category_ids);
        Self { analysis, stats }
    }
}
