//! Category hierarchy and rolled-up checklist totals.
//!
//! Categories arrive as a flat list where each row may point at a parent.
//! [`CategoryTree`] turns that into a parent→children map and answers two
//! questions the screens keep asking: "what are the totals of this
//! category including everything below it" and "in what order, at what
//! depth, should the tree be drawn".

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::ops::{Add, AddAssign};

use serde::Serialize;

use crate::models::{Category, ChecklistItem};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTotals {
    pub expected_cents: i64,
    pub paid_cents: i64,
    pub item_count: i64,
    pub purchased_count: i64,
}

impl CategoryTotals {
    pub fn from_item(item: &ChecklistItem) -> Self {
        Self {
            expected_cents: item.expected_cents(),
            paid_cents: item.paid_cents(),
            item_count: 1,
            purchased_count: i64::from(item.is_purchased),
        }
    }

    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a ChecklistItem>) -> Self {
        items.into_iter().map(Self::from_item).fold(Self::default(), Add::add)
    }

    /// Share of purchased items, 0 for an empty category.
    pub fn progress_percent(&self) -> f64 {
        if self.item_count == 0 {
            return 0.0;
        }
        (self.purchased_count as f64 / self.item_count as f64) * 100.0
    }
}

impl Add for CategoryTotals {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for CategoryTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.expected_cents = self.expected_cents.saturating_add(rhs.expected_cents);
        self.paid_cents = self.paid_cents.saturating_add(rhs.paid_cents);
        self.item_count += rhs.item_count;
        self.purchased_count += rhs.purchased_count;
    }
}

/// One line of the rendered tree.
#[derive(Debug, Clone, Serialize)]
pub struct TreeRow {
    #[serde(flatten)]
    pub category: Category,
    pub depth: usize,
    pub is_leaf: bool,
    pub totals: CategoryTotals,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    categories: HashMap<i64, Category>,
    roots: Vec<i64>,
    children: HashMap<i64, Vec<i64>>,
    direct: HashMap<i64, CategoryTotals>,
}

/// Case-insensitive first so "bedroom" and "Bathroom" interleave the way a
/// person expects, exact comparison only to break ties.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

impl CategoryTree {
    pub fn build(categories: &[Category], items: &[ChecklistItem]) -> Self {
        let by_id: HashMap<i64, Category> =
            categories.iter().map(|c| (c.id, c.clone())).collect();

        let mut roots = Vec::new();
        let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
        for category in categories {
            match category.parent_id {
                Some(parent) if by_id.contains_key(&parent) => {
                    children.entry(parent).or_default().push(category.id)
                }
                // Dangling parents are promoted to sections rather than lost.
                _ => roots.push(category.id),
            }
        }

        let by_name = |a: &i64, b: &i64| compare_names(&by_id[a].name, &by_id[b].name);
        roots.sort_by(by_name);
        for siblings in children.values_mut() {
            siblings.sort_by(by_name);
        }

        let mut direct: HashMap<i64, CategoryTotals> = HashMap::new();
        for item in items {
            *direct.entry(item.category_id).or_default() += CategoryTotals::from_item(item);
        }

        Self {
            categories: by_id,
            roots,
            children,
            direct,
        }
    }

    pub fn get(&self, id: i64) -> Option<&Category> {
        self.categories.get(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.categories.contains_key(&id)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Category> {
        self.roots.iter().filter_map(|id| self.categories.get(id))
    }

    pub fn children_of(&self, id: i64) -> &[i64] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_leaf(&self, id: i64) -> bool {
        self.children_of(id).is_empty()
    }

    /// Totals of the category's own items only.
    pub fn direct_totals(&self, id: i64) -> CategoryTotals {
        self.direct.get(&id).copied().unwrap_or_default()
    }

    /// Totals of the category plus every descendant.
    pub fn totals(&self, id: i64) -> CategoryTotals {
        let mut visited = HashSet::new();
        self.collect_totals(id, &mut visited)
    }

    fn collect_totals(&self, id: i64, visited: &mut HashSet<i64>) -> CategoryTotals {
        if !visited.insert(id) {
            return CategoryTotals::default();
        }
        let mut totals = self.direct_totals(id);
        for &child in self.children_of(id) {
            totals += self.collect_totals(child, visited);
        }
        totals
    }

    /// Sum over all sections, i.e. everything reachable from the top level.
    pub fn grand_totals(&self) -> CategoryTotals {
        self.roots.iter().map(|&id| self.totals(id)).fold(CategoryTotals::default(), Add::add)
    }

    /// Every descendant id of `id`, not including `id` itself.
    pub fn descendants(&self, id: i64) -> Vec<i64> {
        let mut out = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut stack: Vec<i64> = self.children_of(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            if !visited.insert(next) {
                continue;
            }
            out.push(next);
            stack.extend(self.children_of(next).iter().rev().copied());
        }
        out
    }

    /// Depth-first rows for drawing the checklist. Sections without any
    /// item anywhere below them are left out entirely.
    pub fn flatten(&self) -> Vec<TreeRow> {
        self.flatten_filtered(true)
    }

    /// Like [`flatten`](Self::flatten) but keeps empty sections, for the
    /// category management screen.
    pub fn flatten_all(&self) -> Vec<TreeRow> {
        self.flatten_filtered(false)
    }

    fn flatten_filtered(&self, hide_empty_sections: bool) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        let mut visited = HashSet::new();
        for &root in &self.roots {
            if hide_empty_sections && self.totals(root).item_count == 0 {
                continue;
            }
            self.push_rows(root, 0, &mut rows, &mut visited);
        }
        rows
    }

    fn push_rows(
        &self,
        id: i64,
        depth: usize,
        rows: &mut Vec<TreeRow>,
        visited: &mut HashSet<i64>,
    ) {
        if !visited.insert(id) {
            return;
        }
        let Some(category) = self.categories.get(&id) else {
            return;
        };
        rows.push(TreeRow {
            category: category.clone(),
            depth,
            is_leaf: self.is_leaf(id),
            totals: self.totals(id),
        });
        for &child in self.children_of(id) {
            self.push_rows(child, depth + 1, rows, visited);
        }
    }
}

/// Walks upward from `proposed_parent`; reaching `category_id` means the
/// new parent would close a loop.
pub fn would_create_cycle(
    categories: &[Category],
    category_id: i64,
    proposed_parent: Option<i64>,
) -> bool {
    let parent_map: HashMap<i64, Option<i64>> =
        categories.iter().map(|c| (c.id, c.parent_id)).collect();
    let mut seen = HashSet::new();
    let mut current = proposed_parent;
    while let Some(cid) = current {
        if cid == category_id {
            return true;
        }
        if !seen.insert(cid) {
            // An existing loop that does not pass through `category_id`.
            return false;
        }
        current = parent_map.get(&cid).copied().flatten();
    }
    false
}
