//! Local, not-yet-confirmed edits to a checklist.
//!
//! A client shows the result of "delete" or "unpurchase" immediately and
//! sends the real mutation alongside. [`apply`] is the pure state
//! transition. [`OptimisticList`] layers in-flight operations on top of the
//! last authoritative snapshot, so a failed mutation simply drops out of
//! the view and a fresh snapshot replaces the base without losing edits
//! that are still in flight.
//!
//! Nothing on the server calls this module. It is the client-side
//! reconciliation model, shipped with the library so front ends share one
//! definition of how pending edits combine with server snapshots.

use serde::{Deserialize, Serialize};

use crate::models::ChecklistItem;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimisticAction {
    Purchase { id: i64, final_price_cents: i64 },
    Unpurchase { id: i64 },
    Delete { id: i64 },
}

impl OptimisticAction {
    pub fn target(&self) -> i64 {
        match self {
            OptimisticAction::Purchase { id, .. }
            | OptimisticAction::Unpurchase { id }
            | OptimisticAction::Delete { id } => *id,
        }
    }
}

/// Returns the list as it looks after `action`. Unknown ids are a no-op.
pub fn apply(items: &[ChecklistItem], action: &OptimisticAction) -> Vec<ChecklistItem> {
    match action {
        OptimisticAction::Delete { id } => items.iter().filter(|i| i.id != *id).cloned().collect(),
        OptimisticAction::Unpurchase { id } => items
            .iter()
            .cloned()
            .map(|mut i| {
                if i.id == *id {
                    i.mark_unpurchased();
                }
                i
            })
            .collect(),
        OptimisticAction::Purchase {
            id,
            final_price_cents,
        } => items
            .iter()
            .cloned()
            .map(|mut i| {
                if i.id == *id {
                    i.mark_purchased(*final_price_cents);
                }
                i
            })
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingState {
    InFlight,
    /// The store accepted it but no snapshot containing it has arrived yet.
    Confirmed,
}

#[derive(Debug, Clone)]
struct PendingOp {
    id: PendingId,
    action: OptimisticAction,
    state: PendingState,
}

#[derive(Debug, Clone, Default)]
pub struct OptimisticList {
    base: Vec<ChecklistItem>,
    pending: Vec<PendingOp>,
    next_id: u64,
}

impl OptimisticList {
    pub fn new(snapshot: Vec<ChecklistItem>) -> Self {
        Self {
            base: snapshot,
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Applies `action` locally and returns a handle to settle it with later.
    pub fn begin(&mut self, action: OptimisticAction) -> PendingId {
        self.next_id += 1;
        let id = PendingId(self.next_id);
        self.pending.push(PendingOp {
            id,
            action,
            state: PendingState::InFlight,
        });
        id
    }

    /// Records the outcome of the backing mutation. A failure removes the
    /// patch, which restores the item exactly as the last snapshot had it.
    pub fn settle<E>(&mut self, id: PendingId, outcome: Result<(), E>) {
        match outcome {
            Ok(()) => {
                if let Some(op) = self.pending.iter_mut().find(|op| op.id == id) {
                    op.state = PendingState::Confirmed;
                }
            }
            Err(_) => {
                self.pending.retain(|op| op.id != id);
            }
        }
    }

    /// Replaces the base with an authoritative snapshot. Confirmed patches
    /// are now part of the snapshot; in-flight ones keep applying on top.
    pub fn reconcile(&mut self, snapshot: Vec<ChecklistItem>) {
        self.base = snapshot;
        self.pending.retain(|op| op.state == PendingState::InFlight);
    }

    pub fn is_pending(&self, item_id: i64) -> bool {
        self.pending.iter().any(|op| op.action.target() == item_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The list the user should currently see.
    pub fn items(&self) -> Vec<ChecklistItem> {
        self.pending
            .iter()
            .fold(self.base.clone(), |items, op| apply(&items, &op.action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn item(id: i64, paid: Option<i64>) -> ChecklistItem {
        ChecklistItem {
            id,
            household_id: 1,
            category_id: 1,
            name: format!("item {id}"),
            min_price_cents: 100,
            max_price_cents: 200,
            is_purchased: paid.is_some(),
            final_price_cents: paid,
            priority: Priority::Medium,
            notes: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn ids(items: &[ChecklistItem]) -> Vec<i64> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_apply_unpurchase_clears_price() {
        let items = vec![item(1, Some(180)), item(2, None)];
        let next = apply(&items, &OptimisticAction::Unpurchase { id: 1 });
        assert!(!next[0].is_purchased);
        assert_eq!(next[0].final_price_cents, None);
        assert_eq!(next[1], items[1]);
    }

    #[test]
    fn test_apply_delete_and_unknown_id() {
        let items = vec![item(1, None), item(2, None)];
        assert_eq!(ids(&apply(&items, &OptimisticAction::Delete { id: 1 })), vec![2]);
        assert_eq!(apply(&items, &OptimisticAction::Delete { id: 9 }), items);
    }

    #[test]
    fn test_failed_delete_restores_item_in_place() {
        let mut list = OptimisticList::new(vec![item(1, None), item(2, None), item(3, None)]);
        let pending = list.begin(OptimisticAction::Delete { id: 2 });
        assert_eq!(ids(&list.items()), vec![1, 3]);
        assert!(list.is_pending(2));

        list.settle(pending, Err("permission denied"));
        assert_eq!(ids(&list.items()), vec![1, 2, 3]);
        assert_eq!(list.pending_count(), 0);
    }

    #[test]
    fn test_failed_unpurchase_restores_purchase() {
        let mut list = OptimisticList::new(vec![item(1, Some(150))]);
        let pending = list.begin(OptimisticAction::Unpurchase { id: 1 });
        assert!(!list.items()[0].is_purchased);

        list.settle(pending, Err(()));
        assert_eq!(list.items()[0].final_price_cents, Some(150));
    }

    #[test]
    fn test_confirmed_patch_survives_until_snapshot() {
        let mut list = OptimisticList::new(vec![item(1, None), item(2, None)]);
        let pending = list.begin(OptimisticAction::Delete { id: 1 });
        list.settle::<()>(pending, Ok(()));
        assert_eq!(ids(&list.items()), vec![2]);

        list.reconcile(vec![item(2, None)]);
        assert_eq!(list.pending_count(), 0);
        assert_eq!(ids(&list.items()), vec![2]);
    }

    #[test]
    fn test_in_flight_patch_reapplied_over_new_snapshot() {
        let mut list = OptimisticList::new(vec![item(1, Some(100))]);
        list.begin(OptimisticAction::Unpurchase { id: 1 });

        // Partner's edit arrives before our mutation is acknowledged.
        list.reconcile(vec![item(1, Some(100)), item(4, None)]);
        let view = list.items();
        assert_eq!(ids(&view), vec![1, 4]);
        assert!(!view[0].is_purchased);
    }
}
