use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    ItemCreated,
    ItemUpdated,
    ItemPurchased,
    ItemUnpurchased,
    ItemDeleted,
    CategoryCreated,
    CategoryUpdated,
    CategoryDeleted,
    AnalysisCreated,
    AnalysisUpdated,
    AnalysisDeleted,
    ChecklistImported,
    PartnerJoined,
    Reverted,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::ItemCreated => "item_created",
            ActivityAction::ItemUpdated => "item_updated",
            ActivityAction::ItemPurchased => "item_purchased",
            ActivityAction::ItemUnpurchased => "item_unpurchased",
            ActivityAction::ItemDeleted => "item_deleted",
            ActivityAction::CategoryCreated => "category_created",
            ActivityAction::CategoryUpdated => "category_updated",
            ActivityAction::CategoryDeleted => "category_deleted",
            ActivityAction::AnalysisCreated => "analysis_created",
            ActivityAction::AnalysisUpdated => "analysis_updated",
            ActivityAction::AnalysisDeleted => "analysis_deleted",
            ActivityAction::ChecklistImported => "checklist_imported",
            ActivityAction::PartnerJoined => "partner_joined",
            ActivityAction::Reverted => "reverted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "item_created" => Some(ActivityAction::ItemCreated),
            "item_updated" => Some(ActivityAction::ItemUpdated),
            "item_purchased" => Some(ActivityAction::ItemPurchased),
            "item_unpurchased" => Some(ActivityAction::ItemUnpurchased),
            "item_deleted" => Some(ActivityAction::ItemDeleted),
            "category_created" => Some(ActivityAction::CategoryCreated),
            "category_updated" => Some(ActivityAction::CategoryUpdated),
            "category_deleted" => Some(ActivityAction::CategoryDeleted),
            "analysis_created" => Some(ActivityAction::AnalysisCreated),
            "analysis_updated" => Some(ActivityAction::AnalysisUpdated),
            "analysis_deleted" => Some(ActivityAction::AnalysisDeleted),
            "checklist_imported" => Some(ActivityAction::ChecklistImported),
            "partner_joined" => Some(ActivityAction::PartnerJoined),
            "reverted" => Some(ActivityAction::Reverted),
            _ => None,
        }
    }

    /// Actions whose payload carries enough state to be undone.
    pub fn is_revertible(&self) -> bool {
        matches!(
            self,
            ActivityAction::ItemCreated
                | ActivityAction::ItemUpdated
                | ActivityAction::ItemPurchased
                | ActivityAction::ItemUnpurchased
                | ActivityAction::ItemDeleted
        )
    }
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: i64,
    pub household_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub action: ActivityAction,
    pub details: String,
    pub payload: Option<serde_json::Value>,
    pub reverted: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub household_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub action: ActivityAction,
    pub details: String,
    pub payload: Option<serde_json::Value>,
}
