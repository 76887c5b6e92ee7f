use serde::{Deserialize, Serialize};

/// A saved, named filter over categories. Statistics are derived on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub id: i64,
    pub household_id: i64,
    pub title: String,
    pub category_ids: Vec<i64>,
    pub is_featured: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAnalysis {
    pub title: String,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    #[serde(default)]
    pub is_featured: bool,
}
