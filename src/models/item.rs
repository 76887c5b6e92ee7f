use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: i64,
    pub household_id: i64,
    pub category_id: i64,
    pub name: String,
    pub min_price_cents: i64,
    pub max_price_cents: i64,
    pub is_purchased: bool,
    pub final_price_cents: Option<i64>,
    pub priority: Priority,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ChecklistItem {
    /// Midpoint of the price range while the item is still open, zero once bought.
    pub fn expected_cents(&self) -> i64 {
        if self.is_purchased {
            0
        } else {
            let (low, high) = if self.min_price_cents <= self.max_price_cents {
                (self.min_price_cents, self.max_price_cents)
            } else {
                (self.max_price_cents, self.min_price_cents)
            };
            low + (high - low) / 2
        }
    }

    pub fn paid_cents(&self) -> i64 {
        if self.is_purchased {
            self.final_price_cents.unwrap_or(0)
        } else {
            0
        }
    }

    pub fn mark_purchased(&mut self, final_price_cents: i64) {
        self.is_purchased = true;
        self.final_price_cents = Some(final_price_cents);
    }

    pub fn mark_unpurchased(&mut self) {
        self.is_purchased = false;
        self.final_price_cents = None;
    }

    pub fn to_new(&self) -> NewChecklistItem {
        NewChecklistItem {
            name: self.name.clone(),
            category_id: self.category_id,
            min_price_cents: self.min_price_cents,
            max_price_cents: self.max_price_cents,
            priority: self.priority,
            notes: self.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChecklistItem {
    pub name: String,
    pub category_id: i64,
    #[serde(default)]
    pub min_price_cents: i64,
    #[serde(default)]
    pub max_price_cents: i64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub notes: Option<String>,
}
