use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Groom,
    Bride,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Groom => "groom",
            Role::Bride => "bride",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "groom" => Some(Role::Groom),
            "bride" => Some(Role::Bride),
            _ => None,
        }
    }

    /// Color theme a member gets unless they picked one explicitly.
    pub fn default_theme(&self) -> &'static str {
        match self {
            Role::Groom => "blue",
            Role::Bride => "rose",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub household_id: Option<i64>,
    pub theme: Option<String>,
    pub theme_override: bool,
    pub created_at: String,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    /// The theme actually in effect: the explicit choice when overridden,
    /// otherwise whatever the role implies.
    pub fn effective_theme(&self) -> String {
        match (&self.theme, self.theme_override) {
            (Some(theme), true) => theme.clone(),
            _ => self.role.default_theme().to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
}
