use serde::{Deserialize, Serialize};

use super::UserProfile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
    pub id: i64,
    pub member_ids: Vec<i64>,
    pub created_at: String,
}

impl Household {
    pub const MAX_MEMBERS: usize = 2;

    pub fn is_full(&self) -> bool {
        self.member_ids.len() >= Self::MAX_MEMBERS
    }
}

/// What the household screen needs: who is in it and whether to offer an invite.
#[derive(Debug, Clone, Serialize)]
pub struct HouseholdSummary {
    pub household: Household,
    pub members: Vec<UserProfile>,
    pub partner: Option<UserProfile>,
    pub can_invite_partner: bool,
}

impl HouseholdSummary {
    pub fn new(household: Household, members: Vec<UserProfile>, viewer_id: i64) -> Self {
        let partner = members.iter().find(|m| m.id != viewer_id).cloned();
        let can_invite_partner = members.len() < 2;
        Self {
            household,
            members,
            partner,
            can_invite_partner,
        }
    }
}
