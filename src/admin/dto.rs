use serde::{Deserialize, Serialize};

use crate::auth::repo_types::{UserProfile, ROLE_CLIENT};

/// Dashboard counters for the admin console.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub total_leads: usize,
    pub client_users: usize,
    pub total_credits: i64,
}

impl Stats {
    /// Credits are summed over every account, admins included.
    pub fn compute(lead_count: usize, users: &[UserProfile]) -> Self {
        Self {
            total_leads: lead_count,
            client_users: users.iter().filter(|u| u.role == ROLE_CLIENT).count(),
            total_credits: users.iter().map(|u| u.credits).sum(),
        }
    }
}
