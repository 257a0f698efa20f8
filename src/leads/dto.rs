use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::Lead;

/// Dashboard row. Contact details stay hidden until the lead is unlocked.
#[derive(Debug, Serialize)]
pub struct LeadView {
    pub id: Uuid,
    pub lead_id: String,
    pub company_name: String,
    pub contact_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub industry: String,
    pub location: String,
    pub company_size: String,
    pub revenue_range: String,
    pub capital_need: String,
    pub unlocked: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
}

impl LeadView {
    pub fn new(lead: &Lead, unlocked: bool) -> Self {
        Self {
            id: lead.id,
            lead_id: lead.lead_id.clone(),
            company_name: lead.company_name.clone(),
            contact_name: lead.contact_name.clone(),
            email: unlocked.then(|| lead.email.clone()),
            phone: unlocked.then(|| lead.phone.clone()),
            industry: lead.industry.clone(),
            location: lead.location.clone(),
            company_size: lead.company_size.clone(),
            revenue_range: lead.revenue_range.clone(),
            capital_need: lead.capital_need.clone(),
            unlocked,
            created_date: lead.created_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LeadPage {
    pub leads: Vec<LeadView>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub imported: u64,
}
