use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const STATUS_AVAILABLE: &str = "available";

/// Lead row as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Lead {
    pub id: Uuid,
    pub lead_id: String,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub industry: String,
    pub location: String,
    pub company_size: String,
    pub revenue_range: String,
    pub capital_need: String,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
}

/// A lead parsed from an upload, not yet stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewLead {
    pub lead_id: String,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub industry: String,
    pub location: String,
    pub company_size: String,
    pub revenue_range: String,
    pub capital_need: String,
    pub status: String,
}
