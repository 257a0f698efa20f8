use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub lead_ids: Vec<Uuid>,
}

/// What a download would cost right now.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Quote {
    pub selected: usize,
    pub cost: i64,
    pub balance: i64,
    pub sufficient: bool,
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub lead_ids: Vec<Uuid>,
    /// Client-generated; retries with the same id are not charged twice.
    #[serde(default = "Uuid::new_v4")]
    pub request_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    pub user_id: Uuid,
    /// Number or numeric string, as typed into the admin form.
    pub amount: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct GrantResponse {
    pub user_id: Uuid,
    pub credits: i64,
}
