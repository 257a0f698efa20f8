use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const TX_GRANT: &str = "grant";
pub const TX_DEDUCT: &str = "deduct";

/// Append-only credit ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct CreditTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64, // signed: grants positive, deductions negative
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub request_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Result of an unlock+charge.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UnlockReceipt {
    pub request_id: Uuid,
    pub charged: i64,
    pub newly_unlocked: Vec<Uuid>,
    pub balance: i64,
    /// True when `request_id` had already been settled; nothing was charged again.
    pub replayed: bool,
}
