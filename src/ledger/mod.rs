use crate::state::AppState;
use axum::Router;
use uuid::Uuid;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod selection;
pub mod settle;
pub mod services;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Select at least one lead first.")]
    EmptySelection,
    #[error("{0} selected lead(s) are not available.")]
    UnknownLeads(usize),
    #[error("Not enough credits. You need {needed} but have {available} (short by {}).", .needed - .available)]
    InsufficientCredits { needed: i64, available: i64 },
    #[error("Enter a positive whole number of credits.")]
    InvalidAmount,
    #[error("That grant would push the balance past its limit.")]
    BalanceOverflow,
    #[error("This request id was already used for a different selection.")]
    RequestReused,
    #[error("User {0} not found.")]
    UnknownUser(Uuid),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub fn router() -> Router<AppState> {
    handlers::ledger_routes()
}
