//! Persistence seam. Handlers and services talk to [`MarketStore`]; the
//! PostgreSQL implementation backs production and [`MemoryStore`] backs tests.

use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User, UserProfile};
use crate::auth::CreateUserError;
use crate::leads::repo_types::{Lead, NewLead};
use crate::ledger::repo_types::{CreditTransaction, UnlockReceipt};
use crate::ledger::LedgerError;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait MarketStore: Send + Sync {
    // users & sessions
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// Fails with [`CreateUserError::EmailTaken`] when the email is already registered.
    async fn create_user(&self, new: NewUser) -> Result<UserProfile, CreateUserError>;
    async fn get_profile(&self, user_id: Uuid) -> anyhow::Result<Option<UserProfile>>;
    async fn list_profiles(&self) -> anyhow::Result<Vec<UserProfile>>;
    async fn create_session(&self, user_id: Uuid) -> anyhow::Result<Uuid>;
    async fn session_active(&self, session_id: Uuid) -> anyhow::Result<bool>;
    async fn revoke_session(&self, session_id: Uuid) -> anyhow::Result<()>;

    // leads
    /// All-or-nothing batch insert.
    async fn insert_leads(&self, leads: Vec<NewLead>) -> anyhow::Result<u64>;
    /// Newest first; `None` lists every status.
    async fn list_leads(&self, status: Option<&str>) -> anyhow::Result<Vec<Lead>>;

    // ledger
    async fn downloaded_lead_ids(&self, user_id: Uuid) -> anyhow::Result<HashSet<Uuid>>;
    async fn list_transactions(&self, user_id: Uuid) -> anyhow::Result<Vec<CreditTransaction>>;
    /// Atomically charges for the not-yet-unlocked subset of `lead_ids`.
    async fn unlock_leads(
        &self,
        user_id: Uuid,
        lead_ids: &[Uuid],
        request_id: Uuid,
    ) -> Result<UnlockReceipt, LedgerError>;
    /// Atomically adds `amount` and logs the grant; returns the new balance.
    async fn grant_credits(&self, user_id: Uuid, amount: i64) -> Result<i64, LedgerError>;
}
