use std::collections::HashSet;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::MarketStore;
use crate::auth::{
    repo as users,
    repo_types::{NewUser, User, UserProfile},
    CreateUserError,
};
use crate::config::AppConfig;
use crate::leads::{
    repo as leads,
    repo_types::{Lead, NewLead},
};
use crate::ledger::{
    repo as ledger,
    repo_types::{CreditTransaction, UnlockReceipt},
    LedgerError,
};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub fn from_pool(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

#[async_trait]
impl MarketStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        User::find_by_email(&self.db, email).await
    }

    async fn create_user(&self, new: NewUser) -> Result<UserProfile, CreateUserError> {
        User::create_with_profile(&self.db, &new).await
    }

    async fn get_profile(&self, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        users::get_profile(&self.db, user_id).await
    }

    async fn list_profiles(&self) -> anyhow::Result<Vec<UserProfile>> {
        users::list_profiles(&self.db).await
    }

    async fn create_session(&self, user_id: Uuid) -> anyhow::Result<Uuid> {
        users::create_session(&self.db, user_id).await
    }

    async fn session_active(&self, session_id: Uuid) -> anyhow::Result<bool> {
        users::session_active(&self.db, session_id).await
    }

    async fn revoke_session(&self, session_id: Uuid) -> anyhow::Result<()> {
        users::revoke_session(&self.db, session_id).await
    }

    async fn insert_leads(&self, batch: Vec<NewLead>) -> anyhow::Result<u64> {
        leads::insert_batch(&self.db, &batch).await
    }

    async fn list_leads(&self, status: Option<&str>) -> anyhow::Result<Vec<Lead>> {
        leads::list(&self.db, status).await
    }

    async fn downloaded_lead_ids(&self, user_id: Uuid) -> anyhow::Result<HashSet<Uuid>> {
        ledger::downloaded_lead_ids(&self.db, user_id).await
    }

    async fn list_transactions(&self, user_id: Uuid) -> anyhow::Result<Vec<CreditTransaction>> {
        ledger::list_transactions(&self.db, user_id).await
    }

    async fn unlock_leads(
        &self,
        user_id: Uuid,
        lead_ids: &[Uuid],
        request_id: Uuid,
    ) -> Result<UnlockReceipt, LedgerError> {
        ledger::unlock_and_charge(&self.db, user_id, lead_ids, request_id).await
    }

    async fn grant_credits(&self, user_id: Uuid, amount: i64) -> Result<i64, LedgerError> {
        ledger::grant(&self.db, user_id, amount).await
    }
}
