use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::MarketStore;
use crate::auth::repo_types::{NewUser, User, UserProfile, ROLE_CLIENT, STATUS_ACTIVE};
use crate::auth::CreateUserError;
use crate::leads::repo_types::{Lead, NewLead};
use crate::ledger::{
    repo_types::{CreditTransaction, UnlockReceipt, TX_DEDUCT, TX_GRANT},
    settle::{apply_grant, plan_unlock, SettledRequest, UnlockPlan},
    LedgerError,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    profiles: Vec<UserProfile>,
    sessions: HashMap<Uuid, bool>, // id -> live
    leads: Vec<Lead>,
    history: HashSet<(Uuid, Uuid)>, // (user_id, lead_id)
    transactions: Vec<CreditTransaction>,
    requests: HashMap<(Uuid, Uuid), SettledRequest>, // (user_id, request_id)
}

impl Tables {
    fn profile_mut(&mut self, user_id: Uuid) -> Option<&mut UserProfile> {
        self.profiles.iter_mut().find(|p| p.id == user_id)
    }

    fn log(&mut self, user_id: Uuid, amount: i64, kind: &str, description: String, request_id: Option<Uuid>) {
        self.transactions.push(CreditTransaction {
            id: Uuid::new_v4(),
            user_id,
            amount,
            kind: kind.into(),
            description,
            request_id,
            created_at: OffsetDateTime::now_utc(),
        });
    }
}

/// In-process store. Every operation runs under one lock, so multi-step
/// ledger writes are as atomic as the PostgreSQL transactions they mirror.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sets a user's role, the way an operator promotes an admin.
    pub fn set_role(&self, user_id: Uuid, role: &str) -> bool {
        match self.lock().profile_mut(user_id) {
            Some(p) => {
                p.role = role.into();
                true
            }
            None => false,
        }
    }

    /// Overwrites a balance without logging a transaction.
    pub fn set_credits(&self, user_id: Uuid, credits: i64) -> bool {
        match self.lock().profile_mut(user_id) {
            Some(p) => {
                p.credits = credits;
                true
            }
            None => false,
        }
    }

    pub fn all_transactions(&self) -> Vec<CreditTransaction> {
        self.lock().transactions.clone()
    }
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, new: NewUser) -> Result<UserProfile, CreateUserError> {
        let mut t = self.lock();
        if t.users.iter().any(|u| u.email == new.email) {
            return Err(CreateUserError::EmailTaken);
        }
        let now = OffsetDateTime::now_utc();
        let id = Uuid::new_v4();
        t.users.push(User {
            id,
            email: new.email.clone(),
            password_hash: new.password_hash,
            created_at: now,
        });
        let profile = UserProfile {
            id,
            email: new.email,
            name: new.name,
            company: new.company,
            credits: 0,
            role: ROLE_CLIENT.into(),
            status: STATUS_ACTIVE.into(),
            created_at: now,
        };
        t.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn get_profile(&self, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        Ok(self.lock().profiles.iter().find(|p| p.id == user_id).cloned())
    }

    async fn list_profiles(&self) -> anyhow::Result<Vec<UserProfile>> {
        let mut rows = self.lock().profiles.clone();
        rows.reverse();
        Ok(rows)
    }

    async fn create_session(&self, _user_id: Uuid) -> anyhow::Result<Uuid> {
        let id = Uuid::new_v4();
        self.lock().sessions.insert(id, true);
        Ok(id)
    }

    async fn session_active(&self, session_id: Uuid) -> anyhow::Result<bool> {
        Ok(self.lock().sessions.get(&session_id).copied().unwrap_or(false))
    }

    async fn revoke_session(&self, session_id: Uuid) -> anyhow::Result<()> {
        if let Some(live) = self.lock().sessions.get_mut(&session_id) {
            *live = false;
        }
        Ok(())
    }

    async fn insert_leads(&self, batch: Vec<NewLead>) -> anyhow::Result<u64> {
        let now = OffsetDateTime::now_utc();
        let count = batch.len() as u64;
        let mut t = self.lock();
        for new in batch {
            t.leads.push(Lead {
                id: Uuid::new_v4(),
                lead_id: new.lead_id,
                company_name: new.company_name,
                contact_name: new.contact_name,
                email: new.email,
                phone: new.phone,
                industry: new.industry,
                location: new.location,
                company_size: new.company_size,
                revenue_range: new.revenue_range,
                capital_need: new.capital_need,
                status: new.status,
                created_date: now,
            });
        }
        Ok(count)
    }

    async fn list_leads(&self, status: Option<&str>) -> anyhow::Result<Vec<Lead>> {
        let t = self.lock();
        Ok(t.leads
            .iter()
            .rev()
            .filter(|l| status.map_or(true, |s| l.status == s))
            .cloned()
            .collect())
    }

    async fn downloaded_lead_ids(&self, user_id: Uuid) -> anyhow::Result<HashSet<Uuid>> {
        Ok(self
            .lock()
            .history
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, l)| *l)
            .collect())
    }

    async fn list_transactions(&self, user_id: Uuid) -> anyhow::Result<Vec<CreditTransaction>> {
        Ok(self
            .lock()
            .transactions
            .iter()
            .rev()
            .filter(|tx| tx.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn unlock_leads(
        &self,
        user_id: Uuid,
        lead_ids: &[Uuid],
        request_id: Uuid,
    ) -> Result<UnlockReceipt, LedgerError> {
        let mut t = self.lock();
        let balance = t
            .profiles
            .iter()
            .find(|p| p.id == user_id)
            .map(|p| p.credits)
            .ok_or(LedgerError::UnknownUser(user_id))?;

        let unlocked: HashSet<Uuid> = t
            .history
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, l)| *l)
            .collect();
        let prior = t.requests.get(&(user_id, request_id));

        let (newly_unlocked, cost) = match plan_unlock(prior, lead_ids, &unlocked, balance)? {
            UnlockPlan::Replay { charged } => {
                return Ok(UnlockReceipt {
                    request_id,
                    charged,
                    newly_unlocked: Vec::new(),
                    balance,
                    replayed: true,
                })
            }
            UnlockPlan::Charge { newly_unlocked, cost } => (newly_unlocked, cost),
        };

        let mut remaining = balance;
        if cost > 0 {
            if let Some(p) = t.profile_mut(user_id) {
                p.credits -= cost;
                remaining = p.credits;
            }
            for lead_id in &newly_unlocked {
                t.history.insert((user_id, *lead_id));
            }
            t.log(user_id, -cost, TX_DEDUCT, format!("Downloaded {cost} leads"), Some(request_id));
        }
        t.requests.insert(
            (user_id, request_id),
            SettledRequest {
                lead_ids: lead_ids.to_vec(),
                charged: cost,
            },
        );

        Ok(UnlockReceipt {
            request_id,
            charged: cost,
            newly_unlocked,
            balance: remaining,
            replayed: false,
        })
    }

    async fn grant_credits(&self, user_id: Uuid, amount: i64) -> Result<i64, LedgerError> {
        let mut t = self.lock();
        let profile = t.profile_mut(user_id).ok_or(LedgerError::UnknownUser(user_id))?;
        let credits = apply_grant(profile.credits, amount)?;
        profile.credits = credits;
        t.log(user_id, amount, TX_GRANT, format!("Admin granted {amount} credits"), None);
        Ok(credits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn client(store: &MemoryStore, credits: i64) -> Uuid {
        let profile = store
            .create_user(NewUser {
                email: format!("{}@acme.com", Uuid::new_v4()),
                password_hash: "x".into(),
                name: "C".into(),
                company: "Acme".into(),
            })
            .await
            .unwrap();
        store.set_credits(profile.id, credits);
        profile.id
    }

    #[tokio::test]
    async fn insufficient_credits_change_nothing() {
        let store = MemoryStore::new();
        let user = client(&store, 3).await;
        let leads: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();

        let err = store.unlock_leads(user, &leads, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientCredits { needed: 5, available: 3 }));

        assert_eq!(store.get_profile(user).await.unwrap().unwrap().credits, 3);
        assert!(store.downloaded_lead_ids(user).await.unwrap().is_empty());
        assert!(store.list_transactions(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unlocked_leads_are_free_the_second_time() {
        let store = MemoryStore::new();
        let user = client(&store, 10).await;
        let leads: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();

        let first = store.unlock_leads(user, &leads[..1], Uuid::new_v4()).await.unwrap();
        assert_eq!(first.charged, 1);

        let second = store.unlock_leads(user, &leads, Uuid::new_v4()).await.unwrap();
        assert_eq!(second.charged, 2);
        assert_eq!(second.balance, 7);
        assert_eq!(second.newly_unlocked, vec![leads[1], leads[2]]);
    }

    #[tokio::test]
    async fn same_request_id_is_not_charged_twice() {
        let store = MemoryStore::new();
        let user = client(&store, 10).await;
        let leads: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let request_id = Uuid::new_v4();

        store.unlock_leads(user, &leads, request_id).await.unwrap();
        let retry = store.unlock_leads(user, &leads, request_id).await.unwrap();
        assert!(retry.replayed);
        assert_eq!(retry.charged, 4);
        assert_eq!(retry.balance, 6);
        assert_eq!(store.list_transactions(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn grant_adds_and_logs_once() {
        let store = MemoryStore::new();
        let user = client(&store, 10).await;

        assert_eq!(store.grant_credits(user, 50).await.unwrap(), 60);
        let txs = store.list_transactions(user).await.unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].amount, 50);
        assert_eq!(txs[0].kind, "grant");
    }

    #[tokio::test]
    async fn replayed_request_cannot_widen_the_selection() {
        let store = MemoryStore::new();
        let user = client(&store, 1).await;
        let leads: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let request_id = Uuid::new_v4();

        store.unlock_leads(user, &leads[..1], request_id).await.unwrap();
        let err = store.unlock_leads(user, &leads, request_id).await.unwrap_err();
        assert!(matches!(err, LedgerError::RequestReused));
        assert_eq!(store.downloaded_lead_ids(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn request_ids_are_scoped_per_user() {
        let store = MemoryStore::new();
        let alice = client(&store, 5).await;
        let bob = client(&store, 5).await;
        let leads: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();
        let request_id = Uuid::new_v4();

        store.unlock_leads(alice, &leads, request_id).await.unwrap();
        let bobs = store.unlock_leads(bob, &leads, request_id).await.unwrap();
        assert!(!bobs.replayed);
        assert_eq!(bobs.charged, 2);
    }

    #[tokio::test]
    async fn grant_past_max_balance_is_refused() {
        let store = MemoryStore::new();
        let user = client(&store, 10).await;

        let err = store.grant_credits(user, i64::MAX).await.unwrap_err();
        assert!(matches!(err, LedgerError::BalanceOverflow));
        assert_eq!(store.get_profile(user).await.unwrap().unwrap().credits, 10);
        assert!(store.list_transactions(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_reported_as_taken() {
        let store = MemoryStore::new();
        let new = || NewUser {
            email: "pat@acme.com".into(),
            password_hash: "x".into(),
            name: "Pat".into(),
            company: "Acme".into(),
        };
        store.create_user(new()).await.unwrap();
        assert!(matches!(store.create_user(new()).await, Err(CreateUserError::EmailTaken)));
    }

    #[tokio::test]
    async fn grant_to_unknown_user_fails() {
        let store = MemoryStore::new();
        let err = store.grant_credits(Uuid::new_v4(), 5).await.unwrap_err();
        assert!(matches!(err, LedgerError::UnknownUser(_)));
    }
}
