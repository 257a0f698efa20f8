use crate::config::AppConfig;
use crate::store::{MarketStore, MemoryStore, PgStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn MarketStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = PgStore::connect(&config).await?;
        store.migrate().await?;

        Ok(Self {
            config,
            store: Arc::new(store) as Arc<dyn MarketStore>,
        })
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn MarketStore>) -> Self {
        Self { config, store }
    }

    /// In-memory state for tests; no database required.
    pub fn fake() -> Self {
        Self::with_memory_store(Arc::new(MemoryStore::new()))
    }

    /// Like [`AppState::fake`], but the caller keeps a handle on the store
    /// to seed roles and balances directly.
    pub fn with_memory_store(store: Arc<MemoryStore>) -> Self {
        Self::from_parts(Arc::new(AppConfig::for_tests()), store)
    }
}
