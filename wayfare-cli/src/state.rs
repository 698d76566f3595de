use std::sync::Arc;

use tracing::info;
use wayfare_core::{OfferRetriever, RecentSearchStore};
use wayfare_offer::{RecentSearchLedger, SearchSession};
use wayfare_store::{
    Config, DbClient, FileRecentSearchStore, FixtureOfferRetriever, InMemoryRecentSearchStore, ListingsBackend,
    PostgresOfferRetriever, RecentBackend, RedisClient, RedisRecentSearchStore, StoreError,
};

/// Collaborators shared by every command.
#[derive(Clone)]
pub struct AppState {
    pub retriever: Arc<dyn OfferRetriever>,
    pub recent_store: Arc<dyn RecentSearchStore>,
    pub deals_limit: usize,
}

impl AppState {
    pub fn new(retriever: Arc<dyn OfferRetriever>, recent_store: Arc<dyn RecentSearchStore>, deals_limit: usize) -> Self {
        Self {
            retriever,
            recent_store,
            deals_limit,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        let retriever: Arc<dyn OfferRetriever> = match config.listings.backend {
            ListingsBackend::Postgres => {
                let db = DbClient::new(&config.database).await?;
                Arc::new(PostgresOfferRetriever::new(db.pool))
            }
            ListingsBackend::Fixture => Arc::new(FixtureOfferRetriever::load(&config.listings.fixture_path).await?),
        };

        let recent_store: Arc<dyn RecentSearchStore> = match config.recent.backend {
            RecentBackend::Redis => {
                let redis = RedisClient::new(&config.recent.redis_url)?;
                Arc::new(RedisRecentSearchStore::new(redis, config.recent.key.clone()))
            }
            RecentBackend::File => Arc::new(FileRecentSearchStore::new(config.recent.path.clone())),
            RecentBackend::Memory => Arc::new(InMemoryRecentSearchStore::new()),
        };

        info!(
            "Listings from {:?}, recent searches in {:?}",
            config.listings.backend, config.recent.backend
        );
        Ok(Self::new(retriever, recent_store, config.deals.limit))
    }

    /// Fresh results view with the persisted recent searches loaded.
    pub async fn session(&self) -> SearchSession {
        let ledger = RecentSearchLedger::load(self.recent_store.clone()).await;
        SearchSession::new(self.retriever.clone(), ledger)
    }
}
