use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::info;
use wayfare_core::{BoxError, RecentSearchEntry, RecentSearchStore, StoredSearches};

use crate::StoreError;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    pub async fn get_json(&self, key: &str) -> Result<Option<String>, redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    pub async fn set_json(&self, key: &str, value: &str) -> Result<(), redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }
}

/// Recent searches kept as one JSON array under a single key.
#[derive(Clone)]
pub struct RedisRecentSearchStore {
    redis: RedisClient,
    key: String,
}

impl RedisRecentSearchStore {
    pub fn new(redis: RedisClient, key: impl Into<String>) -> Self {
        Self { redis, key: key.into() }
    }
}

#[async_trait]
impl RecentSearchStore for RedisRecentSearchStore {
    async fn get(&self) -> Result<Vec<RecentSearchEntry>, BoxError> {
        let raw = self.redis.get_json(&self.key).await.map_err(StoreError::from)?;
        match raw {
            Some(raw) => {
                let StoredSearches(entries) = serde_json::from_str(&raw).map_err(StoreError::from)?;
                Ok(entries)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn put(&self, entries: &[RecentSearchEntry]) -> Result<(), BoxError> {
        let raw = serde_json::to_string(entries).map_err(StoreError::from)?;
        self.redis.set_json(&self.key, &raw).await.map_err(StoreError::from)?;
        info!("Stored {} recent searches under {}", entries.len(), self.key);
        Ok(())
    }
}
