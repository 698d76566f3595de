pub mod app_config;
pub mod database;
pub mod offer_repo;
pub mod fixture_repo;
pub mod redis_repo;
pub mod file_repo;
pub mod memory_repo;

pub use app_config::{Config, ListingsBackend, RecentBackend};
pub use database::DbClient;
pub use file_repo::FileRecentSearchStore;
pub use fixture_repo::FixtureOfferRetriever;
pub use memory_repo::InMemoryRecentSearchStore;
pub use offer_repo::PostgresOfferRetriever;
pub use redis_repo::{RedisClient, RedisRecentSearchStore};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid offer row {id}: {reason}")]
    InvalidRow { id: String, reason: String },
}
