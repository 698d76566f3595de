use async_trait::async_trait;
use tokio::sync::Mutex;
use wayfare_core::{BoxError, RecentSearchEntry, RecentSearchStore};

/// Process-local store; nothing survives a restart.
#[derive(Default)]
pub struct InMemoryRecentSearchStore {
    entries: Mutex<Vec<RecentSearchEntry>>,
}

impl InMemoryRecentSearchStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecentSearchStore for InMemoryRecentSearchStore {
    async fn get(&self) -> Result<Vec<RecentSearchEntry>, BoxError> {
        Ok(self.entries.lock().await.clone())
    }

    async fn put(&self, entries: &[RecentSearchEntry]) -> Result<(), BoxError> {
        *self.entries.lock().await = entries.to_vec();
        Ok(())
    }
}
