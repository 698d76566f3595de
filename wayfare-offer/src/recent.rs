use std::sync::Arc;

use chrono::Utc;
use wayfare_core::{RecentSearchEntry, RecentSearchStore, SearchQuery};

/// Searches kept in the ledger.
pub const RECENT_SEARCH_CAPACITY: usize = 5;

/// Most-recently-used list of successful searches, newest first.
pub struct RecentSearchLedger {
    store: Arc<dyn RecentSearchStore>,
    entries: Vec<RecentSearchEntry>,
}

impl RecentSearchLedger {
    /// Empty ledger backed by `store`. Call [`Self::load`] to read persisted entries.
    pub fn new(store: Arc<dyn RecentSearchStore>) -> Self {
        Self {
            store,
            entries: Vec::new(),
        }
    }

    /// Read persisted entries at view entry.
    ///
    /// An unreadable store starts the ledger empty rather than failing the view.
    pub async fn load(store: Arc<dyn RecentSearchStore>) -> Self {
        let mut ledger = Self::new(store);
        match ledger.store.get().await {
            Ok(entries) => {
                // Oldest first, so the newest copy of a repeated search wins
                for entry in entries.into_iter().rev() {
                    ledger.insert(entry);
                }
            }
            Err(e) => {
                tracing::warn!("Recent searches unavailable, starting empty: {}", e);
            }
        }
        ledger
    }

    pub fn entries(&self) -> &[RecentSearchEntry] {
        &self.entries
    }

    /// Insert without persisting: drop any entry for the same
    /// origin/destination/date, prepend, keep the newest five.
    pub fn insert(&mut self, entry: RecentSearchEntry) {
        self.entries.retain(|existing| existing.key() != entry.key());
        self.entries.insert(0, entry);
        self.entries.truncate(RECENT_SEARCH_CAPACITY);
    }

    /// Remember a successful search and persist the list.
    pub async fn record(&mut self, query: SearchQuery) -> Result<(), LedgerError> {
        self.insert(RecentSearchEntry::new(query, Utc::now()));
        self.store
            .put(&self.entries)
            .await
            .map_err(|e| LedgerError::Store(e.to_string()))
    }

    /// Stored query for the entry at `index`, unchanged, ready to dispatch again.
    pub fn replay(&self, index: usize) -> Option<SearchQuery> {
        self.entries.get(index).map(|entry| entry.query.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Recent-search store failed: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration};
    use tokio::sync::Mutex;
    use wayfare_core::{normalize_query, BoxError, PaxCounts, SearchForm, TripType};

    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<Vec<RecentSearchEntry>>,
        puts: Mutex<usize>,
        broken: bool,
    }

    #[async_trait]
    impl RecentSearchStore for MemoryStore {
        async fn get(&self) -> Result<Vec<RecentSearchEntry>, BoxError> {
            if self.broken {
                return Err("disk on fire".into());
            }
            Ok(self.entries.lock().await.clone())
        }

        async fn put(&self, entries: &[RecentSearchEntry]) -> Result<(), BoxError> {
            if self.broken {
                return Err("disk on fire".into());
            }
            *self.puts.lock().await += 1;
            *self.entries.lock().await = entries.to_vec();
            Ok(())
        }
    }

    fn query(origin: &str, destination: &str, day: u32) -> SearchQuery {
        let departs = format!("2025-12-{:02}T10:00:00+00:00", day);
        normalize_query(&SearchForm {
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure: Some(DateTime::parse_from_rfc3339(&departs).unwrap()),
            return_date: None,
            trip_type: TripType::OneWay,
            cabin_class: "economy".to_string(),
            pax: PaxCounts::adults(1),
        })
        .unwrap()
    }

    fn origins(ledger: &RecentSearchLedger) -> Vec<String> {
        ledger.entries().iter().map(|e| e.query.origin().to_string()).collect()
    }

    #[test]
    fn test_sixth_entry_evicts_oldest() {
        let mut ledger = RecentSearchLedger::new(Arc::new(MemoryStore::default()));
        let start = Utc::now();
        for (i, origin) in ["AAA", "BBB", "CCC", "DDD", "EEE", "FFF"].iter().enumerate() {
            ledger.insert(RecentSearchEntry::new(
                query(origin, "ZZZ", 1),
                start + Duration::seconds(i as i64),
            ));
        }
        assert_eq!(ledger.entries().len(), RECENT_SEARCH_CAPACITY);
        assert_eq!(origins(&ledger), vec!["FFF", "EEE", "DDD", "CCC", "BBB"]);
    }

    #[test]
    fn test_duplicate_moves_to_front() {
        let mut ledger = RecentSearchLedger::new(Arc::new(MemoryStore::default()));
        let now = Utc::now();
        ledger.insert(RecentSearchEntry::new(query("AAA", "ZZZ", 1), now));
        ledger.insert(RecentSearchEntry::new(query("BBB", "ZZZ", 1), now));
        ledger.insert(RecentSearchEntry::new(query("CCC", "ZZZ", 1), now));

        ledger.insert(RecentSearchEntry::new(query("AAA", "ZZZ", 1), now));
        assert_eq!(origins(&ledger), vec!["AAA", "CCC", "BBB"]);

        // Different date is a different search
        ledger.insert(RecentSearchEntry::new(query("CCC", "ZZZ", 2), now));
        assert_eq!(ledger.entries().len(), 4);
    }

    #[tokio::test]
    async fn test_record_persists_and_reloads() {
        let store = Arc::new(MemoryStore::default());
        let mut ledger = RecentSearchLedger::load(store.clone()).await;
        assert!(ledger.entries().is_empty());

        ledger.record(query("lax", "jfk", 1)).await.unwrap();
        ledger.record(query("SFO", "ORD", 3)).await.unwrap();
        assert_eq!(*store.puts.lock().await, 2);

        let reloaded = RecentSearchLedger::load(store).await;
        assert_eq!(reloaded.entries(), ledger.entries());
        assert_eq!(reloaded.replay(1), Some(query("LAX", "JFK", 1)));
        assert_eq!(reloaded.replay(7), None);
    }

    #[tokio::test]
    async fn test_load_collapses_duplicates_and_caps() {
        let now = Utc::now();
        let stored: Vec<RecentSearchEntry> = [
            ("AAA", 1),
            ("BBB", 1),
            ("AAA", 1),
            ("CCC", 1),
            ("DDD", 1),
            ("EEE", 1),
            ("FFF", 1),
            ("BBB", 2),
        ]
        .iter()
        .enumerate()
        .map(|(i, (origin, day))| RecentSearchEntry::new(query(origin, "ZZZ", *day), now - Duration::seconds(i as i64)))
        .collect();
        let store = Arc::new(MemoryStore {
            entries: Mutex::new(stored),
            ..Default::default()
        });

        let ledger = RecentSearchLedger::load(store.clone()).await;
        assert_eq!(origins(&ledger), vec!["AAA", "BBB", "CCC", "DDD", "EEE"]);
        assert_eq!(ledger.entries()[0].timestamp, now);
        // Loading alone never writes back
        assert_eq!(*store.puts.lock().await, 0);
    }

    #[tokio::test]
    async fn test_broken_store() {
        let store = Arc::new(MemoryStore {
            broken: true,
            ..Default::default()
        });
        let mut ledger = RecentSearchLedger::load(store).await;
        assert!(ledger.entries().is_empty());

        let result = ledger.record(query("LAX", "JFK", 1)).await;
        assert!(matches!(result, Err(LedgerError::Store(_))));
        // The in-memory list still reflects the search
        assert_eq!(ledger.entries().len(), 1);
    }
}
