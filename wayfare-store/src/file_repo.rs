use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use wayfare_core::{BoxError, RecentSearchEntry, RecentSearchStore, StoredSearches};

use crate::StoreError;

/// Recent searches persisted as a JSON file.
///
/// Writes go to a sibling temp file which is then renamed over the target, so
/// a crash mid-write leaves the previous list intact.
#[derive(Debug, Clone)]
pub struct FileRecentSearchStore {
    path: PathBuf,
}

impl FileRecentSearchStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Vec<RecentSearchEntry>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let StoredSearches(entries) = serde_json::from_str(&raw)?;
                Ok(entries)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, entries: &[RecentSearchEntry]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let raw = serde_json::to_vec_pretty(entries)?;
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, raw).await?;
        tokio::fs::rename(&staging, &self.path).await?;

        debug!("Wrote {} recent searches to {}", entries.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl RecentSearchStore for FileRecentSearchStore {
    async fn get(&self) -> Result<Vec<RecentSearchEntry>, BoxError> {
        Ok(self.read().await?)
    }

    async fn put(&self, entries: &[RecentSearchEntry]) -> Result<(), BoxError> {
        Ok(self.write(entries).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use wayfare_core::{normalize_query, PaxCounts, SearchForm, TripType};

    fn entry(origin: &str, destination: &str) -> RecentSearchEntry {
        let query = normalize_query(&SearchForm {
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure: Some(DateTime::parse_from_rfc3339("2025-12-01T09:00:00-08:00").unwrap()),
            return_date: Some(DateTime::parse_from_rfc3339("2025-12-08T09:00:00-08:00").unwrap()),
            trip_type: TripType::RoundTrip,
            cabin_class: "business".to_string(),
            pax: PaxCounts { adults: 2, children: 1, infants: 0 },
        })
        .unwrap();
        RecentSearchEntry::new(query, Utc::now())
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecentSearchStore::new(dir.path().join("recent.json"));
        assert!(store.get().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entries_survive_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("recent.json");
        let entries = vec![entry("LAX", "JFK"), entry("SFO", "ORD")];

        FileRecentSearchStore::new(&path).put(&entries).await.unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = FileRecentSearchStore::new(&path);
        assert_eq!(reopened.get().await.unwrap(), entries);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recent.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileRecentSearchStore::new(&path);
        assert!(store.get().await.is_err());
        assert!(matches!(store.read().await, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_invalid_stored_search_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recent.json");
        let valid = entry("SFO", "ORD");
        let mut stored = serde_json::to_value(vec![entry("LAX", "JFK"), valid.clone()]).unwrap();
        // Edited by hand into a search the form would never produce
        stored[0]["query"]["destination"] = "LAX".into();
        std::fs::write(&path, stored.to_string()).unwrap();

        let entries = FileRecentSearchStore::new(&path).get().await.unwrap();
        assert_eq!(entries, vec![valid]);
    }
}
