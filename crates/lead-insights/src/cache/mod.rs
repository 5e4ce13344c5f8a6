//! Stale-but-available cache of the last fetched lead collection.
//!
//! The cache holds exactly one slot. It is a fallback for display when a
//! refresh fails, so it never reports failure: storage errors and corrupt
//! payloads are logged and treated as an empty slot.

mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};

use crate::types::Lead;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Fixed key of the cache slot.
pub const CACHE_KEY: &str = "leads_cache";

/// The cached payload: the leads plus when they were stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedLeads {
    pub leads: Vec<Lead>,
    pub timestamp: DateTime<Utc>,
}

/// Single-slot lead cache over an injected [`KeyValueStore`].
#[derive(Clone)]
pub struct LeadCache {
    store: Arc<dyn KeyValueStore>,
}

impl LeadCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// A cache backed by a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Overwrite the slot with `leads`, stamped with the current time.
    pub fn put(&self, leads: &[Lead]) {
        let payload = CachedLeads {
            leads: leads.to_vec(),
            timestamp: Utc::now(),
        };

        let bytes = match serde_json::to_vec(&payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to cache leads: {}", e);
                return;
            }
        };

        match self.store.write(CACHE_KEY, &bytes) {
            Ok(()) => debug!("Cached {} leads", leads.len()),
            Err(e) => warn!("Failed to cache leads: {}", e),
        }
    }

    /// The cached payload, or `None` if the slot is empty or unreadable.
    pub fn get(&self) -> Option<CachedLeads> {
        let bytes = match self.store.read(CACHE_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to retrieve cached leads: {}", e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(cached) => Some(cached),
            Err(e) => {
                warn!("Failed to retrieve cached leads: {}", e);
                None
            }
        }
    }

    /// Empty the slot.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(CACHE_KEY) {
            warn!("Failed to clear leads cache: {}", e);
        }
    }
}

impl std::fmt::Debug for LeadCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeadCache").finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(LeadCache: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DashboardError, Result};
    use crate::types::LeadStatus;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    /// Store whose every operation fails.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn read(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Err(DashboardError::Storage("unavailable".to_string()))
        }

        fn write(&self, _key: &str, _value: &[u8]) -> Result<()> {
            Err(DashboardError::Storage("unavailable".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(DashboardError::Storage("unavailable".to_string()))
        }
    }

    fn sample_leads() -> Vec<Lead> {
        (1..=3)
            .map(|i| Lead {
                id: format!("lead-{i}"),
                client_name: format!("Client {i}"),
                status: if i % 2 == 0 {
                    LeadStatus::Approved
                } else {
                    LeadStatus::Discard
                },
                in_radius: i % 2 == 0,
                tag: "Web".to_string(),
                created_at: Utc.with_ymd_and_hms(2024, 1, i, 8, 0, 0).unwrap(),
            })
            .collect()
    }

    #[test]
    fn test_empty_cache_is_absent() {
        assert_eq!(LeadCache::in_memory().get(), None);
    }

    #[test]
    fn test_put_then_get() {
        let cache = LeadCache::in_memory();
        let before = Utc::now();
        cache.put(&sample_leads());

        let cached = cache.get().expect("cache should hold the leads");
        assert_eq!(cached.leads, sample_leads());
        assert!(cached.timestamp >= before);
    }

    #[test]
    fn test_put_overwrites() {
        let cache = LeadCache::in_memory();
        cache.put(&sample_leads());
        cache.put(&sample_leads()[..1]);
        assert_eq!(cache.get().unwrap().leads.len(), 1);
    }

    #[test]
    fn test_clear_then_get_is_absent() {
        let cache = LeadCache::in_memory();
        cache.put(&sample_leads());
        cache.clear();
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_corrupt_payload_is_absent() {
        let store = Arc::new(MemoryStore::new());
        store.write(CACHE_KEY, b"{not json").unwrap();
        let cache = LeadCache::new(store);
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_broken_store_never_raises() {
        let cache = LeadCache::new(Arc::new(BrokenStore));
        cache.put(&sample_leads());
        assert_eq!(cache.get(), None);
        cache.clear();
    }

    #[test]
    fn test_timestamp_is_iso_string() {
        let store = Arc::new(MemoryStore::new());
        let cache = LeadCache::new(store.clone());
        cache.put(&sample_leads());

        let raw = store.read(CACHE_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        let timestamp = json["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert_eq!(json["leads"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_file_backed_cache_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        LeadCache::new(Arc::new(FileStore::new(dir.path()))).put(&sample_leads());

        let reopened = LeadCache::new(Arc::new(FileStore::new(dir.path())));
        assert_eq!(reopened.get().unwrap().leads, sample_leads());
    }
}
