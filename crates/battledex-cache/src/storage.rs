//! Storage backend trait and the in-memory implementation
//!
//! The orchestrators only need whole-entry key-value operations plus a
//! small metadata table; they never need transactions across namespaces.
//! The trait keeps tests on [`MemoryStore`] while production runs on
//! [`crate::NativeStore`].

use crate::entry::CacheEntry;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

/// Whole-entry key-value storage for cache entries and refresh metadata
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read entries by id within a namespace; absent ids yield `None` at
    /// the matching position
    async fn get(&self, namespace: &str, ids: &[String]) -> Result<Vec<Option<CacheEntry>>>;

    /// Write entries whole (insert or replace)
    async fn put(&self, namespace: &str, entries: Vec<CacheEntry>) -> Result<()>;

    /// Read a metadata timestamp (e.g. last bundle refresh)
    async fn get_meta(&self, key: &str) -> Result<Option<DateTime<Utc>>>;

    /// Write a metadata timestamp
    async fn put_meta(&self, key: &str, value: DateTime<Utc>) -> Result<()>;
}

/// In-memory storage backend
///
/// Used by tests and as a cache-of-last-resort when no persistent store is
/// available.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<(String, String), CacheEntry>>,
    meta: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStore {
    async fn get(&self, namespace: &str, ids: &[String]) -> Result<Vec<Option<CacheEntry>>> {
        let entries = self.entries.read().expect("storage lock poisoned");
        Ok(ids
            .iter()
            .map(|id| entries.get(&(namespace.to_string(), id.clone())).cloned())
            .collect())
    }

    async fn put(&self, namespace: &str, new_entries: Vec<CacheEntry>) -> Result<()> {
        let mut entries = self.entries.write().expect("storage lock poisoned");
        for entry in new_entries {
            entries.insert((namespace.to_string(), entry.id.clone()), entry);
        }
        Ok(())
    }

    async fn get_meta(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.meta.read().expect("storage lock poisoned").get(key).copied())
    }

    async fn put_meta(&self, key: &str, value: DateTime<Utc>) -> Result<()> {
        self.meta
            .write()
            .expect("storage lock poisoned")
            .insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::NS_PRESETS;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let entry = CacheEntry::now(NS_PRESETS, "gen9ou", "[]");
        store.put(NS_PRESETS, vec![entry.clone()]).await.unwrap();

        let got = store
            .get(NS_PRESETS, &["gen9ou".to_string(), "gen9uu".to_string()])
            .await
            .unwrap();
        assert_eq!(got[0], Some(entry));
        assert_eq!(got[1], None);
    }

    #[tokio::test]
    async fn test_memory_store_put_replaces_whole_entry() {
        let store = MemoryStore::new();
        store
            .put(NS_PRESETS, vec![CacheEntry::now(NS_PRESETS, "gen9ou", "old")])
            .await
            .unwrap();
        store
            .put(NS_PRESETS, vec![CacheEntry::now(NS_PRESETS, "gen9ou", "new")])
            .await
            .unwrap();
        let got = store.get(NS_PRESETS, &["gen9ou".to_string()]).await.unwrap();
        assert_eq!(got[0].as_ref().unwrap().payload, "new");
    }

    #[tokio::test]
    async fn test_memory_store_meta() {
        let store = MemoryStore::new();
        assert_eq!(store.get_meta("bundles").await.unwrap(), None);
        let now = Utc::now();
        store.put_meta("bundles", now).await.unwrap();
        assert_eq!(store.get_meta("bundles").await.unwrap(), Some(now));
    }
}
