//! Persistent storage backend using native_db

use crate::entry::CacheEntry;
use crate::error::{Error, Result};
use crate::storage::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

/// Stored cache entry row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
struct StoredEntry {
    /// Primary key - `namespace/id`.
    #[primary_key]
    key: String,
    /// Namespace, for namespace-wide scans.
    #[secondary_key]
    namespace: String,
    /// Entry id within the namespace.
    id: String,
    /// JSON payload.
    payload: String,
    /// Write timestamp, unix milliseconds.
    updated_at_ms: i64,
}

/// Stored metadata row (small timestamp table).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 2, version = 1)]
#[native_db]
struct StoredMeta {
    /// Metadata key.
    #[primary_key]
    key: String,
    /// Timestamp value, unix milliseconds.
    value_ms: i64,
}

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models.define::<StoredEntry>().unwrap();
    models.define::<StoredMeta>().unwrap();
    models
});

fn row_key(namespace: &str, id: &str) -> String {
    format!("{}/{}", namespace, id)
}

impl StoredEntry {
    fn from_entry(entry: &CacheEntry) -> Self {
        Self {
            key: row_key(&entry.namespace, &entry.id),
            namespace: entry.namespace.clone(),
            id: entry.id.clone(),
            payload: entry.payload.clone(),
            updated_at_ms: entry.updated_at.timestamp_millis(),
        }
    }

    fn to_entry(&self) -> CacheEntry {
        CacheEntry {
            namespace: self.namespace.clone(),
            id: self.id.clone(),
            payload: self.payload.clone(),
            updated_at: DateTime::<Utc>::from_timestamp_millis(self.updated_at_ms)
                .unwrap_or_default(),
        }
    }
}

/// Persistent storage backend for cache entries and refresh metadata.
pub struct NativeStore {
    db: Database<'static>,
}

impl NativeStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new()
            .create(&MODELS, path.as_ref())
            .map_err(|e| Error::Storage(e.to_string()))?;
        Ok(Self { db })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::Storage(e.to_string()))?;
        Ok(Self { db })
    }
}

#[async_trait]
impl StorageBackend for NativeStore {
    async fn get(&self, namespace: &str, ids: &[String]) -> Result<Vec<Option<CacheEntry>>> {
        let r = self.db.r_transaction()?;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let stored: Option<StoredEntry> = r.get().primary(row_key(namespace, id))?;
            out.push(stored.map(|s| s.to_entry()));
        }
        Ok(out)
    }

    async fn put(&self, _namespace: &str, entries: Vec<CacheEntry>) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        for entry in &entries {
            rw.upsert(StoredEntry::from_entry(entry))?;
        }
        rw.commit()?;
        Ok(())
    }

    async fn get_meta(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredMeta> = r.get().primary(key.to_string())?;
        Ok(stored.and_then(|s| DateTime::<Utc>::from_timestamp_millis(s.value_ms)))
    }

    async fn put_meta(&self, key: &str, value: DateTime<Utc>) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        rw.upsert(StoredMeta {
            key: key.to_string(),
            value_ms: value.timestamp_millis(),
        })?;
        rw.commit()?;
        Ok(())
    }
}

impl From<native_db::db_type::Error> for Error {
    fn from(err: native_db::db_type::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::NS_PRESETS;

    #[tokio::test]
    async fn test_native_store_round_trip() {
        let store = NativeStore::in_memory().unwrap();
        let entry = CacheEntry::now(NS_PRESETS, "gen9ou", r#"[{"x":1}]"#);
        store.put(NS_PRESETS, vec![entry.clone()]).await.unwrap();

        let got = store.get(NS_PRESETS, &["gen9ou".to_string()]).await.unwrap();
        let stored = got[0].as_ref().unwrap();
        assert_eq!(stored.payload, entry.payload);
        // Timestamps survive at millisecond precision.
        assert_eq!(
            stored.updated_at.timestamp_millis(),
            entry.updated_at.timestamp_millis()
        );
    }

    #[tokio::test]
    async fn test_native_store_namespaces_isolated() {
        let store = NativeStore::in_memory().unwrap();
        store
            .put("a", vec![CacheEntry::now("a", "k", "1")])
            .await
            .unwrap();
        let got = store.get("b", &["k".to_string()]).await.unwrap();
        assert_eq!(got[0], None);
    }

    #[tokio::test]
    async fn test_native_store_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        {
            let store = NativeStore::open(&path).unwrap();
            store
                .put(NS_PRESETS, vec![CacheEntry::now(NS_PRESETS, "gen9", "[]")])
                .await
                .unwrap();
        }
        let store = NativeStore::open(&path).unwrap();
        let got = store.get(NS_PRESETS, &["gen9".to_string()]).await.unwrap();
        assert!(got[0].is_some());
    }

    #[tokio::test]
    async fn test_native_store_meta() {
        let store = NativeStore::in_memory().unwrap();
        let now = Utc::now();
        store.put_meta("bundles", now).await.unwrap();
        let got = store.get_meta("bundles").await.unwrap().unwrap();
        assert_eq!(got.timestamp_millis(), now.timestamp_millis());
    }
}
