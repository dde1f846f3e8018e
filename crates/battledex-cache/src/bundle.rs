//! The bundle-catalog service
//!
//! Catalog bundles are slow-moving auxiliary data packs (format display
//! names, species alias tables). The remote publishes a catalog listing
//! every bundle with its last-modified time; the service refreshes the
//! catalog on its own staleness clock and each bundle only when the
//! catalog advertises something newer than what is cached.
//!
//! Catalog endpoints wrap their payload in an `{ok, payload}` envelope,
//! unlike the raw-JSON preset endpoints. A bundle that cannot be fetched
//! falls back to a snapshot shipped with the crate, so first launch works
//! offline.

use crate::entry::{CacheEntry, NS_BUNDLES};
use crate::error::{Error, Result};
use crate::remote::RemoteSource;
use crate::storage::StorageBackend;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Meta key recording the last catalog refresh.
const CATALOG_META_KEY: &str = "bundles/last-refresh";
/// Storage id the catalog itself is cached under.
const CATALOG_ID: &str = "catalog";

/// One bundle as advertised by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleInfo {
    /// Stable bundle identifier, doubles as the storage id
    pub id: String,
    /// Namespace the bundle's payload belongs to
    pub namespace: String,
    /// Human-readable bundle name
    pub name: String,
    /// Last modification advertised by the publisher
    pub updated_at: DateTime<Utc>,
}

/// The published bundle catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleCatalog {
    /// Publication time of the catalog itself
    pub updated_at: DateTime<Utc>,
    /// Advertised bundles
    pub bundles: Vec<BundleInfo>,
}

/// Envelope wrapper used by catalog endpoints.
#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    payload: Json,
}

fn unwrap_envelope(raw: Json) -> Result<Json> {
    let envelope: Envelope = serde_json::from_value(raw)?;
    if !envelope.ok {
        return Err(Error::Bundle("endpoint returned ok=false".into()));
    }
    Ok(envelope.payload)
}

/// Snapshot assets compiled into the crate, used when a bundle has never
/// been cached and cannot be fetched.
fn snapshot(id: &str) -> Option<&'static str> {
    match id {
        CATALOG_ID => Some(include_str!("../assets/catalog.json")),
        "format-names" => Some(include_str!("../assets/format-names.json")),
        "species-aliases" => Some(include_str!("../assets/species-aliases.json")),
        _ => None,
    }
}

/// Catalog and bundle refresh over a storage backend and remote source
pub struct BundleService {
    storage: Arc<dyn StorageBackend>,
    remote: Arc<dyn RemoteSource>,
}

impl BundleService {
    /// Create a service over the given storage and remote source
    pub fn new(storage: Arc<dyn StorageBackend>, remote: Arc<dyn RemoteSource>) -> Self {
        Self { storage, remote }
    }

    /// Refresh the catalog and any bundle it advertises as changed.
    ///
    /// The catalog is refetched only when the last refresh is older than
    /// `max_age` (inclusive boundary, like the preset cache). Within a
    /// fresh window the cached catalog is served as-is.
    pub async fn sync(&self, max_age: Duration) -> Result<BundleCatalog> {
        let now = Utc::now();
        let last = self.storage.get_meta(CATALOG_META_KEY).await?;
        let fresh = last.map(|at| at + max_age > now).unwrap_or(false);

        if fresh {
            if let Some(catalog) = self.cached_catalog().await? {
                debug!("bundle catalog fresh, skipping refresh");
                return Ok(catalog);
            }
        }

        let catalog = match self.fetch_catalog().await {
            Ok(catalog) => catalog,
            Err(err) => {
                // Prefer a previously cached catalog, then the snapshot.
                warn!(%err, "catalog fetch failed, falling back");
                match self.cached_catalog().await? {
                    Some(catalog) => return Ok(catalog),
                    None => self.snapshot_catalog()?,
                }
            }
        };

        for info in &catalog.bundles {
            if self.needs_refresh(info).await? {
                self.refresh_bundle(info).await;
            }
        }

        self.store_catalog(&catalog).await?;
        self.storage.put_meta(CATALOG_META_KEY, now).await?;
        Ok(catalog)
    }

    /// Load one bundle's payload from the cache, falling back to the
    /// compiled-in snapshot.
    pub async fn load(&self, id: &str) -> Result<Json> {
        let mut got = self.storage.get(NS_BUNDLES, &[id.to_string()]).await?;
        if let Some(entry) = got.pop().flatten() {
            match serde_json::from_str(&entry.payload) {
                Ok(payload) => return Ok(payload),
                Err(err) => warn!(%id, %err, "cached bundle corrupt, using snapshot"),
            }
        }
        let raw = snapshot(id)
            .ok_or_else(|| Error::Bundle(format!("unknown bundle: {id}")))?;
        Ok(serde_json::from_str(raw)?)
    }

    async fn fetch_catalog(&self) -> Result<BundleCatalog> {
        let raw = self.remote.fetch("bundles/catalog.json").await?;
        let payload = unwrap_envelope(raw)?;
        Ok(serde_json::from_value(payload)?)
    }

    async fn cached_catalog(&self) -> Result<Option<BundleCatalog>> {
        let mut got = self
            .storage
            .get(NS_BUNDLES, &[CATALOG_ID.to_string()])
            .await?;
        let Some(entry) = got.pop().flatten() else {
            return Ok(None);
        };
        Ok(serde_json::from_str(&entry.payload).ok())
    }

    fn snapshot_catalog(&self) -> Result<BundleCatalog> {
        let raw = snapshot(CATALOG_ID).unwrap_or("{}");
        Ok(serde_json::from_str(raw)?)
    }

    async fn store_catalog(&self, catalog: &BundleCatalog) -> Result<()> {
        let mut entry = CacheEntry::now(NS_BUNDLES, CATALOG_ID, serde_json::to_string(catalog)?);
        entry.updated_at = catalog.updated_at;
        self.storage.put(NS_BUNDLES, vec![entry]).await
    }

    /// A bundle is refreshed when it is missing, when the catalog
    /// advertises a newer `updated_at`, or when the cached payload fails
    /// to load.
    async fn needs_refresh(&self, info: &BundleInfo) -> Result<bool> {
        let mut got = self.storage.get(NS_BUNDLES, &[info.id.clone()]).await?;
        let Some(entry) = got.pop().flatten() else {
            return Ok(true);
        };
        if info.updated_at > entry.updated_at {
            return Ok(true);
        }
        Ok(serde_json::from_str::<Json>(&entry.payload).is_err())
    }

    /// Fetch and store one bundle. Failure is logged and tolerated: the
    /// cached copy or the snapshot keeps serving.
    async fn refresh_bundle(&self, info: &BundleInfo) {
        let path = format!("bundles/{}.json", info.id);
        let payload = match self.remote.fetch(&path).await.and_then(unwrap_envelope) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(id = %info.id, %err, "bundle fetch failed, keeping previous");
                return;
            }
        };
        let serialized = match serde_json::to_string(&payload) {
            Ok(s) => s,
            Err(err) => {
                warn!(id = %info.id, %err, "bundle payload not serializable");
                return;
            }
        };
        let mut entry = CacheEntry::now(NS_BUNDLES, &info.id, serialized);
        entry.updated_at = info.updated_at;
        if let Err(err) = self.storage.put(NS_BUNDLES, vec![entry]).await {
            warn!(id = %info.id, %err, "bundle write-back failed");
        } else {
            debug!(id = %info.id, "bundle refreshed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::RwLock;

    /// Scripted source serving an envelope per path.
    #[derive(Default)]
    struct CatalogSource {
        responses: RwLock<HashMap<String, Json>>,
        fetches: AtomicUsize,
    }

    impl CatalogSource {
        fn with_catalog(updated_at: &str, bundles: Json) -> Self {
            let source = Self::default();
            source.set(
                "bundles/catalog.json",
                json!({"ok": true, "payload": {"updated_at": updated_at, "bundles": bundles}}),
            );
            source
        }

        fn set(&self, path: &str, value: Json) {
            self.responses
                .write()
                .unwrap()
                .insert(path.to_string(), value);
        }
    }

    #[async_trait]
    impl RemoteSource for CatalogSource {
        async fn fetch(&self, path: &str) -> Result<Json> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.responses
                .read()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| Error::Transport(format!("no route: {path}")))
        }
    }

    fn info(id: &str, updated_at: &str) -> Json {
        json!({
            "id": id,
            "namespace": "bundles",
            "name": id,
            "updated_at": updated_at,
        })
    }

    #[tokio::test]
    async fn test_sync_fetches_advertised_bundles() {
        let remote = Arc::new(CatalogSource::with_catalog(
            "2026-01-01T00:00:00Z",
            json!([info("format-names", "2026-01-01T00:00:00Z")]),
        ));
        remote.set(
            "bundles/format-names.json",
            json!({"ok": true, "payload": {"ou": "OverUsed"}}),
        );
        let storage = Arc::new(MemoryStore::new());
        let service = BundleService::new(storage, remote);

        let catalog = service.sync(Duration::hours(24)).await.unwrap();
        assert_eq!(catalog.bundles.len(), 1);
        let payload = service.load("format-names").await.unwrap();
        assert_eq!(payload["ou"], "OverUsed");
    }

    #[tokio::test]
    async fn test_sync_fresh_catalog_skips_network() {
        let remote = Arc::new(CatalogSource::with_catalog("2026-01-01T00:00:00Z", json!([])));
        let storage = Arc::new(MemoryStore::new());
        let service = BundleService::new(storage, remote.clone());

        service.sync(Duration::hours(24)).await.unwrap();
        let fetched = remote.fetches.load(Ordering::SeqCst);
        service.sync(Duration::hours(24)).await.unwrap();
        assert_eq!(remote.fetches.load(Ordering::SeqCst), fetched);
    }

    #[tokio::test]
    async fn test_sync_skips_unchanged_bundles() {
        let remote = Arc::new(CatalogSource::with_catalog(
            "2026-01-01T00:00:00Z",
            json!([info("format-names", "2026-01-01T00:00:00Z")]),
        ));
        remote.set(
            "bundles/format-names.json",
            json!({"ok": true, "payload": {"ou": "OverUsed"}}),
        );
        let storage = Arc::new(MemoryStore::new());
        let service = BundleService::new(storage, remote.clone());

        service.sync(Duration::hours(24)).await.unwrap();
        let fetched = remote.fetches.load(Ordering::SeqCst);

        // Same advertised timestamp: the catalog is refetched after the
        // window but the bundle is not.
        service.sync(Duration::zero()).await.unwrap();
        assert_eq!(remote.fetches.load(Ordering::SeqCst), fetched + 1);
    }

    #[tokio::test]
    async fn test_sync_refetches_newer_bundle() {
        let remote = Arc::new(CatalogSource::with_catalog(
            "2026-01-01T00:00:00Z",
            json!([info("format-names", "2026-01-01T00:00:00Z")]),
        ));
        remote.set(
            "bundles/format-names.json",
            json!({"ok": true, "payload": {"ou": "OverUsed"}}),
        );
        let storage = Arc::new(MemoryStore::new());
        let service = BundleService::new(storage, remote.clone());
        service.sync(Duration::hours(24)).await.unwrap();

        remote.set(
            "bundles/catalog.json",
            json!({"ok": true, "payload": {
                "updated_at": "2026-02-01T00:00:00Z",
                "bundles": [info("format-names", "2026-02-01T00:00:00Z")],
            }}),
        );
        remote.set(
            "bundles/format-names.json",
            json!({"ok": true, "payload": {"ou": "Overused Tier"}}),
        );

        service.sync(Duration::zero()).await.unwrap();
        let payload = service.load("format-names").await.unwrap();
        assert_eq!(payload["ou"], "Overused Tier");
    }

    #[tokio::test]
    async fn test_bundle_fetch_failure_keeps_snapshot() {
        // Catalog advertises a bundle the remote cannot serve.
        let remote = Arc::new(CatalogSource::with_catalog(
            "2026-01-01T00:00:00Z",
            json!([info("format-names", "2026-01-01T00:00:00Z")]),
        ));
        let storage = Arc::new(MemoryStore::new());
        let service = BundleService::new(storage, remote);

        service.sync(Duration::hours(24)).await.unwrap();
        let payload = service.load("format-names").await.unwrap();
        // Compiled-in snapshot still serves.
        assert_eq!(payload["ou"], "OverUsed");
    }

    #[tokio::test]
    async fn test_catalog_fetch_failure_falls_back_to_snapshot() {
        let remote = Arc::new(CatalogSource::default());
        let storage = Arc::new(MemoryStore::new());
        let service = BundleService::new(storage, remote);

        let catalog = service.sync(Duration::hours(24)).await.unwrap();
        assert!(catalog
            .bundles
            .iter()
            .any(|b| b.id == "species-aliases"));
    }

    #[tokio::test]
    async fn test_not_ok_envelope_is_rejected() {
        let remote = Arc::new(CatalogSource::default());
        remote.set("bundles/catalog.json", json!({"ok": false}));
        let storage = Arc::new(MemoryStore::new());
        let service = BundleService::new(storage, remote);

        // Falls back to the snapshot catalog rather than erroring.
        let catalog = service.sync(Duration::hours(24)).await.unwrap();
        assert!(!catalog.bundles.is_empty());
    }

    #[tokio::test]
    async fn test_load_unknown_bundle_errors() {
        let storage = Arc::new(MemoryStore::new());
        let service = BundleService::new(storage, Arc::new(CatalogSource::default()));
        assert!(matches!(
            service.load("no-such-bundle").await,
            Err(Error::Bundle(_))
        ));
    }
}
