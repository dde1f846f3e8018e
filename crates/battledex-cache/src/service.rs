//! The read-through cache service
//!
//! One `CacheService` is constructed per app instance and passed by
//! reference to consumers; the storage backend and remote source are
//! injected so tests can substitute both.
//!
//! A query walks the tiered flow in a fixed order: cache read (fresh hit
//! short-circuits, stale read becomes the fallback candidate), coalesced
//! remote fetch, transform, write-back. A fetch failure is masked by the
//! fallback candidate when one exists; only a cold cache propagates it.

use crate::endpoint::{resolve_endpoint, ResolvedEndpoint};
use crate::entry::{CacheEntry, NS_PRESETS};
use crate::error::Result;
use crate::remote::RemoteSource;
use crate::storage::StorageBackend;
use battledex_core::{Generation, PresetRecord};
use battledex_transform::{
    format_sets, format_usage, gen_sets, randoms_sets, randoms_usage, TransformArgs,
};
use chrono::{Duration, Utc};
use serde_json::Value as Json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Which remote dataset a query targets
///
/// The dataset picks the path prefix, the matching transformer, and
/// whether resolution is always format-scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    /// Per-format vendor sets
    FormatSets,
    /// Per-generation vendor sets
    GenSets,
    /// Per-format aggregated usage statistics
    FormatUsage,
    /// Per-generation random-variant sets
    RandomsSets,
    /// Per-generation random-variant usage statistics
    RandomsUsage,
}

impl Dataset {
    /// Remote path prefix and cache-key prefix for this dataset
    fn path_prefix(&self) -> &'static str {
        match self {
            Dataset::FormatSets => "sets",
            Dataset::GenSets => "gens",
            Dataset::FormatUsage => "stats",
            Dataset::RandomsSets => "randoms",
            Dataset::RandomsUsage => "randoms-stats",
        }
    }

    /// Usage statistics are published per format only
    fn always_format_scoped(&self) -> bool {
        matches!(self, Dataset::FormatSets | Dataset::FormatUsage)
    }

    /// Run the matching transformer
    fn transform(&self, payload: &Json, args: &TransformArgs) -> Result<Vec<PresetRecord>> {
        let records = match self {
            Dataset::FormatSets => format_sets(payload, args)?,
            Dataset::GenSets => gen_sets(payload, args)?,
            Dataset::FormatUsage => format_usage(payload, args)?,
            Dataset::RandomsSets => randoms_sets(payload, args)?,
            Dataset::RandomsUsage => randoms_usage(payload, args)?,
        };
        Ok(records)
    }
}

/// Consumer-facing query arguments
#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    /// Generation to query (validated on use)
    pub gen: u8,
    /// Full or generation-stripped format string
    pub format: Option<String>,
    /// Force format-scoped resolution
    pub format_only: bool,
    /// Enable caching with this staleness window; `None` disables the
    /// cache tier entirely
    pub max_age: Option<Duration>,
}

impl QueryArgs {
    /// Args for a generation with no format
    pub fn for_gen(gen: u8) -> Self {
        Self {
            gen,
            ..Self::default()
        }
    }

    /// Set the format
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Enable the cache tier with a staleness window
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }
}

/// The read-through/write-back preset cache
pub struct CacheService {
    storage: Arc<dyn StorageBackend>,
    remote: Arc<dyn RemoteSource>,
    // One guard per resolved endpoint; a second concurrent caller awaits
    // the first's refresh instead of fetching again.
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CacheService {
    /// Create a service over the given storage and remote source
    pub fn new(storage: Arc<dyn StorageBackend>, remote: Arc<dyn RemoteSource>) -> Self {
        Self {
            storage,
            remote,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Query one dataset, resolving the endpoint from the args.
    ///
    /// Cache reads always precede the fetch; the write-back always follows
    /// a successful transform. A write-back failure is logged, never
    /// propagated: the records in hand are still good.
    pub async fn query(&self, dataset: Dataset, args: &QueryArgs) -> Result<Vec<PresetRecord>> {
        let gen = Generation::new(args.gen)?;
        let format_only = args.format_only || dataset.always_format_scoped();
        let resolved = resolve_endpoint(gen, args.format.as_deref(), format_only)?;
        let cache_key = format!("{}/{}", dataset.path_prefix(), resolved.key);

        // Tier 1: cache read.
        let mut fallback: Option<Vec<PresetRecord>> = None;
        if let Some(max_age) = args.max_age {
            if let Some((records, stale)) = self.read_cache(&cache_key, max_age).await? {
                if !stale {
                    debug!(%cache_key, "cache hit");
                    return Ok(records);
                }
                debug!(%cache_key, "cache stale, refreshing");
                fallback = Some(records);
            }
        }

        // Tier 2: coalesced fetch. Waiting on the guard means another
        // caller is refreshing the same endpoint right now.
        let guard = self.endpoint_guard(&cache_key).await;
        let result = self
            .refresh_endpoint(dataset, gen, args.max_age, &resolved, &cache_key, fallback, &guard)
            .await;
        self.drop_idle_guard(&cache_key, &guard).await;
        result
    }

    /// Fetch, transform, and write back one endpoint, holding its guard.
    #[allow(clippy::too_many_arguments)]
    async fn refresh_endpoint(
        &self,
        dataset: Dataset,
        gen: Generation,
        max_age: Option<Duration>,
        resolved: &ResolvedEndpoint,
        cache_key: &str,
        fallback: Option<Vec<PresetRecord>>,
        guard: &Mutex<()>,
    ) -> Result<Vec<PresetRecord>> {
        let _held = guard.lock().await;

        // The coalesced caller finds the fresh entry the first one wrote.
        if let Some(max_age) = max_age {
            if let Some((records, false)) = self.read_cache(cache_key, max_age).await? {
                debug!(%cache_key, "coalesced onto a concurrent refresh");
                return Ok(records);
            }
        }

        let path = format!("{}/{}.json", dataset.path_prefix(), resolved.key);
        match self.remote.fetch(&path).await {
            Ok(payload) => {
                let targs = TransformArgs {
                    gen,
                    format: resolved.format.clone(),
                };
                let records = dataset.transform(&payload, &targs)?;
                if max_age.is_some() {
                    self.write_back(cache_key, &records).await;
                }
                Ok(records)
            }
            Err(err) => match fallback {
                Some(records) => {
                    warn!(%cache_key, %err, "fetch failed, using last known data");
                    Ok(records)
                }
                None => Err(err),
            },
        }
    }

    /// Read and decode a cache entry; returns `(records, stale)`.
    ///
    /// An entry whose payload fails to decode counts as missing.
    async fn read_cache(
        &self,
        cache_key: &str,
        max_age: Duration,
    ) -> Result<Option<(Vec<PresetRecord>, bool)>> {
        let mut got = self
            .storage
            .get(NS_PRESETS, &[cache_key.to_string()])
            .await?;
        let Some(entry) = got.pop().flatten() else {
            return Ok(None);
        };
        let stale = entry.is_stale(max_age, Utc::now());
        Ok(entry.decode_presets().map(|records| (records, stale)))
    }

    async fn write_back(&self, cache_key: &str, records: &[PresetRecord]) {
        let entry = match CacheEntry::from_presets(cache_key, records) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%cache_key, %err, "failed to serialize cache payload");
                return;
            }
        };
        if let Err(err) = self.storage.put(NS_PRESETS, vec![entry]).await {
            warn!(%cache_key, %err, "cache write-back failed");
        }
    }

    async fn endpoint_guard(&self, cache_key: &str) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        inflight
            .entry(cache_key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Evict the guard once no other caller holds it.
    ///
    /// Keeps the map bounded by concurrent refreshes instead of growing
    /// with every distinct endpoint ever queried.
    async fn drop_idle_guard(&self, cache_key: &str, guard: &Arc<Mutex<()>>) {
        let mut inflight = self.inflight.lock().await;
        // Two strong refs left means the map's copy and ours.
        if Arc::strong_count(guard) == 2 {
            inflight.remove(cache_key);
        }
    }
}
