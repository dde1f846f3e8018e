//! The persisted cache entry wrapper

use battledex_core::PresetRecord;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Namespace for transformed preset datasets, keyed by resolved endpoint.
pub const NS_PRESETS: &str = "presets";
/// Namespace for catalog bundles (locale packs, curated-title lists).
pub const NS_BUNDLES: &str = "bundles";

/// One persisted payload with its staleness timestamp
///
/// Entries are always written whole; there are no partial-field updates,
/// so readers never need field-level locking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Namespace the entry lives in
    pub namespace: String,
    /// Key within the namespace (resolved endpoint or bundle id)
    pub id: String,
    /// JSON-serialized payload
    pub payload: String,
    /// Write timestamp driving staleness comparisons
    pub updated_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry stamped with the current time
    pub fn now(
        namespace: impl Into<String>,
        id: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            id: id.into(),
            payload: payload.into(),
            updated_at: Utc::now(),
        }
    }

    /// Staleness check against a caller-supplied max age.
    ///
    /// The boundary is inclusive: an entry aged exactly `max_age` is stale
    /// and a refresh is attempted.
    pub fn is_stale(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        self.updated_at + max_age <= now
    }

    /// Serialize records into an entry payload
    pub fn from_presets(
        id: impl Into<String>,
        records: &[PresetRecord],
    ) -> serde_json::Result<Self> {
        Ok(Self::now(NS_PRESETS, id, serde_json::to_string(records)?))
    }

    /// Decode the payload as preset records.
    ///
    /// Returns `None` when the payload fails to load, which callers treat
    /// the same as a missing entry.
    pub fn decode_presets(&self) -> Option<Vec<PresetRecord>> {
        serde_json::from_str(&self.payload).ok()
    }
}
