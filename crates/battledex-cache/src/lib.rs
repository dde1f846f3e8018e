//! Battledex Cache - Read-through/write-back preset caching
//!
//! The cache orchestrator sits between consumers and the remote preset
//! sources:
//! 1. a format string resolves to an endpoint key through a heuristic
//!    pipeline ([`resolve_endpoint`])
//! 2. the persistent store is read first; a fresh entry short-circuits the
//!    network entirely, a stale one is kept as the fallback candidate
//! 3. the remote payload is fetched, transformed, and written back
//! 4. a fetch failure is masked by any previously-read cache payload before
//!    it is allowed to propagate
//!
//! Concurrent queries for the same resolved endpoint are coalesced: the
//! second caller waits on the first's in-flight refresh and then reads the
//! freshly-written cache instead of fetching again.
//!
//! The service is an explicit object constructed once per app instance and
//! passed by reference; there is no global mutable cache state.

mod bundle;
mod endpoint;
mod entry;
mod error;
mod native;
mod remote;
mod service;
mod storage;

pub use bundle::{BundleCatalog, BundleInfo, BundleService};
pub use endpoint::{resolve_endpoint, ResolvedEndpoint};
pub use entry::{CacheEntry, NS_BUNDLES, NS_PRESETS};
pub use error::{Error, Result};
pub use native::NativeStore;
pub use remote::{HttpSource, RemoteSource};
pub use service::{CacheService, Dataset, QueryArgs};
pub use storage::{MemoryStore, StorageBackend};
