//! Error types for battledex-cache

use thiserror::Error;

/// Cache orchestrator error type
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid invocation (bad generation etc.)
    #[error(transparent)]
    Core(#[from] battledex_core::Error),

    /// Transformer rejected the invocation
    #[error(transparent)]
    Transform(#[from] battledex_transform::Error),

    /// A format-scoped query was made without a usable format
    #[error("No usable format for a format-scoped query")]
    FormatRequired,

    /// Persistent storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Network failure (recovered via cache fallback when one exists)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Cached or remote payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The bundle catalog endpoint returned a not-ok envelope
    #[error("Bundle catalog rejected: {0}")]
    Bundle(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, Error>;
