//! Error types for battledex-sync

use thiserror::Error;

/// Sync layer error type
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid generation or format in the raw session object
    #[error(transparent)]
    Core(#[from] battledex_core::Error),

    /// The raw session object lacks a field the store cannot start without
    #[error("Raw session object is missing '{0}'")]
    MissingField(&'static str),
}

/// Result type for sync operations
pub type Result<T> = std::result::Result<T, Error>;
