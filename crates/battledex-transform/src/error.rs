//! Error types for battledex-transform

use thiserror::Error;

/// Transformer error type
///
/// Transformers only fail on invalid invocation; bad external data is
/// skipped or defaulted locally.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller supplied a structurally invalid generation
    #[error(transparent)]
    Core(#[from] battledex_core::Error),

    /// A format-scoped transformer was invoked without a format
    #[error("Missing format for format-scoped transformer {0}")]
    MissingFormat(&'static str),
}

/// Result type for transformer operations
pub type Result<T> = std::result::Result<T, Error>;
