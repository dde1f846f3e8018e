//! Error types for battledex-core

use thiserror::Error;

/// Core error type
///
/// Only invalid invocations surface as errors at this layer; absent or
/// partial external data is handled locally by the callers.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid generation: {0} (expected 1..=9)")]
    InvalidGeneration(u8),

    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid format string: {0:?}")]
    InvalidFormat(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
