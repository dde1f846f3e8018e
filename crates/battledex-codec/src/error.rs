//! Error types for battledex-codec

use thiserror::Error;

/// Codec error type
///
/// Only encoding can fail; decoding degrades to skipping fragments or
/// rejecting the whole string with `None`.
#[derive(Debug, Error)]
pub enum Error {
    /// A value contains a structural delimiter and cannot be framed
    #[error("Value {value:?} for {field} contains the delimiter {delimiter:?}")]
    DelimiterInValue {
        field: &'static str,
        value: String,
        delimiter: char,
    },

    /// Compression stage failure (callers degrade to the plain form)
    #[error("Compression failed: {0}")]
    Compression(String),
}

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, Error>;
