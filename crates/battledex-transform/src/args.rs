//! Transformer invocation arguments

use crate::error::{Error, Result};
use battledex_core::Generation;

/// Arguments common to every transformer invocation
///
/// Carries the generation the payload was fetched for and, for
/// format-scoped payloads, the generation-stripped format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformArgs {
    /// Generation the payload targets
    pub gen: Generation,
    /// Generation-stripped format, when the payload is format-scoped
    pub format: Option<String>,
}

impl TransformArgs {
    /// Build args from a raw generation number, validating it.
    ///
    /// An out-of-range generation is the one invalid-invocation case
    /// transformers are allowed to reject.
    pub fn new(gen: u8, format: Option<&str>) -> Result<Self> {
        Ok(Self {
            gen: Generation::new(gen)?,
            format: format
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        })
    }

    /// Build args from an already-validated generation
    pub fn for_gen(gen: Generation) -> Self {
        Self { gen, format: None }
    }

    /// Set the format
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// The format, or an error naming the transformer that required it
    pub(crate) fn require_format(&self, transformer: &'static str) -> Result<&str> {
        self.format
            .as_deref()
            .filter(|f| !f.is_empty())
            .ok_or(Error::MissingFormat(transformer))
    }
}
