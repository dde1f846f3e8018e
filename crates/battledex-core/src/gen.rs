//! Generation rules: valid range, era defaults, and format parsing

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A game generation (1..=9)
///
/// Generation decides the stat-table defaults: legacy eras (1-2) assume a
/// 30 IV floor and a 252 EV ceiling per slot, modern eras assume 31/0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(u8);

/// Greatest generation the data sources publish sets for.
pub const MAX_GENERATION: u8 = 9;

impl Generation {
    /// Create a generation, validating the range
    pub fn new(n: u8) -> Result<Self> {
        if n == 0 || n > MAX_GENERATION {
            return Err(Error::InvalidGeneration(n));
        }
        Ok(Self(n))
    }

    /// Get the raw generation number
    pub fn raw(&self) -> u8 {
        self.0
    }

    /// Legacy eras predate the modern IV/EV system
    pub fn is_legacy(&self) -> bool {
        self.0 <= 2
    }

    /// Default per-slot IV for unspecified slots
    pub fn default_iv(&self) -> u16 {
        if self.is_legacy() {
            30
        } else {
            31
        }
    }

    /// Default per-slot EV for unspecified slots
    pub fn default_ev(&self) -> u16 {
        if self.is_legacy() {
            252
        } else {
            0
        }
    }

    /// The bare-generation endpoint key, e.g. `gen9`
    pub fn endpoint(&self) -> String {
        format!("gen{}", self.0)
    }

    /// Split a full format string like `gen9ou` into its generation and the
    /// generation-stripped format (`ou`).
    ///
    /// Returns an error when the string carries no parseable `gen<N>` prefix.
    pub fn split_format(format: &str) -> Result<(Generation, &str)> {
        let rest = format
            .strip_prefix("gen")
            .ok_or_else(|| Error::InvalidFormat(format.to_string()))?;
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(Error::InvalidFormat(format.to_string()));
        }
        let n: u8 = digits
            .parse()
            .map_err(|_| Error::InvalidFormat(format.to_string()))?;
        Ok((Generation::new(n)?, &rest[digits.len()..]))
    }
}

impl TryFrom<u8> for Generation {
    type Error = Error;

    fn try_from(n: u8) -> Result<Self> {
        Generation::new(n)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
