//! Battledex Transform - Raw source payloads to canonical preset records
//!
//! One transformer per raw payload shape:
//! - [`format_sets`] - per-format vendor sets
//! - [`gen_sets`] - per-generation vendor sets (format in the outer key)
//! - [`format_usage`] - per-format aggregated usage statistics
//! - [`randoms_sets`] - per-generation random-variant sets
//! - [`randoms_usage`] - per-generation random-variant usage statistics
//!
//! Transformers are pure: same payload and args, same records. They never
//! error on missing or malformed optional fields; a payload that fails the
//! basic non-empty-object check yields an empty record set, since absent
//! data is a normal outcome (a format with no published data). The only
//! error path is a structurally invalid [`TransformArgs`].

mod args;
mod dedupe;
mod error;
mod flatten;
mod patch;
mod randoms;
mod sets;
mod usage;

pub use args::TransformArgs;
pub use dedupe::dedupe_presets;
pub use error::{Error, Result};
pub use flatten::{flatten_alts, flatten_move_slots, parse_stat_table, primary_of};
pub use patch::patch_signature_moves;
pub use randoms::{randoms_sets, randoms_usage};
pub use sets::{format_sets, gen_sets};
pub use usage::format_usage;
