//! Battledex Codec - Compact versioned text encoding for preset records
//!
//! Records dehydrate into a delimiter-framed opcode string suitable for
//! storage-quota-constrained destinations (persisted settings blobs, URL
//! query parameters, QR payloads):
//!
//! ```text
//! SPC:Heatran|NME:Defensive Pivot|GEN:9|FMT:ou|ABL:Flash Fire|...
//! ```
//!
//! - fields: `<3-letter-opcode>:<value>`, joined by `|`
//! - records: joined by `;`
//! - ranked alternatives: `value@weight`, joined by `,`
//! - stat tables: positional `hp/atk/def/spa/spd/spe`, default slots omitted
//!
//! Hydration is tolerant: unknown opcodes and malformed fragments are
//! skipped, and acceptance is gated on a minimum shape rather than full
//! validity. The record id is never encoded; it is recomputed from the
//! hydrated fields exactly as a transformer would compute it.

mod compress;
mod dehydrate;
mod error;
mod hydrate;
mod opcodes;

pub use compress::{compress_export, decompress_export};
pub use dehydrate::{dehydrate, dehydrate_all};
pub use error::{Error, Result};
pub use hydrate::{hydrate, hydrate_all};
pub use opcodes::{Field, ALT_DELIMITER, FIELD_DELIMITER, OPCODE_DELIMITER, RECORD_DELIMITER};
