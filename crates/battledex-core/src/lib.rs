//! Battledex Core - Identity hashing and the canonical preset model
//!
//! This crate provides the foundation types for the battledex sync layer:
//! - Dynamic value types (`Value`, `ValueMap`) for addressing heterogeneous
//!   external objects
//! - The identity engine: key specs and deterministic content hashing for
//!   stable record identities and volatile change-detection nonces
//! - Generation rules (legacy vs modern stat defaults, format parsing)
//! - The canonical preset record shared by every other crate
//!
//! ## Identity vs Nonce
//!
//! Both are produced by the same [`identify`] contract; they differ only in
//! the key spec the caller supplies:
//! - An *identity* hashes a small, stable field subset and serves as a
//!   primary key for dedup/merge.
//! - A *nonce* hashes a broad, mutation-sensitive subset and is compared
//!   between sync passes to decide whether anything meaningful changed.

mod error;
mod gen;
mod identity;
mod preset;
mod value;

pub use error::{Error, Result};
pub use gen::Generation;
pub use identity::{identify, to_key, Identity, KeySpec, MISSING_SENTINEL, PRESET_IDENTITY};
pub use preset::{Alt, PresetRecord, PresetSource, StatKind, StatTable, STAT_SLOTS};
pub use value::{Value, ValueMap};
