//! Battledex Sync - Canonical battle store and nonce-gated sync
//!
//! The simulator owns the live session; this crate owns a serializable
//! mirror of it. Reconciliation is pull-based:
//! 1. each poll computes a battle nonce over the mutation-sensitive
//!    subset of the raw object ([`battle_nonce`])
//! 2. an unchanged nonce means no work, checked before any allocation
//! 3. a changed nonce patches a structural clone of the store and swaps
//!    it in whole
//!
//! Consumers never touch the store directly; they take snapshots from the
//! [`Synchronizer`] and request mutations through it.

mod error;
mod nonce;
mod store;
mod sync;

pub use error::{Error, Result};
pub use nonce::{battle_nonce, BATTLE_NONCE};
pub use store::{BattleStore, FieldConditions, SideStore, UnitRecord};
pub use sync::{SyncOutcome, Synchronizer};
