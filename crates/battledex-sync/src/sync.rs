//! Nonce-gated synchronization
//!
//! The [`Synchronizer`] is the only owner of the canonical store. Each
//! poll of the raw session object goes through [`Synchronizer::sync`]:
//! an unchanged nonce short-circuits before any clone, a changed one
//! patches a structural clone and swaps it in whole. Consumers read
//! through [`Synchronizer::snapshot`] and never hold a reference into
//! the live store.

use crate::error::Result;
use crate::nonce::battle_nonce;
use crate::store::BattleStore;
use battledex_core::Identity;
use serde_json::Value as Json;
use tracing::debug;

/// What one sync pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// First sight of this session id, store created
    Created,
    /// Nonce changed, store patched and replaced
    Updated,
    /// Nonce unchanged, store untouched
    Unchanged,
}

/// Exclusive owner of one session's canonical store
#[derive(Debug, Default)]
pub struct Synchronizer {
    state: Option<State>,
}

#[derive(Debug)]
struct State {
    store: BattleStore,
    nonce: Option<Identity>,
}

impl Synchronizer {
    /// Create a synchronizer with no session yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile the store with one raw sighting of the session object.
    ///
    /// A raw object carrying a different session id than the current store
    /// starts a fresh store; the previous session is discarded. A null
    /// nonce (object cannot be diffed) forces a resync every pass.
    pub fn sync(&mut self, raw: &Json) -> Result<SyncOutcome> {
        let nonce = battle_nonce(raw);
        let raw_id = raw.get("id").and_then(Json::as_str);

        if let Some(state) = self.state.as_mut() {
            if raw_id == Some(state.store.battle_id.as_str()) {
                if nonce.is_some() && nonce == state.nonce {
                    return Ok(SyncOutcome::Unchanged);
                }
                // Patch a fresh clone and swap it in whole, so a snapshot
                // taken before this pass is never mutated under the caller.
                let mut next = state.store.structural_clone();
                next.patch(raw);
                debug!(battle_id = %next.battle_id, turn = next.turn, "session updated");
                state.store = next;
                state.nonce = nonce;
                return Ok(SyncOutcome::Updated);
            }
        }

        let store = BattleStore::from_raw(raw)?;
        debug!(battle_id = %store.battle_id, "session created");
        self.state = Some(State { store, nonce });
        Ok(SyncOutcome::Created)
    }

    /// Read-only view of the current store, if a session is open
    pub fn snapshot(&self) -> Option<BattleStore> {
        self.state.as_ref().map(|s| s.store.structural_clone())
    }

    /// Whether a session is currently mirrored
    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    /// Discard the mirrored session.
    ///
    /// Dropping the synchronizer has the same effect; `close` exists for
    /// surfaces that outlive their session.
    pub fn close(&mut self) {
        if let Some(state) = self.state.take() {
            debug!(battle_id = %state.store.battle_id, "session closed");
        }
    }
}
