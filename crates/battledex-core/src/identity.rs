//! Identity engine: key specs and deterministic content hashing
//!
//! `identify` turns a curated subset of a subject's fields into a stable,
//! fixed-length identifier. The same contract backs two very different
//! callers:
//! - durable identities (the preset record's primary key, hashed over a
//!   small stable subset)
//! - volatile nonces (battle change detection, hashed over a broad
//!   mutation-sensitive subset)
//!
//! The subject is serialized field-by-field in key-spec order as
//! `key:value|key:value` and the result is hashed with a name-based UUID
//! (v5) under a fixed application namespace, so identities are stable
//! across runs and platforms.

use crate::value::{Value, ValueMap};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Fixed namespace for all battledex name-based hashes.
///
/// Changing this invalidates every persisted identity, so it is part of the
/// storage format.
const BATTLEDEX_NAMESPACE: Uuid = Uuid::from_u128(0x8c2f_41d6_9b3a_4e07_b152_6d88_a0c4_53e9);

/// Sentinel emitted for fields the subject does not carry.
///
/// Absent values must not serialize to the empty string, otherwise a record
/// with `level: None` and one with `level: ""` would collide.
pub const MISSING_SENTINEL: &str = "?";

/// Stable content hash used as a primary key or change-detection nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub Uuid);

impl Identity {
    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered list of field names addressed when hashing a subject
///
/// Key specs are defined per entity type and never persisted. Field order
/// is significant: it fixes the serialization order, which makes the hash
/// independent of how the subject map itself was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec {
    name: &'static str,
    fields: &'static [&'static str],
}

impl KeySpec {
    /// Create a new key spec
    pub const fn new(name: &'static str, fields: &'static [&'static str]) -> Self {
        Self { name, fields }
    }

    /// The spec's name (for diagnostics only)
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The addressed field names, in serialization order
    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }
}

/// Key spec for the preset record's durable identity.
///
/// Two records equal on these five fields collide to the same id; every
/// other field is deliberately excluded so re-fetched data replaces rather
/// than duplicates.
pub const PRESET_IDENTITY: KeySpec = KeySpec::new(
    "preset",
    &["name", "gen", "format", "species", "level"],
);

/// Compute the identity of `subject` under `spec`.
///
/// Fields are serialized in spec order; missing or null fields serialize to
/// [`MISSING_SENTINEL`]. Returns `None` when the subject addresses zero
/// fields of the spec: a null identity means "cannot be cached or diffed",
/// never a valid empty identity.
pub fn identify(spec: &KeySpec, subject: &ValueMap) -> Option<Identity> {
    let mut addressed = 0usize;
    let mut material = String::new();

    for (i, field) in spec.fields().iter().enumerate() {
        if i > 0 {
            material.push('|');
        }
        material.push_str(field);
        material.push(':');
        match subject.get(*field) {
            Some(value) if !value.is_null() => {
                addressed += 1;
                material.push_str(&canonical_fragment(value));
            }
            _ => material.push_str(MISSING_SENTINEL),
        }
    }

    if addressed == 0 {
        return None;
    }
    Some(Identity(Uuid::new_v5(
        &BATTLEDEX_NAMESPACE,
        material.as_bytes(),
    )))
}

/// Lowercase a label and strip non-alphanumerics.
///
/// The canonical lookup key for species, moves, abilities and formats:
/// "Magma Storm" and "magmastorm" address the same thing.
pub fn to_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Canonical string form of a value for hashing.
///
/// Strings go through [`to_key`] so cosmetic variations hash identically.
/// Lists and maps serialize element-wise in order.
pub(crate) fn canonical_fragment(value: &Value) -> String {
    match value {
        Value::Null => MISSING_SENTINEL.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => to_key(s),
        Value::List(list) => list
            .iter()
            .map(canonical_fragment)
            .collect::<Vec<_>>()
            .join(","),
        Value::Map(map) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, canonical_fragment(v)))
            .collect::<Vec<_>>()
            .join(","),
    }
}
