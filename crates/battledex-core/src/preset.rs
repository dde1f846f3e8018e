//! The canonical preset record
//!
//! Every raw source payload (vendor sets, usage statistics, random-variant
//! data) is transformed into this one shape. A record's `id` is a pure
//! function of a five-field subset (name, gen, format, species, level), so
//! the same logical set fetched from two sources collides to the same id
//! and the later transform replaces the earlier. Records are never mutated
//! in place; updates replace the whole record.

use crate::gen::Generation;
use crate::identity::{identify, Identity, PRESET_IDENTITY};
use crate::value::{Value, ValueMap};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a preset record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetSource {
    /// Authored by the user in the app
    User,
    /// Published vendor set data
    Vendor,
    /// Derived from aggregated usage statistics
    Usage,
}

impl fmt::Display for PresetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetSource::User => write!(f, "user"),
            PresetSource::Vendor => write!(f, "vendor"),
            PresetSource::Usage => write!(f, "usage"),
        }
    }
}

/// One ranked alternative for a categorical attribute
///
/// Vendor payloads carry either a bare value or a `(value, usage weight)`
/// pair; both flatten into this single tagged shape rather than being
/// duck-typed at every call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Alt {
    /// An alternative with no usage information
    Plain(String),
    /// An alternative with a usage weight in `0.0..=1.0`
    Weighted(String, f64),
}

impl Alt {
    /// The alternative's value
    pub fn value(&self) -> &str {
        match self {
            Alt::Plain(v) => v,
            Alt::Weighted(v, _) => v,
        }
    }

    /// The usage weight, if any
    pub fn weight(&self) -> Option<f64> {
        match self {
            Alt::Plain(_) => None,
            Alt::Weighted(_, w) => Some(*w),
        }
    }
}

impl From<&str> for Alt {
    fn from(v: &str) -> Self {
        Alt::Plain(v.to_string())
    }
}

impl From<(&str, f64)> for Alt {
    fn from((v, w): (&str, f64)) -> Self {
        Alt::Weighted(v.to_string(), w)
    }
}

/// Slot names of a stat table, in positional order
pub const STAT_SLOTS: [&str; 6] = ["hp", "atk", "def", "spa", "spd", "spe"];

/// Which of the two stat tables a value belongs to
///
/// The tables share a shape but differ in bounds and era defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    /// Individual values, bounded to 0..=31
    Iv,
    /// Effort values, bounded to 0..=252
    Ev,
}

impl StatKind {
    /// Upper bound for a slot of this kind
    pub fn max(&self) -> u16 {
        match self {
            StatKind::Iv => 31,
            StatKind::Ev => 252,
        }
    }

    /// Era-appropriate default for an unspecified slot
    pub fn default_for(&self, gen: Generation) -> u16 {
        match self {
            StatKind::Iv => gen.default_iv(),
            StatKind::Ev => gen.default_ev(),
        }
    }
}

/// A fixed-width 6-slot numeric table (hp/atk/def/spa/spd/spe)
///
/// Slots are optional until filled: sources routinely omit slots that equal
/// the era default, and the codec omits them on encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatTable(pub [Option<u16>; 6]);

impl StatTable {
    /// Build a table with every slot specified
    pub fn full(values: [u16; 6]) -> Self {
        Self(values.map(Some))
    }

    /// Get a slot by positional index
    pub fn get(&self, slot: usize) -> Option<u16> {
        self.0.get(slot).copied().flatten()
    }

    /// Set a slot by positional index
    pub fn set(&mut self, slot: usize, value: u16) {
        if let Some(v) = self.0.get_mut(slot) {
            *v = Some(value);
        }
    }

    /// Set a slot by its name (`hp`, `atk`, ...); unknown names are ignored
    pub fn set_named(&mut self, name: &str, value: u16) {
        if let Some(slot) = STAT_SLOTS.iter().position(|s| *s == name) {
            self.set(slot, value);
        }
    }

    /// Whether any slot is specified
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|v| v.is_none())
    }

    /// Complete the table: unspecified slots take the era default,
    /// specified slots are clamped to the kind's bound.
    pub fn filled(&self, kind: StatKind, gen: Generation) -> [u16; 6] {
        let default = kind.default_for(gen);
        self.0.map(|v| v.unwrap_or(default).min(kind.max()))
    }
}

/// The canonical preset record, the unit of derived data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetRecord {
    /// Content hash over (name, gen, format, species, level); primary key
    pub id: Option<Identity>,
    /// Which kind of source produced this record
    pub source: PresetSource,
    /// Display name of the set, e.g. "Defensive Pivot"
    pub name: String,
    /// Generation this set targets
    pub gen: Generation,
    /// Generation-stripped format, e.g. "ou"
    pub format: String,
    /// The species this record describes
    pub species: String,
    /// Fixed level, when the source pins one
    pub level: Option<u8>,
    /// Primary ability
    pub ability: Option<String>,
    /// Ranked ability alternatives
    pub alt_abilities: Vec<Alt>,
    /// Primary held item
    pub item: Option<String>,
    /// Ranked item alternatives
    pub alt_items: Vec<Alt>,
    /// Primary move list
    pub moves: Vec<String>,
    /// Ranked move alternatives (superset of `moves`)
    pub alt_moves: Vec<Alt>,
    /// Primary secondary typing
    pub tera_type: Option<String>,
    /// Ranked secondary-typing alternatives
    pub alt_tera_types: Vec<Alt>,
    /// Individual values table
    pub ivs: StatTable,
    /// Effort values table
    pub evs: StatTable,
}

impl PresetRecord {
    /// Create an empty record for the given source and scope
    pub fn new(
        source: PresetSource,
        name: impl Into<String>,
        gen: Generation,
        format: impl Into<String>,
        species: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            source,
            name: name.into(),
            gen,
            format: format.into(),
            species: species.into(),
            level: None,
            ability: None,
            alt_abilities: Vec::new(),
            item: None,
            alt_items: Vec::new(),
            moves: Vec::new(),
            alt_moves: Vec::new(),
            tera_type: None,
            alt_tera_types: Vec::new(),
            ivs: StatTable::default(),
            evs: StatTable::default(),
        }
    }

    /// The identity subject: exactly the five fields `id` is a function of
    pub fn identity_subject(&self) -> ValueMap {
        let mut subject = ValueMap::new();
        subject.insert("name".to_string(), Value::from(self.name.as_str()));
        subject.insert("gen".to_string(), Value::from(self.gen.raw()));
        subject.insert("format".to_string(), Value::from(self.format.as_str()));
        subject.insert("species".to_string(), Value::from(self.species.as_str()));
        subject.insert("level".to_string(), Value::from(self.level));
        subject
    }

    /// Recompute and store the record's identity.
    ///
    /// The single assignment point for `id`; transformers and the codec both
    /// route through here so hydration is equivalent to transforming.
    pub fn recompute_id(&mut self) -> Option<Identity> {
        self.id = identify(&PRESET_IDENTITY, &self.identity_subject());
        self.id
    }
}
