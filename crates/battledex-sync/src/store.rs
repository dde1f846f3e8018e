//! The canonical battle store
//!
//! An internally-owned mirror of one live simulator session: session
//! metadata at the top, one sub-record per side with its roster, and a
//! field-conditions record. The store is owned exclusively by the
//! [`crate::Synchronizer`]; consumers only ever see clones.
//!
//! Patching is tolerant of the raw object's gaps. Each field is read
//! when present and left at its previous value otherwise, so a partial
//! update (e.g. a request-only frame) never wipes known state.

use crate::error::{Error, Result};
use battledex_core::Generation;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Battle-wide field conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConditions {
    /// Active weather, if any
    pub weather: Option<String>,
    /// Active terrain, if any
    pub terrain: Option<String>,
    /// Pseudo-weather effects (trick room and friends)
    pub pseudo: Vec<String>,
}

/// One unit on a side's roster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    /// Species (form-qualified)
    pub species: String,
    /// Nickname, defaults to the species
    pub name: String,
    /// Level, when disclosed
    pub level: Option<u8>,
    /// Current hit points
    pub hp: u32,
    /// Maximum hit points
    pub max_hp: u32,
    /// Status condition token (`brn`, `par`, ...)
    pub status: Option<String>,
    /// Revealed or disclosed ability
    pub ability: Option<String>,
    /// Revealed or disclosed held item
    pub item: Option<String>,
    /// Revealed moves
    pub moves: Vec<String>,
    /// Nonzero stat-stage boosts
    pub boosts: IndexMap<String, i8>,
    /// Tera type, when revealed
    pub tera: Option<String>,
}

/// One side of the battle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideStore {
    /// Player name
    pub name: String,
    /// Ladder rating, when the simulator discloses it
    pub rating: Option<u32>,
    /// Roster in party order
    pub roster: Vec<UnitRecord>,
    /// Indices into `roster` currently on the field
    pub active_indices: Vec<usize>,
    /// Roster index the consumer currently has selected
    pub selection_index: Option<usize>,
    /// Side-wide conditions (hazards, screens)
    pub conditions: Vec<String>,
}

/// The canonical mirror of one battle session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleStore {
    /// Simulator session id
    pub battle_id: String,
    /// Generation parsed from the format
    pub gen: Generation,
    /// Full format string (`gen9randombattle`)
    pub format: String,
    /// Current turn counter
    pub turn: u32,
    /// Whether the session is still running
    pub active: bool,
    /// Both sides in simulator order
    pub sides: [SideStore; 2],
    /// Battle-wide conditions
    pub field: FieldConditions,
}

impl BattleStore {
    /// Create a store from the first raw sighting of a session.
    ///
    /// Requires a session id and a generation-prefixed format; everything
    /// else is optional and patched in.
    pub fn from_raw(raw: &Json) -> Result<Self> {
        let battle_id = raw
            .get("id")
            .and_then(Json::as_str)
            .ok_or(Error::MissingField("id"))?
            .to_string();
        let format = raw
            .get("format")
            .and_then(Json::as_str)
            .ok_or(Error::MissingField("format"))?
            .to_string();
        let (gen, _) = Generation::split_format(&format)?;

        let mut store = Self {
            battle_id,
            gen,
            format,
            turn: 0,
            active: true,
            sides: [SideStore::default(), SideStore::default()],
            field: FieldConditions::default(),
        };
        store.patch(raw);
        Ok(store)
    }

    /// Overlay the raw object onto this store.
    ///
    /// Absent fields keep their previous values; present fields are
    /// replaced whole.
    pub fn patch(&mut self, raw: &Json) {
        if let Some(turn) = raw.get("turn").and_then(Json::as_u64) {
            self.turn = turn as u32;
        }
        if let Some(active) = raw.get("active").and_then(Json::as_bool) {
            self.active = active;
        }
        if let Some(sides) = raw.get("sides").and_then(Json::as_array) {
            for (i, side) in sides.iter().take(2).enumerate() {
                patch_side(&mut self.sides[i], side);
            }
        }
        if let Some(field) = raw.get("field") {
            patch_field(&mut self.field, field);
        }
    }

    /// Deep copy where every nested container is a fresh allocation.
    ///
    /// Patching the copy never reaches back into this store, which is what
    /// lets the sync routine compare nonces before paying for the clone.
    pub fn structural_clone(&self) -> Self {
        self.clone()
    }
}

fn patch_side(side: &mut SideStore, raw: &Json) {
    if let Some(name) = raw.get("name").and_then(Json::as_str) {
        side.name = name.to_string();
    }
    if let Some(rating) = raw.get("rating").and_then(Json::as_u64) {
        side.rating = Some(rating as u32);
    }
    if let Some(roster) = raw.get("pokemon").and_then(Json::as_array) {
        side.roster = roster.iter().map(unit_from_raw).collect();
    }
    if let Some(indices) = raw.get("activeIndices").and_then(Json::as_array) {
        side.active_indices = indices
            .iter()
            .filter_map(Json::as_u64)
            .map(|i| i as usize)
            .collect();
    }
    if let Some(index) = raw.get("selectionIndex").and_then(Json::as_u64) {
        side.selection_index = Some(index as usize);
    }
    if let Some(conditions) = raw.get("conditions").and_then(Json::as_array) {
        side.conditions = string_list(conditions);
    }
}

fn patch_field(field: &mut FieldConditions, raw: &Json) {
    field.weather = raw
        .get("weather")
        .and_then(Json::as_str)
        .filter(|w| !w.is_empty())
        .map(str::to_string);
    field.terrain = raw
        .get("terrain")
        .and_then(Json::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    if let Some(pseudo) = raw.get("pseudo").and_then(Json::as_array) {
        field.pseudo = string_list(pseudo);
    }
}

fn unit_from_raw(raw: &Json) -> UnitRecord {
    let species = raw
        .get("species")
        .and_then(Json::as_str)
        .unwrap_or_default()
        .to_string();
    let name = raw
        .get("name")
        .and_then(Json::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| species.clone());

    let mut boosts = IndexMap::new();
    if let Some(raw_boosts) = raw.get("boosts").and_then(Json::as_object) {
        for (stage, value) in raw_boosts {
            if let Some(value) = value.as_i64().filter(|v| *v != 0) {
                boosts.insert(stage.clone(), value.clamp(-6, 6) as i8);
            }
        }
    }

    UnitRecord {
        species,
        name,
        level: raw.get("level").and_then(Json::as_u64).map(|l| l as u8),
        hp: raw.get("hp").and_then(Json::as_u64).unwrap_or(0) as u32,
        max_hp: raw.get("maxhp").and_then(Json::as_u64).unwrap_or(0) as u32,
        status: non_empty_str(raw.get("status")),
        ability: non_empty_str(raw.get("ability")),
        item: non_empty_str(raw.get("item")),
        moves: raw
            .get("moves")
            .and_then(Json::as_array)
            .map(|m| string_list(m))
            .unwrap_or_default(),
        boosts,
        tera: non_empty_str(raw.get("teraType")),
    }
}

fn non_empty_str(value: Option<&Json>) -> Option<String> {
    value
        .and_then(Json::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(values: &[Json]) -> Vec<String> {
    values
        .iter()
        .filter_map(Json::as_str)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_battle() -> Json {
        json!({
            "id": "battle-gen9randombattle-117703",
            "format": "gen9randombattle",
            "turn": 4,
            "active": true,
            "sides": [
                {
                    "name": "Alice",
                    "rating": 1512,
                    "pokemon": [
                        {
                            "species": "Heatran",
                            "level": 80,
                            "hp": 209,
                            "maxhp": 261,
                            "status": "brn",
                            "ability": "Flash Fire",
                            "item": "Leftovers",
                            "moves": ["magmastorm", "earthpower"],
                            "boosts": {"spa": 1, "spe": 0},
                            "teraType": "Grass",
                        },
                    ],
                    "activeIndices": [0],
                    "conditions": ["stealthrock"],
                },
                {"name": "Bob", "pokemon": []},
            ],
            "field": {"weather": "sandstorm", "pseudo": ["trickroom"]},
        })
    }

    #[test]
    fn test_from_raw_builds_full_store() {
        let store = BattleStore::from_raw(&raw_battle()).unwrap();
        assert_eq!(store.battle_id, "battle-gen9randombattle-117703");
        assert_eq!(store.gen.raw(), 9);
        assert_eq!(store.turn, 4);
        assert_eq!(store.sides[0].name, "Alice");
        assert_eq!(store.sides[0].rating, Some(1512));
        assert_eq!(store.sides[1].name, "Bob");

        let heatran = &store.sides[0].roster[0];
        assert_eq!(heatran.species, "Heatran");
        assert_eq!(heatran.name, "Heatran");
        assert_eq!(heatran.hp, 209);
        assert_eq!(heatran.status.as_deref(), Some("brn"));
        // Zero stages are dropped.
        assert_eq!(heatran.boosts.get("spa"), Some(&1));
        assert_eq!(heatran.boosts.get("spe"), None);

        assert_eq!(store.field.weather.as_deref(), Some("sandstorm"));
        assert_eq!(store.field.pseudo, vec!["trickroom"]);
    }

    #[test]
    fn test_from_raw_requires_id_and_format() {
        assert!(matches!(
            BattleStore::from_raw(&json!({"format": "gen9ou"})),
            Err(Error::MissingField("id"))
        ));
        assert!(matches!(
            BattleStore::from_raw(&json!({"id": "battle-x"})),
            Err(Error::MissingField("format"))
        ));
    }

    #[test]
    fn test_patch_keeps_absent_fields() {
        let mut store = BattleStore::from_raw(&raw_battle()).unwrap();
        store.patch(&json!({"turn": 5}));
        assert_eq!(store.turn, 5);
        // Unmentioned state survives the partial frame.
        assert_eq!(store.sides[0].roster.len(), 1);
        assert_eq!(store.field.weather.as_deref(), Some("sandstorm"));
    }

    #[test]
    fn test_patch_replaces_roster_whole() {
        let mut store = BattleStore::from_raw(&raw_battle()).unwrap();
        store.patch(&json!({
            "sides": [{"pokemon": [
                {"species": "Garchomp", "hp": 100, "maxhp": 100},
            ]}],
        }));
        assert_eq!(store.sides[0].roster.len(), 1);
        assert_eq!(store.sides[0].roster[0].species, "Garchomp");
        // Side name came from the earlier frame.
        assert_eq!(store.sides[0].name, "Alice");
    }

    #[test]
    fn test_structural_clone_isolates_patches() {
        let store = BattleStore::from_raw(&raw_battle()).unwrap();
        let mut copy = store.structural_clone();
        copy.patch(&json!({"turn": 99, "sides": [{"pokemon": []}]}));
        assert_eq!(store.turn, 4);
        assert_eq!(store.sides[0].roster.len(), 1);
    }

    #[test]
    fn test_boost_stages_clamped() {
        let raw = json!({
            "species": "Cloyster",
            "boosts": {"atk": 12, "def": -9},
        });
        let unit = unit_from_raw(&raw);
        assert_eq!(unit.boosts.get("atk"), Some(&6));
        assert_eq!(unit.boosts.get("def"), Some(&-6));
    }
}
