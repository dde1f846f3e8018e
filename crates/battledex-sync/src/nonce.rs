//! Battle nonce: change detection over the live session object
//!
//! The simulator never pushes change notifications; the companion layer
//! polls the raw session object and must decide cheaply whether anything
//! meaningful moved. The nonce is a content hash over a curated
//! mutation-sensitive subset: identifiers, the pending request, roster
//! composition, per-unit mutable attributes, decision markers, and the
//! event log filtered to state-changing lines.
//!
//! Any consumer-visible field left out of the subset is a missed-update
//! bug, so the subset errs broad. Cosmetic-only traffic (chat lines,
//! spectator counts) is deliberately outside it.

use battledex_core::{identify, Identity, KeySpec, Value, ValueMap};
use serde_json::Value as Json;

/// Key spec for the volatile battle nonce.
pub const BATTLE_NONCE: KeySpec = KeySpec::new(
    "battle-nonce",
    &[
        "battle", "turn", "request", "rosters", "units", "pending", "log",
    ],
);

/// Event-log line prefixes that mark a state change.
const LOG_PREFIXES: &[&str] = &["|move|", "|switch|", "|faint|", "|turn|"];

/// Compute the nonce for a raw session object.
///
/// Returns `None` when the object addresses none of the nonce fields,
/// meaning the state cannot be diffed and callers must resync
/// unconditionally.
pub fn battle_nonce(raw: &Json) -> Option<Identity> {
    let mut subject = ValueMap::new();

    if let Some(id) = raw.get("id").and_then(Json::as_str) {
        subject.insert("battle".to_string(), Value::from(id));
    }
    if let Some(turn) = raw.get("turn").and_then(Json::as_u64) {
        subject.insert("turn".to_string(), Value::Int(turn as i64));
    }
    if let Some(request) = raw.get("request").filter(|r| !r.is_null()) {
        subject.insert("request".to_string(), Value::from_json(request));
        if let Some(pending) = pending_markers(request) {
            subject.insert("pending".to_string(), pending);
        }
    }
    if let Some(sides) = raw.get("sides").and_then(Json::as_array) {
        subject.insert("rosters".to_string(), roster_composition(sides));
        subject.insert("units".to_string(), unit_attributes(sides));
    }
    if let Some(log) = raw.get("log").and_then(Json::as_array) {
        let filtered = filtered_log(log);
        if !filtered.is_empty() {
            subject.insert(
                "log".to_string(),
                Value::List(filtered.into_iter().map(Value::String).collect()),
            );
        }
    }

    identify(&BATTLE_NONCE, &subject)
}

/// Species lists per side; a switch-in of a new species changes this even
/// before any attribute does.
fn roster_composition(sides: &[Json]) -> Value {
    let rosters = sides
        .iter()
        .map(|side| {
            let species = side
                .get("pokemon")
                .and_then(Json::as_array)
                .map(|roster| {
                    roster
                        .iter()
                        .filter_map(|u| u.get("species").and_then(Json::as_str))
                        .map(Value::from)
                        .collect()
                })
                .unwrap_or_default();
            Value::List(species)
        })
        .collect();
    Value::List(rosters)
}

/// Per-unit mutable attributes: hp, status, item, and boost stages.
fn unit_attributes(sides: &[Json]) -> Value {
    let mut units = Vec::new();
    for side in sides {
        let Some(roster) = side.get("pokemon").and_then(Json::as_array) else {
            continue;
        };
        for unit in roster {
            let hp = unit.get("hp").and_then(Json::as_u64).unwrap_or(0);
            let status = unit.get("status").and_then(Json::as_str).unwrap_or("");
            let item = unit.get("item").and_then(Json::as_str).unwrap_or("");
            let boosts = unit
                .get("boosts")
                .map(Value::from_json)
                .unwrap_or(Value::Null);
            units.push(Value::List(vec![
                Value::Int(hp as i64),
                Value::from(status),
                Value::from(item),
                boosts,
            ]));
        }
    }
    Value::List(units)
}

/// Decision markers from the pending request: what kind of input the
/// simulator is waiting for.
fn pending_markers(request: &Json) -> Option<Value> {
    let mut markers = Vec::new();
    if request
        .get("wait")
        .and_then(Json::as_bool)
        .unwrap_or(false)
    {
        markers.push(Value::from("wait"));
    }
    if request.get("teamPreview").is_some() {
        markers.push(Value::from("teampreview"));
    }
    if let Some(force) = request.get("forceSwitch") {
        markers.push(Value::from_json(force));
    }
    if markers.is_empty() {
        None
    } else {
        Some(Value::List(markers))
    }
}

fn filtered_log(log: &[Json]) -> Vec<String> {
    log.iter()
        .filter_map(Json::as_str)
        .filter(|line| LOG_PREFIXES.iter().any(|p| line.starts_with(p)))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_battle(turn: u64, hp: u64) -> Json {
        json!({
            "id": "battle-gen9ou-1",
            "turn": turn,
            "sides": [
                {"pokemon": [{"species": "Heatran", "hp": hp, "status": "", "item": "leftovers"}]},
                {"pokemon": [{"species": "Garchomp", "hp": 300}]},
            ],
            "log": ["|turn|1", "|j|spectator", "|move|p1a: Heatran|Magma Storm|p2a: Garchomp"],
        })
    }

    #[test]
    fn test_same_state_hashes_equal() {
        assert_eq!(battle_nonce(&raw_battle(1, 209)), battle_nonce(&raw_battle(1, 209)));
    }

    #[test]
    fn test_turn_change_changes_nonce() {
        assert_ne!(battle_nonce(&raw_battle(1, 209)), battle_nonce(&raw_battle(2, 209)));
    }

    #[test]
    fn test_hp_change_changes_nonce() {
        assert_ne!(battle_nonce(&raw_battle(1, 209)), battle_nonce(&raw_battle(1, 180)));
    }

    #[test]
    fn test_cosmetic_log_lines_ignored() {
        let mut with_chat = raw_battle(1, 209);
        with_chat["log"]
            .as_array_mut()
            .unwrap()
            .push(json!("|c|Alice|nice play"));
        assert_eq!(battle_nonce(&raw_battle(1, 209)), battle_nonce(&with_chat));
    }

    #[test]
    fn test_pending_request_changes_nonce() {
        let mut waiting = raw_battle(1, 209);
        waiting["request"] = json!({"rqid": 3, "forceSwitch": [true]});
        assert_ne!(battle_nonce(&raw_battle(1, 209)), battle_nonce(&waiting));
    }

    #[test]
    fn test_unaddressable_object_has_no_nonce() {
        assert_eq!(battle_nonce(&json!({"spectators": 40})), None);
        assert_eq!(battle_nonce(&json!("not an object")), None);
    }
}
