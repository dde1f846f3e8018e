//! Flattening of vendor "alternative" shapes
//!
//! Vendor payloads are inconsistent about how they spell alternatives:
//! a bare string, an array of strings, an array of `[value, weight]`
//! pairs, or an object of `value: weight` entries. Everything funnels
//! through [`flatten_alts`] so no call site branches on shape.

use battledex_core::{Alt, StatTable};
use serde_json::Value as Json;

/// Flatten any vendor alternative shape into a ranked alt list.
///
/// Weighted shapes are ordered highest weight first; unweighted shapes keep
/// source order. Unrecognized fragments are skipped, never fatal.
pub fn flatten_alts(raw: &Json) -> Vec<Alt> {
    match raw {
        Json::String(s) => vec![Alt::Plain(s.clone())],
        Json::Array(items) => items.iter().filter_map(flatten_one).collect(),
        Json::Object(map) => {
            let mut alts: Vec<Alt> = map
                .iter()
                .filter_map(|(name, w)| w.as_f64().map(|w| Alt::Weighted(name.clone(), w)))
                .collect();
            // Highest usage first; ties keep source order.
            alts.sort_by(|a, b| {
                b.weight()
                    .partial_cmp(&a.weight())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            alts
        }
        _ => Vec::new(),
    }
}

/// Flatten a single array element: a bare value or a `[value, weight]` pair
fn flatten_one(raw: &Json) -> Option<Alt> {
    match raw {
        Json::String(s) => Some(Alt::Plain(s.clone())),
        Json::Array(pair) => {
            let value = pair.first()?.as_str()?;
            match pair.get(1).and_then(Json::as_f64) {
                Some(w) => Some(Alt::Weighted(value.to_string(), w)),
                None => Some(Alt::Plain(value.to_string())),
            }
        }
        _ => None,
    }
}

/// Primary value of a ranked alt list: the first entry, which for weighted
/// shapes is the highest-weighted alternative.
pub fn primary_of(alts: &[Alt]) -> Option<String> {
    alts.first().map(|a| a.value().to_string())
}

/// Flatten a vendor move list into `(primary moves, all alternatives)`.
///
/// Each slot is either one move or a list of interchangeable moves; the
/// slot's first entry is the primary pick, every entry joins the alt list.
pub fn flatten_move_slots(raw: &Json) -> (Vec<String>, Vec<Alt>) {
    let mut moves = Vec::new();
    let mut alts = Vec::new();
    let Some(slots) = raw.as_array() else {
        return (moves, alts);
    };
    for slot in slots {
        match slot {
            Json::String(m) => {
                moves.push(m.clone());
                alts.push(Alt::Plain(m.clone()));
            }
            Json::Array(options) => {
                let mut first = true;
                for option in options {
                    if let Some(m) = option.as_str() {
                        if first {
                            moves.push(m.to_string());
                            first = false;
                        }
                        alts.push(Alt::Plain(m.to_string()));
                    }
                }
            }
            _ => {}
        }
    }
    (moves, alts)
}

/// Parse a `{slot: value}` object into a stat table.
///
/// Unknown slot names and non-numeric values are skipped.
pub fn parse_stat_table(raw: &Json) -> StatTable {
    let mut table = StatTable::default();
    if let Some(map) = raw.as_object() {
        for (name, value) in map {
            if let Some(v) = value.as_u64() {
                table.set_named(name, v.min(u16::MAX as u64) as u16);
            }
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_bare_string() {
        let alts = flatten_alts(&json!("Flash Fire"));
        assert_eq!(alts, vec![Alt::Plain("Flash Fire".into())]);
        assert_eq!(primary_of(&alts), Some("Flash Fire".into()));
    }

    #[test]
    fn test_flatten_array_of_strings() {
        let alts = flatten_alts(&json!(["Flash Fire", "Flame Body"]));
        assert_eq!(alts.len(), 2);
        assert_eq!(primary_of(&alts), Some("Flash Fire".into()));
    }

    #[test]
    fn test_flatten_weighted_object_ranks_by_weight() {
        let alts = flatten_alts(&json!({"Flame Body": 0.22, "Flash Fire": 0.61}));
        assert_eq!(alts[0], Alt::Weighted("Flash Fire".into(), 0.61));
        assert_eq!(alts[1], Alt::Weighted("Flame Body".into(), 0.22));
        assert_eq!(primary_of(&alts), Some("Flash Fire".into()));
    }

    #[test]
    fn test_flatten_tuple_pairs() {
        let alts = flatten_alts(&json!([["Flash Fire", 0.61], ["Flame Body", 0.22]]));
        assert_eq!(alts[0].weight(), Some(0.61));
        assert_eq!(alts[1].value(), "Flame Body");
    }

    #[test]
    fn test_flatten_skips_malformed_fragments() {
        let alts = flatten_alts(&json!(["Flash Fire", 42, {"x": 1}, ["Flame Body"]]));
        assert_eq!(alts.len(), 2);
    }

    #[test]
    fn test_flatten_move_slots() {
        let (moves, alts) = flatten_move_slots(&json!([
            "Magma Storm",
            ["Earth Power", "Flamethrower"],
            "Taunt",
        ]));
        assert_eq!(moves, vec!["Magma Storm", "Earth Power", "Taunt"]);
        assert_eq!(alts.len(), 4);
    }

    #[test]
    fn test_parse_stat_table() {
        let table = parse_stat_table(&json!({"hp": 252, "spd": 136, "nonsense": 4}));
        assert_eq!(table.get(0), Some(252));
        assert_eq!(table.get(4), Some(136));
        assert_eq!(table.get(1), None);
    }
}
