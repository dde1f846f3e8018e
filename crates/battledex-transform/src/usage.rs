//! Transformer for aggregated usage statistics
//!
//! Usage payloads rank every observed ability/item/move by usage share:
//! `{pokemon: {species: {usage, abilities: {name: share}, ...}}}`. Each
//! species yields a single weighted record whose primary picks are the
//! highest-shared alternatives. Usage queries are always format-scoped.

use crate::args::TransformArgs;
use crate::dedupe::dedupe_presets;
use crate::error::Result;
use crate::flatten::{flatten_alts, primary_of};
use battledex_core::{PresetRecord, PresetSource};
use serde_json::Value as Json;
use tracing::debug;

/// Display name for usage-derived records.
const USAGE_SET_NAME: &str = "Usage Statistics";

/// Number of primary moves picked from the ranked move list.
const MOVE_SLOTS: usize = 4;

/// Transform a per-format usage-statistics payload.
pub fn format_usage(payload: &Json, args: &TransformArgs) -> Result<Vec<PresetRecord>> {
    let format = args.require_format("format_usage")?;
    let Some(by_species) = payload
        .get("pokemon")
        .and_then(Json::as_object)
        .filter(|m| !m.is_empty())
    else {
        return Ok(Vec::new());
    };

    let mut records = Vec::new();
    for (species, stats) in by_species {
        let Some(stats) = stats.as_object() else {
            continue;
        };
        let mut record =
            PresetRecord::new(PresetSource::Usage, USAGE_SET_NAME, args.gen, format, species);

        if let Some(raw) = stats.get("abilities") {
            record.alt_abilities = flatten_alts(raw);
            record.ability = primary_of(&record.alt_abilities);
        }
        if let Some(raw) = stats.get("items") {
            record.alt_items = flatten_alts(raw);
            record.item = primary_of(&record.alt_items);
        }
        if let Some(raw) = stats.get("moves") {
            record.alt_moves = flatten_alts(raw);
            record.moves = record
                .alt_moves
                .iter()
                .take(MOVE_SLOTS)
                .map(|a| a.value().to_string())
                .collect();
        }
        if let Some(raw) = stats.get("teratypes").or_else(|| stats.get("teraTypes")) {
            record.alt_tera_types = flatten_alts(raw);
            record.tera_type = primary_of(&record.alt_tera_types);
        }

        record.recompute_id();
        records.push(record);
    }

    debug!(format, count = records.len(), "transformed usage statistics");
    Ok(dedupe_presets(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args() -> TransformArgs {
        TransformArgs::new(9, Some("ou")).unwrap()
    }

    fn payload() -> Json {
        json!({
            "pokemon": {
                "Heatran": {
                    "usage": 0.21,
                    "abilities": {"Flash Fire": 0.61, "Flame Body": 0.22},
                    "items": {"Leftovers": 0.48, "Air Balloon": 0.31},
                    "moves": {
                        "Magma Storm": 0.88,
                        "Earth Power": 0.74,
                        "Taunt": 0.51,
                        "Stealth Rock": 0.44,
                        "Flash Cannon": 0.12,
                    },
                },
            },
        })
    }

    #[test]
    fn test_format_usage_weighted_primaries() {
        let records = format_usage(&payload(), &args()).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.source, PresetSource::Usage);
        assert_eq!(r.name, USAGE_SET_NAME);
        assert_eq!(r.ability.as_deref(), Some("Flash Fire"));
        assert_eq!(r.item.as_deref(), Some("Leftovers"));
        // Top 4 by usage share.
        assert_eq!(r.moves, vec!["Magma Storm", "Earth Power", "Taunt", "Stealth Rock"]);
        assert_eq!(r.alt_moves.len(), 5);
        assert_eq!(r.alt_abilities[0].weight(), Some(0.61));
    }

    #[test]
    fn test_format_usage_absent_data() {
        assert_eq!(format_usage(&json!({}), &args()).unwrap(), vec![]);
        assert_eq!(format_usage(&json!({"pokemon": {}}), &args()).unwrap(), vec![]);
    }

    #[test]
    fn test_format_usage_requires_format() {
        let args = TransformArgs::new(9, None).unwrap();
        assert!(format_usage(&payload(), &args).is_err());
    }
}
