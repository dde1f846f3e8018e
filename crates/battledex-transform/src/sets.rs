//! Transformers for vendor set payloads
//!
//! Two shapes share one set parser:
//! - format sets: `{species: {set name: set data}}`, scoped to the format
//!   in the invocation args
//! - generation sets: `{format: {species: {set name: set data}}}`, with the
//!   (generation-stripped) format in the outer key

use crate::args::TransformArgs;
use crate::dedupe::dedupe_presets;
use crate::error::Result;
use crate::flatten::{flatten_alts, flatten_move_slots, parse_stat_table, primary_of};
use crate::patch::patch_signature_moves;
use battledex_core::{Generation, PresetRecord, PresetSource};
use serde_json::Value as Json;
use tracing::debug;

/// Transform a per-format vendor set payload.
///
/// A non-object or empty payload is absent data, not an error.
pub fn format_sets(payload: &Json, args: &TransformArgs) -> Result<Vec<PresetRecord>> {
    let format = args.require_format("format_sets")?;
    let Some(by_species) = payload.as_object().filter(|m| !m.is_empty()) else {
        return Ok(Vec::new());
    };

    let mut records = Vec::new();
    for (species, sets) in by_species {
        collect_species_sets(&mut records, args.gen, format, species, sets);
    }
    patch_signature_moves(&mut records);
    debug!(format, count = records.len(), "transformed format sets");
    Ok(dedupe_presets(records))
}

/// Transform a per-generation vendor set payload.
///
/// Formats in the outer keys arrive generation-stripped; each inner object
/// transforms exactly like a format-sets payload for that format.
pub fn gen_sets(payload: &Json, args: &TransformArgs) -> Result<Vec<PresetRecord>> {
    // Validated args are still required even though the format comes from
    // the payload itself.
    let gen = args.gen;
    let Some(by_format) = payload.as_object().filter(|m| !m.is_empty()) else {
        return Ok(Vec::new());
    };

    let mut records = Vec::new();
    for (format, by_species) in by_format {
        let Some(by_species) = by_species.as_object() else {
            continue;
        };
        for (species, sets) in by_species {
            collect_species_sets(&mut records, gen, format, species, sets);
        }
    }
    patch_signature_moves(&mut records);
    debug!(gen = gen.raw(), count = records.len(), "transformed gen sets");
    Ok(dedupe_presets(records))
}

/// Parse every named set under one species into records
fn collect_species_sets(
    records: &mut Vec<PresetRecord>,
    gen: Generation,
    format: &str,
    species: &str,
    sets: &Json,
) {
    let Some(sets) = sets.as_object() else {
        return;
    };
    for (set_name, set_data) in sets {
        if let Some(record) = parse_set(gen, format, species, set_name, set_data) {
            records.push(record);
        }
    }
}

/// Parse one vendor set object into a record.
///
/// Missing optional fields default; only a non-object set is skipped.
fn parse_set(
    gen: Generation,
    format: &str,
    species: &str,
    set_name: &str,
    data: &Json,
) -> Option<PresetRecord> {
    let data = data.as_object()?;
    let mut record = PresetRecord::new(PresetSource::Vendor, set_name, gen, format, species);

    if let Some(level) = data.get("level").and_then(Json::as_u64) {
        record.level = Some(level.min(100) as u8);
    }
    if let Some(raw) = data.get("ability") {
        record.alt_abilities = flatten_alts(raw);
        record.ability = primary_of(&record.alt_abilities);
    }
    if let Some(raw) = data.get("item") {
        record.alt_items = flatten_alts(raw);
        record.item = primary_of(&record.alt_items);
    }
    if let Some(raw) = data.get("moves") {
        let (moves, alts) = flatten_move_slots(raw);
        record.moves = moves;
        record.alt_moves = alts;
    }
    if let Some(raw) = data.get("teratypes").or_else(|| data.get("teraTypes")) {
        record.alt_tera_types = flatten_alts(raw);
        record.tera_type = primary_of(&record.alt_tera_types);
    }
    if let Some(raw) = data.get("ivs") {
        record.ivs = parse_stat_table(raw);
    }
    if let Some(raw) = data.get("evs") {
        record.evs = parse_stat_table(raw);
    }

    record.recompute_id();
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args() -> TransformArgs {
        TransformArgs::new(9, Some("ou")).unwrap()
    }

    fn heatran_payload() -> Json {
        json!({
            "Heatran": {
                "Defensive Pivot": {
                    "ability": "Flash Fire",
                    "item": ["Leftovers", "Air Balloon"],
                    "moves": ["Magma Storm", ["Earth Power", "Flamethrower"], "Taunt", "Stealth Rock"],
                    "teratypes": ["Grass", "Flying"],
                    "evs": {"hp": 252, "def": 4, "spd": 252},
                },
                "Choice Specs": {
                    "ability": "Flash Fire",
                    "item": "Choice Specs",
                    "moves": ["Eruption", "Magma Storm", "Earth Power", "Flash Cannon"],
                },
            },
        })
    }

    #[test]
    fn test_format_sets_basic() {
        let records = format_sets(&heatran_payload(), &args()).unwrap();
        assert_eq!(records.len(), 2);

        let pivot = records.iter().find(|r| r.name == "Defensive Pivot").unwrap();
        assert_eq!(pivot.species, "Heatran");
        assert_eq!(pivot.format, "ou");
        assert_eq!(pivot.ability.as_deref(), Some("Flash Fire"));
        assert_eq!(pivot.item.as_deref(), Some("Leftovers"));
        assert_eq!(pivot.alt_items.len(), 2);
        assert_eq!(pivot.moves[1], "Earth Power");
        assert_eq!(pivot.alt_moves.len(), 5);
        assert_eq!(pivot.tera_type.as_deref(), Some("Grass"));
        assert_eq!(pivot.evs.get(0), Some(252));
        assert!(pivot.id.is_some());
    }

    #[test]
    fn test_format_sets_absent_data() {
        assert_eq!(format_sets(&json!({}), &args()).unwrap(), vec![]);
        assert_eq!(format_sets(&json!(null), &args()).unwrap(), vec![]);
        assert_eq!(format_sets(&json!([1, 2]), &args()).unwrap(), vec![]);
    }

    #[test]
    fn test_format_sets_requires_format() {
        let args = TransformArgs::new(9, None).unwrap();
        assert!(format_sets(&heatran_payload(), &args).is_err());
    }

    #[test]
    fn test_format_sets_pure() {
        let a = format_sets(&heatran_payload(), &args()).unwrap();
        let b = format_sets(&heatran_payload(), &args()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_gen_sets_takes_format_from_outer_key() {
        let payload = json!({
            "ou": {"Heatran": {"Defensive Pivot": {"ability": "Flash Fire"}}},
            "ubers": {"Heatran": {"Magma Storm Trapper": {"ability": "Flame Body"}}},
        });
        let args = TransformArgs::new(9, None).unwrap();
        let records = gen_sets(&payload, &args).unwrap();
        assert_eq!(records.len(), 2);
        let formats: Vec<_> = records.iter().map(|r| r.format.as_str()).collect();
        assert!(formats.contains(&"ou"));
        assert!(formats.contains(&"ubers"));
    }

    #[test]
    fn test_sets_skip_malformed_set_entries() {
        let payload = json!({
            "Heatran": {
                "Broken": 42,
                "Fine": {"ability": "Flash Fire"},
            },
        });
        let records = format_sets(&payload, &args()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Fine");
    }
}
