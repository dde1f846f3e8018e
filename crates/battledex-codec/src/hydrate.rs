//! Decoding: compact opcode strings back to preset records
//!
//! Decoding is tolerant by design. Unknown opcodes are skipped (they may be
//! from a newer dictionary version), as are fragments that fail to parse.
//! A minimum-shape gate decides whether the string as a whole is accepted:
//! the species opcode must be present, the generation must parse, and at
//! least [`MIN_FIELDS`] fragments must decode.

use crate::opcodes::{
    Field, REVERSE, ALT_DELIMITER, FIELD_DELIMITER, OPCODE_DELIMITER, RECORD_DELIMITER,
    STAT_DELIMITER, WEIGHT_DELIMITER,
};
use battledex_core::{Alt, Generation, PresetRecord, PresetSource, StatKind, StatTable};
use tracing::debug;

/// Minimum decoded fragments for a string to be accepted.
const MIN_FIELDS: usize = 4;

/// Hydrate one record from its compact string form.
///
/// Returns `None` when the string fails the minimum-shape gate. On
/// acceptance the id is recomputed from the hydrated fields, and both stat
/// tables are completed with era defaults, so hydration is equivalent to
/// transforming from the dehydrated source.
pub fn hydrate(encoded: &str) -> Option<PresetRecord> {
    let mut species: Option<String> = None;
    let mut gen: Option<Generation> = None;
    let mut decoded: Vec<(Field, String)> = Vec::new();

    for fragment in encoded.split(FIELD_DELIMITER) {
        let Some((opcode, value)) = fragment.split_once(OPCODE_DELIMITER) else {
            debug!(fragment, "skipping malformed fragment");
            continue;
        };
        let Some(field) = REVERSE.get(opcode) else {
            debug!(opcode, "skipping unknown opcode");
            continue;
        };
        match field {
            Field::Species => species = Some(value.to_string()),
            Field::Gen => gen = value.parse::<u8>().ok().and_then(|n| Generation::new(n).ok()),
            _ => {}
        }
        decoded.push((*field, value.to_string()));
    }

    // Minimum-shape gate.
    let species = species?;
    let gen = gen?;
    if decoded.len() < MIN_FIELDS {
        return None;
    }

    let mut record = PresetRecord::new(PresetSource::Vendor, "", gen, "", species);
    for (field, value) in decoded {
        apply_field(&mut record, field, &value);
    }

    // Primary picks fall back to the top-ranked alternative, the same
    // derivation a transformer applies.
    if record.ability.is_none() {
        record.ability = record.alt_abilities.first().map(|a| a.value().to_string());
    }
    if record.item.is_none() {
        record.item = record.alt_items.first().map(|a| a.value().to_string());
    }
    if record.tera_type.is_none() {
        record.tera_type = record.alt_tera_types.first().map(|a| a.value().to_string());
    }

    // Complete the tables: every slot concrete after hydration.
    record.ivs = StatTable::full(record.ivs.filled(StatKind::Iv, gen));
    record.evs = StatTable::full(record.evs.filled(StatKind::Ev, gen));

    record.recompute_id();
    Some(record)
}

/// Hydrate every record of a multi-record export string.
///
/// Rejected records are dropped, not fatal to the batch.
pub fn hydrate_all(encoded: &str) -> Vec<PresetRecord> {
    encoded
        .split(RECORD_DELIMITER)
        .filter(|s| !s.trim().is_empty())
        .filter_map(hydrate)
        .collect()
}

fn apply_field(record: &mut PresetRecord, field: Field, value: &str) {
    match field {
        Field::Source => {
            record.source = match value {
                "user" => PresetSource::User,
                "usage" => PresetSource::Usage,
                _ => PresetSource::Vendor,
            };
        }
        Field::Name => record.name = value.to_string(),
        Field::Format => record.format = value.to_string(),
        // Species and gen were consumed by the shape gate.
        Field::Species | Field::Gen => {}
        Field::Level => record.level = value.parse().ok(),
        Field::Ability => record.ability = Some(value.to_string()),
        Field::AltAbilities => record.alt_abilities = decode_alts(value),
        Field::Item => record.item = Some(value.to_string()),
        Field::AltItems => record.alt_items = decode_alts(value),
        Field::Moves => {
            record.moves = value
                .split(ALT_DELIMITER)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
        }
        Field::AltMoves => record.alt_moves = decode_alts(value),
        Field::TeraType => record.tera_type = Some(value.to_string()),
        Field::AltTeraTypes => record.alt_tera_types = decode_alts(value),
        Field::Ivs => record.ivs = decode_stats(value),
        Field::Evs => record.evs = decode_stats(value),
    }
}

/// Decode `value@weight,value,...`; malformed weights degrade to plain
fn decode_alts(value: &str) -> Vec<Alt> {
    value
        .split(ALT_DELIMITER)
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once(WEIGHT_DELIMITER) {
            Some((v, w)) => match w.parse::<f64>() {
                Ok(w) => Alt::Weighted(v.to_string(), w),
                Err(_) => Alt::Plain(v.to_string()),
            },
            None => Alt::Plain(part.to_string()),
        })
        .collect()
}

/// Decode positional `hp/atk/def/spa/spd/spe`; empty or unparseable slots
/// stay unspecified and take the era default at completion
fn decode_stats(value: &str) -> StatTable {
    let mut table = StatTable::default();
    for (slot, part) in value.split(STAT_DELIMITER).take(6).enumerate() {
        if let Ok(v) = part.parse::<u16>() {
            table.set(slot, v);
        }
    }
    table
}
