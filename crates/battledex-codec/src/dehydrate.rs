//! Encoding: preset records to compact opcode strings

use crate::error::{Error, Result};
use crate::opcodes::{
    opcode_of, Field, ALT_DELIMITER, FIELD_DELIMITER, OPCODE_DELIMITER, RECORD_DELIMITER,
    STAT_DELIMITER, WEIGHT_DELIMITER,
};
use battledex_core::{Alt, PresetRecord, StatKind, StatTable};

/// Dehydrate one record into its compact string form.
///
/// Empty fields and stat slots equal to the era default are omitted; the
/// decoder restores them. Values containing a structural delimiter are
/// rejected rather than escaped.
pub fn dehydrate(record: &PresetRecord) -> Result<String> {
    let mut fields: Vec<String> = Vec::new();

    push_field(&mut fields, Field::Species, &record.species)?;
    push_field(&mut fields, Field::Name, &record.name)?;
    push_field(&mut fields, Field::Gen, &record.gen.raw().to_string())?;
    push_field(&mut fields, Field::Format, &record.format)?;
    push_field(&mut fields, Field::Source, &record.source.to_string())?;

    if let Some(level) = record.level {
        push_field(&mut fields, Field::Level, &level.to_string())?;
    }
    if let Some(ability) = &record.ability {
        push_field(&mut fields, Field::Ability, ability)?;
    }
    if !record.alt_abilities.is_empty() {
        push_field(&mut fields, Field::AltAbilities, &encode_alts(&record.alt_abilities)?)?;
    }
    if let Some(item) = &record.item {
        push_field(&mut fields, Field::Item, item)?;
    }
    if !record.alt_items.is_empty() {
        push_field(&mut fields, Field::AltItems, &encode_alts(&record.alt_items)?)?;
    }
    if !record.moves.is_empty() {
        for m in &record.moves {
            guard_list_value("moves", m)?;
        }
        push_field(&mut fields, Field::Moves, &record.moves.join(&ALT_DELIMITER.to_string()))?;
    }
    if !record.alt_moves.is_empty() {
        push_field(&mut fields, Field::AltMoves, &encode_alts(&record.alt_moves)?)?;
    }
    if let Some(tera) = &record.tera_type {
        push_field(&mut fields, Field::TeraType, tera)?;
    }
    if !record.alt_tera_types.is_empty() {
        push_field(&mut fields, Field::AltTeraTypes, &encode_alts(&record.alt_tera_types)?)?;
    }
    if let Some(encoded) = encode_stats(&record.ivs, StatKind::Iv, record) {
        push_field(&mut fields, Field::Ivs, &encoded)?;
    }
    if let Some(encoded) = encode_stats(&record.evs, StatKind::Ev, record) {
        push_field(&mut fields, Field::Evs, &encoded)?;
    }

    Ok(fields.join(&FIELD_DELIMITER.to_string()))
}

/// Dehydrate multiple records, joined by the record delimiter
pub fn dehydrate_all(records: &[PresetRecord]) -> Result<String> {
    let encoded: Result<Vec<String>> = records.iter().map(dehydrate).collect();
    Ok(encoded?.join(&RECORD_DELIMITER.to_string()))
}

fn push_field(fields: &mut Vec<String>, field: Field, value: &str) -> Result<()> {
    guard_value(opcode_of(field), value)?;
    fields.push(format!("{}{}{}", opcode_of(field), OPCODE_DELIMITER, value));
    Ok(())
}

/// Reject values that would break framing.
///
/// The opcode delimiter is excluded: the decoder splits on the first
/// occurrence only, so a `:` inside a value round-trips fine.
fn guard_value(field: &'static str, value: &str) -> Result<()> {
    for delimiter in [FIELD_DELIMITER, RECORD_DELIMITER] {
        if value.contains(delimiter) {
            return Err(Error::DelimiterInValue {
                field,
                value: value.to_string(),
                delimiter,
            });
        }
    }
    Ok(())
}

/// Reject values going into a delimiter-joined list.
///
/// On top of the field framing checks, list entries cannot contain the alt
/// or weight delimiters, or they would split apart on decode.
fn guard_list_value(field: &'static str, value: &str) -> Result<()> {
    guard_value(field, value)?;
    for delimiter in [ALT_DELIMITER, WEIGHT_DELIMITER] {
        if value.contains(delimiter) {
            return Err(Error::DelimiterInValue {
                field,
                value: value.to_string(),
                delimiter,
            });
        }
    }
    Ok(())
}

/// Encode a ranked alt list as `value@weight,value,...`
fn encode_alts(alts: &[Alt]) -> Result<String> {
    let mut parts = Vec::with_capacity(alts.len());
    for alt in alts {
        guard_list_value("alts", alt.value())?;
        match alt.weight() {
            Some(w) => parts.push(format!("{}{}{}", alt.value(), WEIGHT_DELIMITER, w)),
            None => parts.push(alt.value().to_string()),
        }
    }
    Ok(parts.join(&ALT_DELIMITER.to_string()))
}

/// Positional `hp/atk/def/spa/spd/spe` encoding.
///
/// Slots equal to the era default encode as empty; a table whose every slot
/// is the default encodes as nothing at all.
fn encode_stats(table: &StatTable, kind: StatKind, record: &PresetRecord) -> Option<String> {
    let default = kind.default_for(record.gen);
    let filled = table.filled(kind, record.gen);
    if filled.iter().all(|v| *v == default) {
        return None;
    }
    let slots: Vec<String> = filled
        .iter()
        .map(|v| {
            if *v == default {
                String::new()
            } else {
                v.to_string()
            }
        })
        .collect();
    Some(slots.join(&STAT_DELIMITER.to_string()))
}
