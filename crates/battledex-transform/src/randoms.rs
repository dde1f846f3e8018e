//! Transformers for random-variant payloads
//!
//! Random battles pin levels and draw from role-grouped movepools:
//! `{species: {level, abilities, items, moves, roles: {role: {...}}}}`.
//! Each role yields one record named after the role; species without roles
//! yield a single record from the top-level pools. The usage variant
//! carries the same structure with `{name: share}` maps instead of arrays.

use crate::args::TransformArgs;
use crate::dedupe::dedupe_presets;
use crate::error::Result;
use crate::flatten::{flatten_alts, primary_of};
use crate::patch::patch_signature_moves;
use battledex_core::{Generation, PresetRecord, PresetSource};
use serde_json::Value as Json;
use tracing::debug;

/// Format key the random datasets are published under.
const RANDOMS_FORMAT: &str = "randombattle";

/// Set name used when a species has no role grouping.
const DEFAULT_ROLE: &str = "Randoms";

/// Transform a per-generation random-variant set payload.
pub fn randoms_sets(payload: &Json, args: &TransformArgs) -> Result<Vec<PresetRecord>> {
    transform_randoms(payload, args, PresetSource::Vendor, "randoms sets")
}

/// Transform a per-generation random-variant usage payload.
///
/// Same shape as [`randoms_sets`], but pools arrive as weighted maps and
/// records are tagged as usage-derived.
pub fn randoms_usage(payload: &Json, args: &TransformArgs) -> Result<Vec<PresetRecord>> {
    transform_randoms(payload, args, PresetSource::Usage, "randoms usage")
}

fn transform_randoms(
    payload: &Json,
    args: &TransformArgs,
    source: PresetSource,
    what: &'static str,
) -> Result<Vec<PresetRecord>> {
    let gen = args.gen;
    let Some(by_species) = payload.as_object().filter(|m| !m.is_empty()) else {
        return Ok(Vec::new());
    };

    let mut records = Vec::new();
    for (species, data) in by_species {
        let Some(data) = data.as_object() else {
            continue;
        };
        let level = data
            .get("level")
            .and_then(Json::as_u64)
            .map(|l| l.min(100) as u8);

        let roles = data.get("roles").and_then(Json::as_object);
        match roles.filter(|r| !r.is_empty()) {
            Some(roles) => {
                for (role, pools) in roles {
                    if let Some(pools) = pools.as_object() {
                        let mut record = pools_to_record(gen, source, role, species, pools);
                        record.level = level;
                        record.recompute_id();
                        records.push(record);
                    }
                }
            }
            None => {
                let mut record = pools_to_record(gen, source, DEFAULT_ROLE, species, data);
                record.level = level;
                record.recompute_id();
                records.push(record);
            }
        }
    }

    patch_signature_moves(&mut records);
    debug!(gen = gen.raw(), count = records.len(), "transformed {what}");
    Ok(dedupe_presets(records))
}

/// Build a record from one pool object (role-level or species-level)
fn pools_to_record(
    gen: Generation,
    source: PresetSource,
    name: &str,
    species: &str,
    pools: &serde_json::Map<String, Json>,
) -> PresetRecord {
    let mut record = PresetRecord::new(source, name, gen, RANDOMS_FORMAT, species);

    if let Some(raw) = pools.get("abilities") {
        record.alt_abilities = flatten_alts(raw);
        record.ability = primary_of(&record.alt_abilities);
    }
    if let Some(raw) = pools.get("items") {
        record.alt_items = flatten_alts(raw);
        record.item = primary_of(&record.alt_items);
    }
    if let Some(raw) = pools.get("moves") {
        // Randoms movepools are flat pools, not slot lists; every entry is
        // an alternative and the first four are the representative picks.
        record.alt_moves = flatten_alts(raw);
        record.moves = record
            .alt_moves
            .iter()
            .take(4)
            .map(|a| a.value().to_string())
            .collect();
    }
    if let Some(raw) = pools.get("teratypes").or_else(|| pools.get("teraTypes")) {
        record.alt_tera_types = flatten_alts(raw);
        record.tera_type = primary_of(&record.alt_tera_types);
    }

    record
}
