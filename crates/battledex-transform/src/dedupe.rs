//! Identity-keyed dedup of transformed records

use battledex_core::{Identity, PresetRecord};
use indexmap::IndexMap;

/// Deduplicate records by identity.
///
/// When two records collide on `id`, the later one in iteration order wins
/// but keeps the earlier record's array position. Records with a null
/// identity cannot be deduplicated and pass through in order.
pub fn dedupe_presets(records: Vec<PresetRecord>) -> Vec<PresetRecord> {
    let mut keyed: IndexMap<Identity, PresetRecord> = IndexMap::new();
    let mut unkeyed: Vec<PresetRecord> = Vec::new();

    for record in records {
        match record.id {
            // insert() on a present key replaces the value in place, which
            // is exactly the earlier-index/later-value rule.
            Some(id) => {
                keyed.insert(id, record);
            }
            None => unkeyed.push(record),
        }
    }

    keyed.into_values().chain(unkeyed).collect()
}
