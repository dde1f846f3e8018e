//! Corrections for known-bad vendor data
//!
//! The random-variant payloads label the crowned formes with the base
//! forme's signature move; in play the move is transformed. The raw label
//! cannot be trusted, so records are corrected post-hoc by species lookup.

use battledex_core::{to_key, Alt, PresetRecord};
use tracing::debug;

/// Per-species move relabels, keyed by canonical species and wrong move.
const SIGNATURE_MOVE_PATCHES: &[(&str, &str, &str)] = &[
    ("zaciancrowned", "ironhead", "Behemoth Blade"),
    ("zamazentacrowned", "ironhead", "Behemoth Bash"),
];

/// Apply the signature-move override table to freshly-transformed records.
///
/// Matching is by canonical key, so label cosmetics in the payload do not
/// defeat the patch. Both the primary move list and the alt list are
/// rewritten.
pub fn patch_signature_moves(records: &mut [PresetRecord]) {
    for record in records.iter_mut() {
        let species = to_key(&record.species);
        for (patch_species, wrong, correct) in SIGNATURE_MOVE_PATCHES {
            if species != *patch_species {
                continue;
            }
            let mut patched = false;
            for m in record.moves.iter_mut() {
                if to_key(m) == *wrong {
                    *m = correct.to_string();
                    patched = true;
                }
            }
            for alt in record.alt_moves.iter_mut() {
                if to_key(alt.value()) == *wrong {
                    *alt = match alt {
                        Alt::Plain(_) => Alt::Plain(correct.to_string()),
                        Alt::Weighted(_, w) => Alt::Weighted(correct.to_string(), *w),
                    };
                    patched = true;
                }
            }
            if patched {
                debug!(species = %record.species, wrong, correct, "patched mislabeled signature move");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battledex_core::{Generation, PresetSource};

    fn record(species: &str, moves: &[&str]) -> PresetRecord {
        let mut r = PresetRecord::new(
            PresetSource::Vendor,
            "Randoms",
            Generation::new(9).unwrap(),
            "randombattle",
            species,
        );
        r.moves = moves.iter().map(|m| m.to_string()).collect();
        r.alt_moves = moves.iter().map(|m| Alt::Plain(m.to_string())).collect();
        r
    }

    #[test]
    fn test_patch_crowned_signature_moves() {
        let mut records = vec![
            record("Zacian-Crowned", &["Iron Head", "Play Rough"]),
            record("Zamazenta-Crowned", &["Iron Head", "Body Press"]),
        ];
        patch_signature_moves(&mut records);
        assert_eq!(records[0].moves[0], "Behemoth Blade");
        assert_eq!(records[0].alt_moves[0].value(), "Behemoth Blade");
        assert_eq!(records[1].moves[0], "Behemoth Bash");
        // Untouched moves survive.
        assert_eq!(records[0].moves[1], "Play Rough");
    }

    #[test]
    fn test_patch_leaves_other_species_alone() {
        let mut records = vec![record("Bisharp", &["Iron Head"])];
        patch_signature_moves(&mut records);
        assert_eq!(records[0].moves[0], "Iron Head");
    }
}
