//! The versioned opcode dictionary
//!
//! The forward (field to opcode) table is the single source of truth; the
//! reverse map is derived from it mechanically so the two directions cannot
//! drift. The table is append-only: opcodes are never reused or renamed,
//! which is what keeps old dehydrated strings decodable.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Separates an opcode from its value.
pub const OPCODE_DELIMITER: char = ':';
/// Separates fields within one record.
pub const FIELD_DELIMITER: char = '|';
/// Separates records within one export string.
pub const RECORD_DELIMITER: char = ';';
/// Separates entries of a ranked-alternative list.
pub const ALT_DELIMITER: char = ',';
/// Attaches a usage weight to an alternative value.
pub const WEIGHT_DELIMITER: char = '@';
/// Separates the positional slots of a stat table.
pub const STAT_DELIMITER: char = '/';

/// Encodable fields of a preset record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Source,
    Name,
    Gen,
    Format,
    Species,
    Level,
    Ability,
    AltAbilities,
    Item,
    AltItems,
    Moves,
    AltMoves,
    TeraType,
    AltTeraTypes,
    Ivs,
    Evs,
}

/// Forward opcode table, append-only.
///
/// New fields get new 3-letter opcodes at the end; existing entries are
/// frozen.
pub(crate) const OPCODES: &[(Field, &str)] = &[
    (Field::Source, "SRC"),
    (Field::Name, "NME"),
    (Field::Gen, "GEN"),
    (Field::Format, "FMT"),
    (Field::Species, "SPC"),
    (Field::Level, "LVL"),
    (Field::Ability, "ABL"),
    (Field::AltAbilities, "ABA"),
    (Field::Item, "ITM"),
    (Field::AltItems, "ITA"),
    (Field::Moves, "MOV"),
    (Field::AltMoves, "MVA"),
    (Field::TeraType, "TER"),
    (Field::AltTeraTypes, "TRA"),
    (Field::Ivs, "IVS"),
    (Field::Evs, "EVS"),
];

/// Reverse (opcode to field) map, derived mechanically from [`OPCODES`].
///
/// Construction asserts opcode uniqueness: a collision is a programming
/// error in the table and fails fast rather than silently overwriting.
pub(crate) static REVERSE: LazyLock<HashMap<&'static str, Field>> = LazyLock::new(|| {
    let mut map = HashMap::with_capacity(OPCODES.len());
    for (field, opcode) in OPCODES {
        assert_eq!(opcode.len(), 3, "opcode {opcode:?} is not 3 letters");
        let prev = map.insert(*opcode, *field);
        assert!(prev.is_none(), "duplicate opcode {opcode:?}");
    }
    map
});

/// Look up a field's opcode
pub(crate) fn opcode_of(field: Field) -> &'static str {
    // The table is small enough that a linear scan beats a second map.
    OPCODES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, op)| *op)
        .unwrap_or_else(|| unreachable!("field {field:?} missing from opcode table"))
}
