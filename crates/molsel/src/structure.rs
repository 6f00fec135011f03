//! Secondary structure names
//!
//! Jmol-style structure names and numeric codes accepted by `structure`
//! comparisons and lists.

use molsel_query::{SecondaryStructureFlags as SS, Value};

use crate::error::ParseErrorKind;

static STRUCTURE_NAMES: phf::Map<&'static str, u32> = phf::phf_map! {
    "none" => 0,
    "turn" => SS::TURN.bits(),
    "sheet" => SS::BETA.bits(),
    "beta" => SS::BETA.bits(),
    "helix" => SS::HELIX.bits(),
    "dna" => SS::DNA.bits(),
    "rna" => SS::RNA.bits(),
    "carbohydrate" => SS::CARBOHYDRATE.bits(),
    "helix310" => SS::HELIX.bits() | SS::HELIX_310.bits(),
    "helixalpha" => SS::HELIX.bits() | SS::ALPHA.bits(),
    "helixpi" => SS::HELIX.bits() | SS::PI.bits(),
    "bend" => SS::BEND.bits(),
};

/// Structure names in Jmol numeric-code order
const STRUCTURE_CODES: [&str; 10] = [
    "none",
    "turn",
    "sheet",
    "helix",
    "dna",
    "rna",
    "carbohydrate",
    "helix310",
    "helixalpha",
    "helixpi",
];

/// Flags for a structure name, case-insensitive
pub fn lookup(name: &str) -> Option<SS> {
    STRUCTURE_NAMES
        .get(name.to_ascii_lowercase().as_str())
        .map(|&bits| SS::from_bits_truncate(bits))
}

/// Flags for a structure literal (name or numeric code)
pub(crate) fn structure_flags(value: &Value) -> Result<SS, ParseErrorKind> {
    let name = match value {
        Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 => {
            STRUCTURE_CODES.get(*n as usize).copied()
        }
        Value::Number(_) => None,
        Value::String(s) => Some(s.as_str()),
    };
    name.and_then(lookup).ok_or_else(|| {
        ParseErrorKind::type_mismatch("structure", "structure type", value.to_text())
    })
}
