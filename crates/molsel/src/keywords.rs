//! Keyword definitions for the RasMol dialect
//!
//! Keywords are zero-argument selections (`protein`, `water`, `helix`, ...)
//! that expand to a fixed atom-groups generator.

use molsel_query::{
    AtomGroups, BooleanExpression, CompareOp, Predicate, Property, QueryExpression,
    SecondaryStructureFlags as SS, SemanticLevel, Value,
};
use phf::phf_map;

use crate::error::ParseErrorKind;
use crate::properties::PropertyDictionary;

/// A RasMol keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    All,
    None,
    Hetero,
    Water,
    Ions,
    Protein,
    Nucleic,
    Dna,
    Rna,
    Backbone,
    Sidechain,
    Hydrogen,
    Helix,
    Sheet,
    Turn,
}

/// Keyword spellings, including aliases
pub static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "all" => Keyword::All,
    "none" => Keyword::None,
    "hetero" => Keyword::Hetero,
    "hetatm" => Keyword::Hetero,
    "water" => Keyword::Water,
    "solvent" => Keyword::Water,
    "ions" => Keyword::Ions,
    "protein" => Keyword::Protein,
    "amino" => Keyword::Protein,
    "nucleic" => Keyword::Nucleic,
    "dna" => Keyword::Dna,
    "rna" => Keyword::Rna,
    "backbone" => Keyword::Backbone,
    "mainchain" => Keyword::Backbone,
    "sidechain" => Keyword::Sidechain,
    "hydrogen" => Keyword::Hydrogen,
    "helix" => Keyword::Helix,
    "sheet" => Keyword::Sheet,
    "turn" => Keyword::Turn,
};

const AMINO_ACIDS: &[&str] = &[
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE", "LEU", "LYS", "MET",
    "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL", // canonical
    "HID", "HIE", "HIP", "HSP", "HSD", "HSE", "CYX", "MSE", "SEC", "PYL",
];

const DNA_NAMES: &[&str] = &["DA", "DC", "DG", "DT", "DI", "DN", "5CM", "8OG"];

const RNA_NAMES: &[&str] = &[
    "A", "C", "G", "U", "I", "N", // standard
    "PSU", "5MC", "OMC", "OMG", "M2G", "5MU", "7MG", "2MG", "H2U", "1MA", "4SU",
];

const WATER_NAMES: &[&str] = &["HOH", "WAT", "H2O", "DOD", "TIP", "TIP3", "SPC", "SOL"];

const ION_NAMES: &[&str] = &[
    "NA", "K", "MG", "CA", "ZN", "FE", "FE2", "CU", "CU1", "MN", "NI", "CO", "CD", "LI", "RB",
    "CS", "BA", "SR", "CL", "BR", "IOD",
];

const BACKBONE_NAMES: &[&str] = &["N", "CA", "C", "O"];

const HYDROGEN_SYMBOLS: &[&str] = &["H", "D"];

/// Look up a keyword by name (case-insensitive)
pub fn lookup(name: &str) -> Option<Keyword> {
    KEYWORDS.get(name.to_ascii_lowercase().as_str()).copied()
}

/// All keyword spellings
pub fn names() -> impl Iterator<Item = &'static str> {
    KEYWORDS.keys().copied()
}

impl Keyword {
    /// Expand the keyword into a query over the dictionary's columns
    pub fn expression(self, dict: &PropertyDictionary) -> Result<QueryExpression, ParseErrorKind> {
        let resn = dict.require("resn")?.property;
        let name = dict.require("name")?.property;
        let structure = dict.require("structure")?.property;

        let residues = |names: &[&str]| Predicate::in_set(resn, values(names));
        let structure_test = |flags: SS| {
            AtomGroups::from_predicates([Predicate::HasAnyFlag {
                property: structure,
                flags,
            }])
        };

        let groups = match self {
            Keyword::All => return Ok(QueryExpression::all()),
            Keyword::None => return Ok(QueryExpression::none()),
            Keyword::Hetero => AtomGroups::from_predicates([Predicate::compare(
                CompareOp::Eq,
                Property::GroupPdb,
                "HETATM",
            )]),
            Keyword::Water => AtomGroups::from_predicates([residues(WATER_NAMES)]),
            Keyword::Ions => AtomGroups::from_predicates([residues(ION_NAMES)]),
            Keyword::Protein => AtomGroups::from_predicates([residues(AMINO_ACIDS)]),
            Keyword::Nucleic => {
                let all: Vec<&str> = DNA_NAMES.iter().chain(RNA_NAMES).copied().collect();
                AtomGroups::from_predicates([residues(all.as_slice())])
            }
            Keyword::Dna => AtomGroups::from_predicates([residues(DNA_NAMES)]),
            Keyword::Rna => AtomGroups::from_predicates([residues(RNA_NAMES)]),
            Keyword::Backbone => AtomGroups::from_predicates([
                residues(AMINO_ACIDS),
                Predicate::in_set(name, values(BACKBONE_NAMES)),
            ]),
            Keyword::Sidechain => AtomGroups::new()
                .with(SemanticLevel::Residue, residues(AMINO_ACIDS))
                .with(
                    SemanticLevel::Atom,
                    BooleanExpression::from(Predicate::in_set(name, values(BACKBONE_NAMES)))
                        .negate(),
                ),
            Keyword::Hydrogen => AtomGroups::from_predicates([Predicate::in_set(
                Property::TypeSymbol,
                values(HYDROGEN_SYMBOLS),
            )]),
            Keyword::Helix => structure_test(SS::HELIX),
            Keyword::Sheet => structure_test(SS::BETA),
            Keyword::Turn => structure_test(SS::TURN),
        };
        Ok(QueryExpression::Generator(groups))
    }
}

fn values(names: &[&str]) -> Vec<Value> {
    names.iter().map(|&n| Value::from(n)).collect()
}
