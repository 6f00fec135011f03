//! Semantic levels
//!
//! Every property, and therefore every test built from it, applies at one
//! granularity of the molecular hierarchy.

use std::fmt;

/// Granularity at which a test is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SemanticLevel {
    /// Per-atom test (atom name, element, coordinates, ...)
    Atom,
    /// Per-residue test (residue name, number, secondary structure, ...)
    Residue,
    /// Per-chain test (chain identifier)
    Chain,
}

impl SemanticLevel {
    /// All levels, in the order their tests appear in a generator
    pub const ALL: [SemanticLevel; 3] = [
        SemanticLevel::Atom,
        SemanticLevel::Residue,
        SemanticLevel::Chain,
    ];

    /// Name of the generator bucket holding this level's test
    pub fn test_name(self) -> &'static str {
        match self {
            SemanticLevel::Atom => "atom-test",
            SemanticLevel::Residue => "residue-test",
            SemanticLevel::Chain => "chain-test",
        }
    }
}

impl fmt::Display for SemanticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticLevel::Atom => write!(f, "atom"),
            SemanticLevel::Residue => write!(f, "residue"),
            SemanticLevel::Chain => write!(f, "chain"),
        }
    }
}
