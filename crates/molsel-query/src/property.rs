//! Queryable properties
//!
//! The closed set of columns a predicate may read. Dialect dictionaries map
//! their own spellings (`resno`, `resi`, `chain`, ...) onto these variants, so
//! a misspelled target is a compile error rather than a runtime surprise.

use std::fmt;

use crate::level::SemanticLevel;

/// Declared value type of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValueType {
    /// Integral number
    Integer,
    /// Floating-point number
    Number,
    /// Free text
    Text,
    /// Secondary-structure flag set
    Flags,
}

impl ValueType {
    /// Human-readable name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Integer => "integer",
            ValueType::Number => "number",
            ValueType::Text => "string",
            ValueType::Flags => "structure type",
        }
    }

    /// Check if values of this type are numeric
    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Number)
    }
}

/// A molecular property, named after its mmCIF `atom_site` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Property {
    // Chain level
    AuthAsymId,
    LabelAsymId,

    // Residue level
    AuthCompId,
    LabelCompId,
    AuthSeqId,
    LabelSeqId,
    InsCode,
    SecondaryStructureFlags,

    // Atom level
    AuthAtomId,
    LabelAtomId,
    LabelAltId,
    TypeSymbol,
    Id,
    BIsoOrEquiv,
    Occupancy,
    FormalCharge,
    CartnX,
    CartnY,
    CartnZ,
    GroupPdb,
}

impl Property {
    /// Column name as understood by the evaluator
    pub fn name(self) -> &'static str {
        match self {
            Property::AuthAsymId => "auth_asym_id",
            Property::LabelAsymId => "label_asym_id",
            Property::AuthCompId => "auth_comp_id",
            Property::LabelCompId => "label_comp_id",
            Property::AuthSeqId => "auth_seq_id",
            Property::LabelSeqId => "label_seq_id",
            Property::InsCode => "pdbx_PDB_ins_code",
            Property::SecondaryStructureFlags => "secondary_structure_flags",
            Property::AuthAtomId => "auth_atom_id",
            Property::LabelAtomId => "label_atom_id",
            Property::LabelAltId => "label_alt_id",
            Property::TypeSymbol => "type_symbol",
            Property::Id => "id",
            Property::BIsoOrEquiv => "B_iso_or_equiv",
            Property::Occupancy => "occupancy",
            Property::FormalCharge => "pdbx_formal_charge",
            Property::CartnX => "Cartn_x",
            Property::CartnY => "Cartn_y",
            Property::CartnZ => "Cartn_z",
            Property::GroupPdb => "group_PDB",
        }
    }

    /// Level whose test bucket a predicate over this property lands in
    pub fn level(self) -> SemanticLevel {
        match self {
            Property::AuthAsymId | Property::LabelAsymId => SemanticLevel::Chain,

            Property::AuthCompId
            | Property::LabelCompId
            | Property::AuthSeqId
            | Property::LabelSeqId
            | Property::InsCode
            | Property::SecondaryStructureFlags => SemanticLevel::Residue,

            Property::AuthAtomId
            | Property::LabelAtomId
            | Property::LabelAltId
            | Property::TypeSymbol
            | Property::Id
            | Property::BIsoOrEquiv
            | Property::Occupancy
            | Property::FormalCharge
            | Property::CartnX
            | Property::CartnY
            | Property::CartnZ
            | Property::GroupPdb => SemanticLevel::Atom,
        }
    }

    /// Declared value type
    pub fn value_type(self) -> ValueType {
        match self {
            Property::AuthSeqId | Property::LabelSeqId | Property::Id | Property::FormalCharge => {
                ValueType::Integer
            }
            Property::BIsoOrEquiv
            | Property::Occupancy
            | Property::CartnX
            | Property::CartnY
            | Property::CartnZ => ValueType::Number,
            Property::SecondaryStructureFlags => ValueType::Flags,
            _ => ValueType::Text,
        }
    }

    /// Counterpart of an `auth_*` column in the `label_*` scheme
    ///
    /// Properties without a label counterpart are returned unchanged.
    pub fn to_label(self) -> Property {
        match self {
            Property::AuthAsymId => Property::LabelAsymId,
            Property::AuthCompId => Property::LabelCompId,
            Property::AuthSeqId => Property::LabelSeqId,
            Property::AuthAtomId => Property::LabelAtomId,
            other => other,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(Property::AuthAsymId.level(), SemanticLevel::Chain);
        assert_eq!(Property::AuthSeqId.level(), SemanticLevel::Residue);
        assert_eq!(Property::SecondaryStructureFlags.level(), SemanticLevel::Residue);
        assert_eq!(Property::AuthAtomId.level(), SemanticLevel::Atom);
    }

    #[test]
    fn test_value_types() {
        assert_eq!(Property::AuthSeqId.value_type(), ValueType::Integer);
        assert_eq!(Property::BIsoOrEquiv.value_type(), ValueType::Number);
        assert_eq!(Property::AuthCompId.value_type(), ValueType::Text);
        assert!(ValueType::Integer.is_numeric());
        assert!(!ValueType::Flags.is_numeric());
    }

    #[test]
    fn test_label_scheme_keeps_level() {
        for prop in [
            Property::AuthAsymId,
            Property::AuthCompId,
            Property::AuthSeqId,
            Property::AuthAtomId,
        ] {
            let label = prop.to_label();
            assert_ne!(prop, label);
            assert_eq!(prop.level(), label.level());
            assert_eq!(prop.value_type(), label.value_type());
        }
        assert_eq!(Property::Occupancy.to_label(), Property::Occupancy);
    }
}
