//! Secondary structure flags
//!
//! Residue-level bitfield tested by `structure` selections.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Secondary structure classification of a residue
    ///
    /// A residue may carry several flags at once (an alpha helix is both
    /// `HELIX` and `ALPHA`). An empty set means "no assigned structure".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SecondaryStructureFlags: u32 {
        /// Any helix
        const HELIX = 0x0001;
        /// Beta strand or sheet
        const BETA = 0x0002;
        /// Bend
        const BEND = 0x0004;
        /// Turn
        const TURN = 0x0008;
        /// Alpha helix
        const ALPHA = 0x0010;
        /// 3-10 helix
        const HELIX_310 = 0x0020;
        /// Pi helix
        const PI = 0x0040;
        /// DNA residue
        const DNA = 0x0100;
        /// RNA residue
        const RNA = 0x0200;
        /// Carbohydrate residue
        const CARBOHYDRATE = 0x0400;
    }
}

const FLAG_NAMES: [(SecondaryStructureFlags, &str); 10] = [
    (SecondaryStructureFlags::HELIX, "helix"),
    (SecondaryStructureFlags::BETA, "beta"),
    (SecondaryStructureFlags::BEND, "bend"),
    (SecondaryStructureFlags::TURN, "turn"),
    (SecondaryStructureFlags::ALPHA, "alpha"),
    (SecondaryStructureFlags::HELIX_310, "3-10"),
    (SecondaryStructureFlags::PI, "pi"),
    (SecondaryStructureFlags::DNA, "dna"),
    (SecondaryStructureFlags::RNA, "rna"),
    (SecondaryStructureFlags::CARBOHYDRATE, "carbohydrate"),
];

impl SecondaryStructureFlags {
    /// Check if any helix flag is set
    #[inline]
    pub fn is_helix(&self) -> bool {
        self.intersects(
            SecondaryStructureFlags::HELIX
                | SecondaryStructureFlags::ALPHA
                | SecondaryStructureFlags::HELIX_310
                | SecondaryStructureFlags::PI,
        )
    }

    /// Names of the set flags, in declaration order
    pub fn names(&self) -> Vec<&'static str> {
        FLAG_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl fmt::Display for SecondaryStructureFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        write!(f, "{}", self.names().join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helix_classification() {
        assert!(SecondaryStructureFlags::HELIX.is_helix());
        assert!((SecondaryStructureFlags::HELIX | SecondaryStructureFlags::PI).is_helix());
        assert!(!SecondaryStructureFlags::BETA.is_helix());
        assert!(!SecondaryStructureFlags::empty().is_helix());
    }

    #[test]
    fn test_display() {
        assert_eq!(SecondaryStructureFlags::empty().to_string(), "none");
        assert_eq!(SecondaryStructureFlags::TURN.to_string(), "turn");
        assert_eq!(
            (SecondaryStructureFlags::HELIX | SecondaryStructureFlags::ALPHA).to_string(),
            "helix|alpha"
        );
    }
}
