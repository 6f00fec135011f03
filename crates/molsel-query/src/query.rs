//! Query expressions
//!
//! The transpiler's output: atom-group generators holding one optional test
//! per semantic level, combined by set operations.

use std::fmt;

use crate::level::SemanticLevel;
use crate::predicate::{BooleanExpression, Predicate};

/// Atom-group generator
///
/// An atom is selected when every present test passes for its chain, its
/// residue and the atom itself. A generator with no tests selects all atoms.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtomGroups {
    pub atom_test: Option<BooleanExpression>,
    pub residue_test: Option<BooleanExpression>,
    pub chain_test: Option<BooleanExpression>,
}

impl AtomGroups {
    /// Generator with all buckets empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a generator from predicates, AND-folding them per level
    pub fn from_predicates(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut buckets: [Vec<BooleanExpression>; 3] = Default::default();
        for p in predicates {
            buckets[slot(p.level())].push(p.into());
        }

        let mut groups = AtomGroups::new();
        for (level, tests) in SemanticLevel::ALL.into_iter().zip(buckets) {
            groups.set(level, BooleanExpression::all(tests));
        }
        groups
    }

    /// Test for a level
    pub fn get(&self, level: SemanticLevel) -> Option<&BooleanExpression> {
        match level {
            SemanticLevel::Atom => self.atom_test.as_ref(),
            SemanticLevel::Residue => self.residue_test.as_ref(),
            SemanticLevel::Chain => self.chain_test.as_ref(),
        }
    }

    /// Replace the test for a level
    pub fn set(&mut self, level: SemanticLevel, test: Option<BooleanExpression>) {
        match level {
            SemanticLevel::Atom => self.atom_test = test,
            SemanticLevel::Residue => self.residue_test = test,
            SemanticLevel::Chain => self.chain_test = test,
        }
    }

    /// Builder-style variant of [`AtomGroups::set`]
    pub fn with(mut self, level: SemanticLevel, test: impl Into<BooleanExpression>) -> Self {
        self.set(level, Some(test.into()));
        self
    }

    /// Check if no bucket holds a test
    pub fn is_empty(&self) -> bool {
        SemanticLevel::ALL.iter().all(|l| self.get(*l).is_none())
    }

    /// Levels that hold a test, in bucket order
    pub fn levels(&self) -> impl Iterator<Item = SemanticLevel> + '_ {
        SemanticLevel::ALL
            .into_iter()
            .filter(move |l| self.get(*l).is_some())
    }
}

fn slot(level: SemanticLevel) -> usize {
    match level {
        SemanticLevel::Atom => 0,
        SemanticLevel::Residue => 1,
        SemanticLevel::Chain => 2,
    }
}

impl fmt::Display for AtomGroups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(atom-groups")?;
        for level in SemanticLevel::ALL {
            if let Some(test) = self.get(level) {
                write!(f, " :{} {}", level.test_name(), test)?;
            }
        }
        write!(f, ")")
    }
}

/// A selection query
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueryExpression {
    /// Atom-group generator
    Generator(AtomGroups),
    /// Atoms selected by every operand
    Intersect(Vec<QueryExpression>),
    /// Atoms selected by any operand
    Union(Vec<QueryExpression>),
    /// Atoms not selected by the operand
    Complement(Box<QueryExpression>),
}

impl QueryExpression {
    /// Query selecting every atom
    pub fn all() -> Self {
        QueryExpression::Generator(AtomGroups::new())
    }

    /// Query selecting no atom
    pub fn none() -> Self {
        QueryExpression::Complement(Box::new(QueryExpression::all()))
    }

    /// Intersection of `items`, flattening nested intersections
    ///
    /// A single operand is returned as-is; an empty list yields [`QueryExpression::all`].
    pub fn intersect(items: impl IntoIterator<Item = QueryExpression>) -> Self {
        let mut flat = Vec::new();
        for item in items {
            match item {
                QueryExpression::Intersect(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => QueryExpression::all(),
            1 => flat.swap_remove(0),
            _ => QueryExpression::Intersect(flat),
        }
    }

    /// Union of `items`, flattening nested unions
    ///
    /// A single operand is returned as-is; an empty list yields [`QueryExpression::none`].
    pub fn union(items: impl IntoIterator<Item = QueryExpression>) -> Self {
        let mut flat = Vec::new();
        for item in items {
            match item {
                QueryExpression::Union(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => QueryExpression::none(),
            1 => flat.swap_remove(0),
            _ => QueryExpression::Union(flat),
        }
    }

    /// Complement of `self`
    pub fn complement(self) -> Self {
        QueryExpression::Complement(Box::new(self))
    }

    /// Generator of a leaf query
    pub fn as_generator(&self) -> Option<&AtomGroups> {
        match self {
            QueryExpression::Generator(g) => Some(g),
            _ => None,
        }
    }
}

impl From<AtomGroups> for QueryExpression {
    fn from(groups: AtomGroups) -> Self {
        QueryExpression::Generator(groups)
    }
}

impl fmt::Display for QueryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryExpression::Generator(g) => write!(f, "{}", g),
            QueryExpression::Intersect(items) | QueryExpression::Union(items) => {
                let name = if matches!(self, QueryExpression::Intersect(_)) {
                    "intersect"
                } else {
                    "union"
                };
                write!(f, "({}", name)?;
                for item in items {
                    write!(f, " {}", item)?;
                }
                write!(f, ")")
            }
            QueryExpression::Complement(inner) => write!(f, "(complement {})", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::CompareOp;
    use crate::property::Property;
    use crate::value::Value;

    fn chain(id: &str) -> QueryExpression {
        AtomGroups::from_predicates([Predicate::compare(
            CompareOp::Eq,
            Property::AuthAsymId,
            id,
        )])
        .into()
    }

    #[test]
    fn test_from_predicates_groups_by_level() {
        let groups = AtomGroups::from_predicates([
            Predicate::compare(CompareOp::Eq, Property::AuthAtomId, "CA"),
            Predicate::compare(CompareOp::Eq, Property::AuthAsymId, "A"),
            Predicate::compare(CompareOp::Eq, Property::AuthAtomId, "CB"),
        ]);

        assert!(groups.residue_test.is_none());
        assert!(groups.chain_test.is_some());
        assert!(matches!(groups.atom_test, Some(BooleanExpression::And(ref v)) if v.len() == 2));
        assert_eq!(
            groups.levels().collect::<Vec<_>>(),
            vec![SemanticLevel::Atom, SemanticLevel::Chain]
        );
    }

    #[test]
    fn test_empty_generator_matches_all() {
        let groups = AtomGroups::from_predicates(Vec::new());
        assert!(groups.is_empty());
        assert_eq!(QueryExpression::from(groups), QueryExpression::all());
        assert_eq!(QueryExpression::all().to_string(), "(atom-groups)");
    }

    #[test]
    fn test_set_operations_flatten() {
        let a = chain("A");
        let b = chain("B");
        let c = chain("C");

        let nested = QueryExpression::union([QueryExpression::union([a.clone(), b.clone()]), c.clone()]);
        assert_eq!(nested, QueryExpression::Union(vec![a.clone(), b.clone(), c.clone()]));

        let single = QueryExpression::intersect([a.clone()]);
        assert_eq!(single, a);

        let mixed = QueryExpression::intersect([QueryExpression::union([a.clone(), b.clone()]), c]);
        assert!(matches!(mixed, QueryExpression::Intersect(ref v) if v.len() == 2));
    }

    #[test]
    fn test_display() {
        let q = QueryExpression::intersect([chain("A"), QueryExpression::none()]);
        assert_eq!(
            q.to_string(),
            "(intersect (atom-groups :chain-test (= auth_asym_id \"A\")) (complement (atom-groups)))"
        );

        let groups = AtomGroups::new().with(
            SemanticLevel::Residue,
            Predicate::compare(CompareOp::Ge, Property::AuthSeqId, Value::Number(10.0)),
        );
        assert_eq!(
            groups.to_string(),
            "(atom-groups :residue-test (>= auth_seq_id 10))"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let q = QueryExpression::union([chain("A"), chain("B").complement()]);
        let json = serde_json::to_string(&q).unwrap();
        let back: QueryExpression = serde_json::from_str(&json).unwrap();
        assert_eq!(q, back);
    }
}
