//! Molecular Selection Query Expressions
//!
//! This crate defines the engine-agnostic expression tree produced by the
//! `molsel` transpiler and consumed by a structure-query evaluator:
//!
//! - [`Value`] - Literal values (numbers and strings)
//! - [`Property`] - Closed set of atom/residue/chain properties a test may read
//! - [`SemanticLevel`] - Granularity (atom, residue, chain) a test applies to
//! - [`Predicate`] - Comparisons, range and set-membership tests
//! - [`BooleanExpression`] - `and`/`or`/`not` trees over predicates
//! - [`QueryExpression`] - Atom-group generators and their set combinators
//!
//! # Architecture
//!
//! A query is a tree of generators. Each generator ([`AtomGroups`]) holds at
//! most one boolean test per semantic level; the evaluator keeps an atom when
//! its chain, residue and atom tests all pass. Generators are combined with
//! intersection, union and complement nodes.
//!
//! # Example
//!
//! ```rust
//! use molsel_query::{AtomGroups, BooleanExpression, CompareOp, Predicate, Property, QueryExpression, Value};
//!
//! let test = Predicate::compare(CompareOp::Ge, Property::AuthSeqId, Value::Number(10.0));
//! let query = QueryExpression::Generator(AtomGroups::from_predicates([test]));
//!
//! assert_eq!(
//!     query.to_string(),
//!     "(atom-groups :residue-test (>= auth_seq_id 10))"
//! );
//! ```

mod flags;
mod level;
mod predicate;
mod property;
mod query;
mod value;

pub use flags::SecondaryStructureFlags;
pub use level::SemanticLevel;
pub use predicate::{BooleanExpression, CompareOp, Predicate, RegexLiteral};
pub use property::{Property, ValueType};
pub use query::{AtomGroups, QueryExpression};
pub use value::Value;
