//! Molecular Selection Language Transpiler
//!
//! Translates selection strings written in legacy molecular-viewer languages
//! into the structured query expressions defined by [`molsel_query`]. Nothing
//! is evaluated here; the output is handed to whatever engine walks the
//! structure.
//!
//! # Overview
//!
//! The RasMol dialect supports:
//! - Comparisons: `resno >= 10`, `10 <= resno`, `name like "C.*"`
//! - Property clauses with ranges and lists: `resno 1-5,10`, `structure helix,sheet`
//! - Keywords: `protein`, `water`, `backbone`, `helix`, ...
//! - Macro shorthand: `ALA:A.CA`, `:A`, `*.CA`, `::CA`
//! - Atom expressions: `10-20:A`, `100^B:A.CA%B`
//! - Logical operators: `and`/`&`, `or`/`|`, `not`/`!` and parentheses
//!
//! # Example
//!
//! ```rust
//! use molsel::{transpile, Dialect, DialectKind, SemanticLevel};
//!
//! let dialect = Dialect::get(DialectKind::RasMol);
//! let query = transpile(dialect, "ALA:A.CA").unwrap();
//!
//! let groups = query.as_generator().unwrap();
//! assert!(groups.get(SemanticLevel::Residue).is_some());
//! assert!(groups.get(SemanticLevel::Chain).is_some());
//! assert!(groups.get(SemanticLevel::Atom).is_some());
//! ```
//!
//! Dialects with non-default options are built once and reused:
//!
//! ```rust
//! use molsel::{Dialect, DialectKind, IdentifierScheme, TranspileOptions};
//!
//! let options = TranspileOptions::default().with_identifier_scheme(IdentifierScheme::Label);
//! let dialect = Dialect::new(DialectKind::RasMol, options);
//! let query = dialect.transpile("chain A").unwrap();
//! assert_eq!(query.to_string(), "(atom-groups :chain-test (in-set label_asym_id \"A\"))");
//! ```

mod dialect;
mod error;
mod keywords;
mod lexer;
mod macros;
mod operators;
mod parser;
mod properties;
mod structure;
mod value;

pub use dialect::{Dialect, DialectKind, IdentifierScheme, TranspileOptions};
pub use error::{ParseError, ParseErrorKind, ParseResult, UnknownDialect};
pub use keywords::Keyword;
pub use macros::{FieldValue, SelectionRecord};
pub use properties::{PropertyDescriptor, PropertyDictionary, PropertyRule, ReservedWords, TokenClass};

// Re-export the output model for convenience
pub use molsel_query::{
    AtomGroups, BooleanExpression, CompareOp, Predicate, Property, QueryExpression, RegexLiteral,
    SecondaryStructureFlags, SemanticLevel, Value, ValueType,
};

/// Transpile a selection string into a query expression
///
/// # Arguments
/// * `dialect` - The selection language to read `text` in
/// * `text` - The selection string
///
/// # Returns
/// * `Ok(QueryExpression)` - The query; the whole input was consumed
/// * `Err(ParseError)` - The first syntax error or semantic rejection
pub fn transpile(dialect: &Dialect, text: &str) -> ParseResult<QueryExpression> {
    dialect.transpile(text)
}

/// Look up a secondary-structure kind by its Jmol name (case-insensitive)
pub fn structure_kind(name: &str) -> Option<SecondaryStructureFlags> {
    structure::lookup(name)
}

/// Look up a keyword by name (case-insensitive)
pub fn keyword(name: &str) -> Option<Keyword> {
    keywords::lookup(name)
}

pub mod prelude {
    pub use crate::{transpile, Dialect, DialectKind, ParseError, ParseErrorKind, TranspileOptions};
    pub use molsel_query::{AtomGroups, BooleanExpression, Predicate, QueryExpression};
}
