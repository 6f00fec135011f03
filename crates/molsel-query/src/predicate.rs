//! Predicates and boolean test trees
//!
//! Predicates are the leaves of a level test: comparisons between properties
//! and literals, range and set-membership tests, regex matches and flag tests.
//! [`BooleanExpression`] combines them with `and`, `or` and `not`.

use std::fmt;

use crate::flags::SecondaryStructureFlags;
use crate::level::SemanticLevel;
use crate::property::Property;
use crate::value::Value;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CompareOp {
    /// Equal to
    Eq,
    /// Not equal to
    Ne,
    /// Greater than
    Gt,
    /// Less than
    Lt,
    /// Greater than or equal to
    Ge,
    /// Less than or equal to
    Le,
    /// Regex match; the left operand is the pattern, the right the subject
    /// (read as a string)
    Match,
}

impl CompareOp {
    /// Operator to use when the operands are swapped
    ///
    /// `10 <= resno` and `resno >= 10` describe the same test.
    pub fn mirror(self) -> CompareOp {
        match self {
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Ge => CompareOp::Le,
            CompareOp::Le => CompareOp::Ge,
            other => other,
        }
    }

    /// Operator symbol
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
            CompareOp::Match => "match",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A regular expression literal
///
/// Patterns built from selection text are anchored (`^...$`); `flags` holds
/// JavaScript-style flag letters (`"i"` for case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegexLiteral {
    pub pattern: String,
    pub flags: String,
}

impl RegexLiteral {
    /// Create a regex literal
    pub fn new(pattern: impl Into<String>, flags: impl Into<String>) -> Self {
        RegexLiteral {
            pattern: pattern.into(),
            flags: flags.into(),
        }
    }

    /// Anchor `body` so that it must match the whole subject
    pub fn anchored(body: &str, case_insensitive: bool) -> Self {
        RegexLiteral::new(
            format!("^{}$", body),
            if case_insensitive { "i" } else { "" },
        )
    }

    /// Check if the `i` flag is set
    pub fn is_case_insensitive(&self) -> bool {
        self.flags.contains('i')
    }
}

impl fmt::Display for RegexLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.pattern, self.flags)
    }
}

/// A value expression
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Predicate {
    /// Literal value
    Literal(Value),

    /// Reference to a property of the tested atom/residue/chain
    Property(Property),

    /// Regular expression literal
    Regex(RegexLiteral),

    /// Binary comparison
    Comparison {
        op: CompareOp,
        lhs: Box<Predicate>,
        rhs: Box<Predicate>,
    },

    /// Inclusive range test
    InRange {
        property: Property,
        low: Value,
        high: Value,
    },

    /// Set-membership test
    InSet { property: Property, values: Vec<Value> },

    /// True when the property shares at least one flag with `flags`
    ///
    /// An empty flag set selects residues without assigned structure.
    HasAnyFlag {
        property: Property,
        flags: SecondaryStructureFlags,
    },
}

impl Predicate {
    /// `property <op> value`
    pub fn compare(op: CompareOp, property: Property, value: impl Into<Value>) -> Self {
        Predicate::Comparison {
            op,
            lhs: Box::new(Predicate::Property(property)),
            rhs: Box::new(Predicate::Literal(value.into())),
        }
    }

    /// Regex match of `pattern` against `subject`
    pub fn regex_match(pattern: RegexLiteral, subject: Predicate) -> Self {
        Predicate::Comparison {
            op: CompareOp::Match,
            lhs: Box::new(Predicate::Regex(pattern)),
            rhs: Box::new(subject),
        }
    }

    /// Set-membership test
    pub fn in_set(property: Property, values: Vec<Value>) -> Self {
        Predicate::InSet { property, values }
    }

    /// First property referenced by this predicate, left to right
    pub fn property(&self) -> Option<Property> {
        match self {
            Predicate::Literal(_) | Predicate::Regex(_) => None,
            Predicate::Property(p) => Some(*p),
            Predicate::Comparison { lhs, rhs, .. } => lhs.property().or_else(|| rhs.property()),
            Predicate::InRange { property, .. }
            | Predicate::InSet { property, .. }
            | Predicate::HasAnyFlag { property, .. } => Some(*property),
        }
    }

    /// Level whose test this predicate belongs to
    ///
    /// Predicates that reference no property (a comparison of two literals)
    /// are atom tests.
    pub fn level(&self) -> SemanticLevel {
        self.property()
            .map(Property::level)
            .unwrap_or(SemanticLevel::Atom)
    }

    /// Check if this is a complete test rather than an operand
    pub fn is_test(&self) -> bool {
        !matches!(
            self,
            Predicate::Literal(_) | Predicate::Property(_) | Predicate::Regex(_)
        )
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Literal(v) => write!(f, "{}", v),
            Predicate::Property(p) => write!(f, "{}", p),
            Predicate::Regex(r) => write!(f, "{}", r),
            Predicate::Comparison { op, lhs, rhs } => write!(f, "({} {} {})", op, lhs, rhs),
            Predicate::InRange {
                property,
                low,
                high,
            } => write!(f, "(in-range {} {} {})", property, low, high),
            Predicate::InSet { property, values } => {
                write!(f, "(in-set {}", property)?;
                for v in values {
                    write!(f, " {}", v)?;
                }
                write!(f, ")")
            }
            Predicate::HasAnyFlag { property, flags } => {
                write!(f, "(has-any-flag {} {})", property, flags)
            }
        }
    }
}

/// Boolean combination of predicates
///
/// `And` and `Or` always hold at least two operands; the folding
/// constructors [`BooleanExpression::all`] and [`BooleanExpression::any`]
/// collapse empty and single-element lists.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BooleanExpression {
    And(Vec<BooleanExpression>),
    Or(Vec<BooleanExpression>),
    Not(Box<BooleanExpression>),
    Leaf(Predicate),
}

impl BooleanExpression {
    /// AND-fold a list of expressions
    ///
    /// Returns `None` for an empty list and the sole element for a singleton.
    /// Nested `And` operands are spliced into the result.
    pub fn all(items: impl IntoIterator<Item = BooleanExpression>) -> Option<Self> {
        let mut flat = Vec::new();
        for item in items {
            match item {
                BooleanExpression::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        fold(flat, BooleanExpression::And)
    }

    /// OR-fold a list of expressions
    pub fn any(items: impl IntoIterator<Item = BooleanExpression>) -> Option<Self> {
        let mut flat = Vec::new();
        for item in items {
            match item {
                BooleanExpression::Or(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        fold(flat, BooleanExpression::Or)
    }

    /// Logical negation
    pub fn negate(self) -> Self {
        match self {
            BooleanExpression::Not(inner) => *inner,
            other => BooleanExpression::Not(Box::new(other)),
        }
    }
}

fn fold(
    mut items: Vec<BooleanExpression>,
    wrap: fn(Vec<BooleanExpression>) -> BooleanExpression,
) -> Option<BooleanExpression> {
    match items.len() {
        0 => None,
        1 => items.pop(),
        _ => Some(wrap(items)),
    }
}

impl From<Predicate> for BooleanExpression {
    fn from(p: Predicate) -> Self {
        BooleanExpression::Leaf(p)
    }
}

impl fmt::Display for BooleanExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BooleanExpression::And(items) | BooleanExpression::Or(items) => {
                let name = if matches!(self, BooleanExpression::And(_)) {
                    "and"
                } else {
                    "or"
                };
                write!(f, "({}", name)?;
                for item in items {
                    write!(f, " {}", item)?;
                }
                write!(f, ")")
            }
            BooleanExpression::Not(inner) => write!(f, "(not {})", inner),
            BooleanExpression::Leaf(p) => write!(f, "{}", p),
        }
    }
}
