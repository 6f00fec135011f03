//! Error types for selection transpiling
//!
//! [`ParseError`] is what callers see. Internally the grammar runs on nom with
//! [`GrammarError`], which carries the same [`ParseErrorKind`] so semantic
//! rejections survive backtracking untouched.

use std::cell::RefCell;

use nom::error::{ContextError, ErrorKind, ParseError as NomParseError};
use thiserror::Error;

/// What went wrong
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// No grammar alternative matched
    #[error("syntax error")]
    Syntax,

    /// Property name not in the dialect's dictionary
    #[error("unsupported property: {0}")]
    UnsupportedProperty(String),

    /// Operator-like token not in the operator table
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// Literal cannot be coerced to the property's value type
    #[error("type mismatch for {property}: expected {expected}, found {found}")]
    TypeMismatch {
        property: String,
        expected: String,
        found: String,
    },

    /// Pattern does not compile as a regular expression
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A prefix of the input parsed but characters remain
    #[error("unexpected trailing input")]
    TrailingInput,
}

impl ParseErrorKind {
    pub(crate) fn type_mismatch(
        property: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        ParseErrorKind::TypeMismatch {
            property: property.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Error returned by [`transpile`](crate::transpile)
///
/// `position` is a byte offset into the input. `expected` lists the grammar
/// alternatives that were attempted at the furthest point the parser reached,
/// sorted and de-duplicated.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind} at position {position}{}", format_expected(.expected))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: usize,
    pub expected: Vec<String>,
}

impl ParseError {
    /// Create an error with no expectation set
    pub fn new(kind: ParseErrorKind, position: usize) -> Self {
        ParseError {
            kind,
            position,
            expected: Vec::new(),
        }
    }

    /// Human-readable description of the error kind
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

fn format_expected(expected: &[String]) -> String {
    if expected.is_empty() {
        String::new()
    } else {
        format!(" (expected {})", expected.join(", "))
    }
}

/// Result type for transpiling
pub type ParseResult<T> = Result<T, ParseError>;

/// Dialect name not recognized
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown dialect: {0}")]
pub struct UnknownDialect(pub String);

/// nom error type used by the grammar
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GrammarError<'a> {
    pub input: &'a str,
    pub kind: ParseErrorKind,
}

impl<'a> GrammarError<'a> {
    pub(crate) fn new(input: &'a str, kind: ParseErrorKind) -> Self {
        GrammarError { input, kind }
    }
}

impl<'a> NomParseError<&'a str> for GrammarError<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        GrammarError::new(input, ParseErrorKind::Syntax)
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    // Keep whichever alternative got further
    fn or(self, other: Self) -> Self {
        if other.input.len() < self.input.len() {
            other
        } else {
            self
        }
    }
}

impl<'a> ContextError<&'a str> for GrammarError<'a> {}

pub(crate) type PResult<'a, T> = nom::IResult<&'a str, T, GrammarError<'a>>;

/// Recoverable failure: the next alternative gets a chance
pub(crate) fn backtrack<'a, T>(input: &'a str) -> PResult<'a, T> {
    Err(nom::Err::Error(GrammarError::new(input, ParseErrorKind::Syntax)))
}

/// Irrecoverable failure: aborts the whole parse
pub(crate) fn reject<'a, T>(input: &'a str, kind: ParseErrorKind) -> PResult<'a, T> {
    Err(nom::Err::Failure(GrammarError::new(input, kind)))
}

/// Furthest-failure bookkeeping for one transpile call
///
/// Positions are stored as remaining input length, so the smallest value is
/// the furthest point reached.
#[derive(Debug, Default)]
pub(crate) struct FailureTracker {
    state: RefCell<Furthest>,
}

#[derive(Debug, Default)]
struct Furthest {
    remaining: Option<usize>,
    expected: Vec<&'static str>,
}

impl FailureTracker {
    /// Note that `label` was expected at `rest`
    pub fn record(&self, rest: &str, label: &'static str) {
        let mut state = self.state.borrow_mut();
        let current = state.remaining;
        match current {
            Some(r) if rest.len() > r => {}
            Some(r) if rest.len() == r => state.expected.push(label),
            _ => {
                state.remaining = Some(rest.len());
                state.expected.clear();
                state.expected.push(label);
            }
        }
    }

    /// Remaining input length at the furthest failure
    pub fn furthest_remaining(&self) -> Option<usize> {
        self.state.borrow().remaining
    }

    /// Labels expected at the furthest failure
    pub fn expected(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .state
            .borrow()
            .expected
            .iter()
            .map(|s| s.to_string())
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }
}
