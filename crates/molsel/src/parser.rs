//! Grammar assembly
//!
//! Wires the value sublanguage, property clauses, keywords and macro
//! shorthand into the top-level rule
//!
//! ```text
//! Query      := ws (Operator | Parens | Expression) ws
//! Parens     := '(' Query ')'
//! Expression := ValueQuery | PropertyClause | Keyword | AtomExpression | AtomSelectionMacro
//! ```
//!
//! and enforces that the whole input is consumed.

use molsel_query::QueryExpression;
use nom::{branch::alt, sequence::delimited};

use crate::dialect::Dialect;
use crate::error::{
    backtrack, reject, FailureTracker, PResult, ParseError, ParseErrorKind, ParseResult,
};
use crate::keywords;
use crate::lexer::{self, punct, ws};
use crate::operators::{climb, BOOLEAN_OPERATORS};

/// Grammar state for a single transpile call
pub(crate) struct Grammar<'d> {
    pub(crate) dialect: &'d Dialect,
    pub(crate) tracker: FailureTracker,
}

impl<'d> Grammar<'d> {
    pub(crate) fn new(dialect: &'d Dialect) -> Self {
        Grammar {
            dialect,
            tracker: FailureTracker::default(),
        }
    }

    /// Parse the complete input
    pub(crate) fn parse(&self, input: &str) -> ParseResult<QueryExpression> {
        let offset = |rest: &str| input.len() - rest.len();

        match self.query(input) {
            Ok(("", query)) => Ok(query),
            Ok((rest, _)) => match self.tracker.furthest_remaining() {
                // A deeper failure explains the leftover better
                Some(remaining) if remaining < rest.len() => {
                    Err(self.syntax_error(input, remaining))
                }
                Some(remaining) if remaining == rest.len() => Err(ParseError {
                    kind: ParseErrorKind::TrailingInput,
                    position: offset(rest),
                    expected: self.tracker.expected(),
                }),
                _ => Err(ParseError::new(ParseErrorKind::TrailingInput, offset(rest))),
            },
            Err(nom::Err::Failure(e)) => Err(ParseError::new(e.kind, offset(e.input))),
            Err(nom::Err::Error(e)) => {
                let remaining = self
                    .tracker
                    .furthest_remaining()
                    .map_or(e.input.len(), |r| r.min(e.input.len()));
                Err(self.syntax_error(input, remaining))
            }
            Err(nom::Err::Incomplete(_)) => Err(self.syntax_error(input, 0)),
        }
    }

    fn syntax_error(&self, input: &str, remaining: usize) -> ParseError {
        ParseError {
            kind: ParseErrorKind::Syntax,
            position: input.len() - remaining,
            expected: self.tracker.expected(),
        }
    }

    /// Record `label` as expected wherever `result` failed recoverably
    pub(crate) fn expect<'a, T>(
        &self,
        label: &'static str,
        result: PResult<'a, T>,
    ) -> PResult<'a, T> {
        if let Err(nom::Err::Error(e)) = &result {
            self.tracker.record(e.input, label);
        }
        result
    }

    /// `Query`
    fn query<'a>(&self, input: &'a str) -> PResult<'a, QueryExpression> {
        delimited(ws, |i| self.operator(i), ws)(input)
    }

    /// `Operator`: boolean combination of parenthesized groups and expressions
    fn operator<'a>(&self, input: &'a str) -> PResult<'a, QueryExpression> {
        let operand = |i: &'a str| alt((|i| self.parens(i), |i| self.expression(i)))(i);
        climb(&BOOLEAN_OPERATORS, &(), 0, &operand, &self.tracker, input)
    }

    /// `Parens`
    fn parens<'a>(&self, input: &'a str) -> PResult<'a, QueryExpression> {
        let (rest, _) = self.expect("'('", punct('(')(input))?;
        let (rest, query) = self.query(rest)?;
        let (rest, _) = self.expect("')'", punct(')')(rest))?;
        Ok((rest, query))
    }

    /// `Expression`
    fn expression<'a>(&self, input: &'a str) -> PResult<'a, QueryExpression> {
        alt((
            |i| self.value_query(i),
            |i| self.property_clause(i),
            |i| self.keyword(i),
            |i| self.atom_expression_query(i),
            |i| self.macro_query(i),
        ))(input)
    }

    /// `Keyword`
    fn keyword<'a>(&self, input: &'a str) -> PResult<'a, QueryExpression> {
        let (rest, word) = self.expect("keyword", lexer::ident(input))?;
        let Some(keyword) = keywords::lookup(word) else {
            return self.expect("keyword", backtrack(input));
        };
        match keyword.expression(self.dialect.properties()) {
            Ok(query) => Ok((rest, query)),
            Err(kind) => reject(input, kind),
        }
    }

    fn atom_expression_query<'a>(&self, input: &'a str) -> PResult<'a, QueryExpression> {
        let (rest, record) = self.atom_expression(input)?;
        Ok((rest, self.atom_selection_query(record)?))
    }

    fn macro_query<'a>(&self, input: &'a str) -> PResult<'a, QueryExpression> {
        let (rest, record) = self.atom_selection_macro(input)?;
        Ok((rest, self.atom_selection_query(record)?))
    }
}
