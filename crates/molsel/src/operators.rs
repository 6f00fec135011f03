//! Operator-precedence engine
//!
//! A Pratt-style parser generic over a static operator table. The same engine
//! combines query expressions with `and`/`or`/`not` and value operands with
//! comparison operators; only the table and the operand parser differ.

use molsel_query::QueryExpression;
use nom::bytes::complete::tag;

use crate::error::{FailureTracker, GrammarError, PResult, ParseErrorKind};
use crate::lexer::{self, word};

/// How an operator takes its operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
    /// Unary, before its operand
    Prefix,
    /// Binary, `a op b op c` == `(a op b) op c`
    InfixLeft,
    /// Binary, `a op b op c` == `a op (b op c)`
    ///
    /// No built-in table declares right associativity yet.
    #[allow(dead_code)]
    InfixRight,
}

/// Builds the result of applying an operator
///
/// Receives the table's context, the matched symbol and the operands in
/// source order.
pub type BuildFn<T, C> = fn(&C, &str, Vec<T>) -> Result<T, ParseErrorKind>;

/// One row of an operator table
pub struct OperatorSpec<T: 'static, C: 'static = ()> {
    pub name: &'static str,
    pub fixity: Fixity,
    /// Higher binds tighter
    pub precedence: u8,
    /// Accepted spellings, tried in order
    pub symbols: &'static [&'static str],
    pub build: BuildFn<T, C>,
}

/// Ordered operator table
pub struct OperatorTable<T: 'static, C: 'static = ()> {
    /// Label reported when an operator was expected
    pub label: &'static str,
    pub operators: &'static [OperatorSpec<T, C>],
}

impl<T: 'static, C: 'static> OperatorTable<T, C> {
    /// Alphabetic symbols, which must be reserved from bare words
    pub fn words(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.operators
            .iter()
            .flat_map(|op| op.symbols.iter().copied())
            .filter(|s| s.starts_with(|c: char| c.is_ascii_alphabetic()))
    }

    /// Check if `symbol` is spelled exactly like one of the table's symbols
    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.operators
            .iter()
            .flat_map(|op| op.symbols.iter())
            .any(|s| s.eq_ignore_ascii_case(symbol))
    }

    /// Match an operator of the requested kind at `input`
    ///
    /// Returns the input at the symbol, the input after it (and any trailing
    /// whitespace), the operator and the symbol as written.
    fn lookahead<'a>(
        &self,
        prefix: bool,
        input: &'a str,
    ) -> Option<(&'a str, &'a str, &'static OperatorSpec<T, C>, &'a str)> {
        let (at, _) = lexer::ws(input).ok()?;
        for spec in self.operators {
            if (spec.fixity == Fixity::Prefix) != prefix {
                continue;
            }
            for symbol in spec.symbols {
                let matched = if symbol.starts_with(|c: char| c.is_ascii_alphabetic()) {
                    word(*symbol)(at)
                } else {
                    tag::<_, _, GrammarError<'a>>(*symbol)(at)
                };
                if let Ok((after, written)) = matched {
                    let (after, _) = lexer::ws(after).ok()?;
                    return Some((at, after, spec, written));
                }
            }
        }
        None
    }
}

fn apply<'a, T: 'static, C: 'static>(
    spec: &OperatorSpec<T, C>,
    context: &C,
    at: &'a str,
    symbol: &str,
    operands: Vec<T>,
) -> Result<T, nom::Err<GrammarError<'a>>> {
    log::trace!("applying {} ({:?})", spec.name, symbol);
    (spec.build)(context, symbol, operands)
        .map_err(|kind| nom::Err::Failure(GrammarError::new(at, kind)))
}

/// Parse `operand (op operand)*` honoring precedence and associativity
///
/// Operators with precedence below `min_precedence` are left for the caller.
/// If the operand after an infix operator fails recoverably, the operator is
/// not consumed.
pub(crate) fn climb<'a, T, C, F>(
    table: &OperatorTable<T, C>,
    context: &C,
    min_precedence: u8,
    operand: &F,
    tracker: &FailureTracker,
    input: &'a str,
) -> PResult<'a, T>
where
    T: 'static,
    C: 'static,
    F: Fn(&'a str) -> PResult<'a, T>,
{
    let (mut rest, mut lhs) = match table.lookahead(true, input) {
        Some((at, after, spec, symbol)) => {
            let (after, value) = climb(table, context, spec.precedence, operand, tracker, after)?;
            (after, apply(spec, context, at, symbol, vec![value])?)
        }
        None => operand(input)?,
    };

    loop {
        let Some((at, after, spec, symbol)) = table.lookahead(false, rest) else {
            tracker.record(lexer::ws(rest).map_or(rest, |(r, _)| r), table.label);
            break;
        };
        if spec.precedence < min_precedence {
            break;
        }
        let next = match spec.fixity {
            Fixity::InfixRight => spec.precedence,
            _ => spec.precedence.saturating_add(1),
        };
        match climb(table, context, next, operand, tracker, after) {
            Ok((after, rhs)) => {
                lhs = apply(spec, context, at, symbol, vec![lhs, rhs])?;
                rest = after;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    Ok((rest, lhs))
}

type QueryResult = Result<QueryExpression, ParseErrorKind>;

fn intersect(_: &(), _: &str, operands: Vec<QueryExpression>) -> QueryResult {
    Ok(QueryExpression::intersect(operands))
}

fn union(_: &(), _: &str, operands: Vec<QueryExpression>) -> QueryResult {
    Ok(QueryExpression::union(operands))
}

fn complement(_: &(), _: &str, mut operands: Vec<QueryExpression>) -> QueryResult {
    match operands.pop() {
        Some(q) => Ok(q.complement()),
        None => Err(ParseErrorKind::Syntax),
    }
}

/// RasMol boolean operators
pub(crate) static BOOLEAN_OPERATORS: OperatorTable<QueryExpression> = OperatorTable {
    label: "logical operator",
    operators: &[
        OperatorSpec {
            name: "not",
            fixity: Fixity::Prefix,
            precedence: 3,
            symbols: &["not", "!"],
            build: complement,
        },
        OperatorSpec {
            name: "and",
            fixity: Fixity::InfixLeft,
            precedence: 2,
            symbols: &["and", "&"],
            build: intersect,
        },
        OperatorSpec {
            name: "or",
            fixity: Fixity::InfixLeft,
            precedence: 1,
            symbols: &["or", "||", "|"],
            build: union,
        },
    ],
};
