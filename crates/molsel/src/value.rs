//! Value sublanguage
//!
//! Comparisons over a single property (`resno >= 10`, `name like "C.*"`) and
//! range/list property clauses (`resno 1-5,10`).

use molsel_query::{
    AtomGroups, BooleanExpression, CompareOp, Predicate, QueryExpression, RegexLiteral,
    SecondaryStructureFlags, Value, ValueType,
};
use nom::{
    branch::alt,
    multi::separated_list1,
    sequence::{delimited, separated_pair, tuple},
};
use regex::RegexBuilder;

use crate::dialect::TranspileOptions;
use crate::error::{backtrack, reject, PResult, ParseErrorKind};
use crate::lexer::{self, punct, ws, ws1};
use crate::operators::{climb, Fixity, OperatorSpec, OperatorTable};
use crate::parser::Grammar;
use crate::properties::{PropertyDescriptor, ReservedWords};
use crate::structure::structure_flags;

/// Operand or result of the value operator table
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ValueTerm {
    Literal(Value),
    /// A property name, with the spelling it was written in
    Property(PropertyDescriptor, String),
    Regex(RegexLiteral),
    Predicate(Predicate),
}

impl ValueTerm {
    fn into_predicate(self) -> Predicate {
        match self {
            ValueTerm::Literal(v) => Predicate::Literal(v),
            ValueTerm::Property(d, _) => Predicate::Property(d.property),
            ValueTerm::Regex(r) => Predicate::Regex(r),
            ValueTerm::Predicate(p) => p,
        }
    }

    fn describe(&self) -> String {
        match self {
            ValueTerm::Literal(v) => v.to_text(),
            ValueTerm::Property(d, _) => d.name.to_string(),
            ValueTerm::Regex(r) => r.to_string(),
            ValueTerm::Predicate(p) => p.to_string(),
        }
    }
}

/// Compile `^body$` into a regex literal, rejecting invalid patterns
pub(crate) fn anchored_pattern(
    body: &str,
    options: &TranspileOptions,
) -> Result<RegexLiteral, ParseErrorKind> {
    let literal = RegexLiteral::anchored(body, !options.case_sensitive_like);
    RegexBuilder::new(&literal.pattern)
        .case_insensitive(literal.is_case_insensitive())
        .build()
        .map_err(|e| ParseErrorKind::InvalidPattern {
            pattern: body.to_string(),
            reason: e.to_string(),
        })?;
    Ok(literal)
}

/// RasMol value operators, longest symbol first
pub(crate) static VALUE_OPERATORS: OperatorTable<ValueTerm, TranspileOptions> = OperatorTable {
    label: "comparison operator",
    operators: &[OperatorSpec {
        name: "compare",
        fixity: Fixity::InfixLeft,
        precedence: 1,
        symbols: &["like", ">=", "<=", "==", "=", "!=", ">", "<"],
        build: compare,
    }],
};

fn compare_op(symbol: &str) -> Result<CompareOp, ParseErrorKind> {
    match symbol {
        "=" | "==" => Ok(CompareOp::Eq),
        "!=" => Ok(CompareOp::Ne),
        ">" => Ok(CompareOp::Gt),
        "<" => Ok(CompareOp::Lt),
        ">=" => Ok(CompareOp::Ge),
        "<=" => Ok(CompareOp::Le),
        other => Err(ParseErrorKind::UnsupportedOperator(other.to_string())),
    }
}

/// Build a comparison from two value terms
///
/// Checked in order: structure flags, regex operands, `LIKE`, then plain
/// comparison with the literal coerced to the property's type. The property
/// operand always ends up on the left. When both operands are property names
/// the right one is read as a literal in its written spelling, so two columns
/// are never compared with each other.
fn compare(
    options: &TranspileOptions,
    symbol: &str,
    operands: Vec<ValueTerm>,
) -> Result<ValueTerm, ParseErrorKind> {
    let [lhs, rhs]: [ValueTerm; 2] = operands
        .try_into()
        .map_err(|_| ParseErrorKind::Syntax)?;

    for term in [&lhs, &rhs] {
        if let ValueTerm::Predicate(p) = term {
            return Err(ParseErrorKind::type_mismatch(
                "comparison operand",
                "value or property",
                p.to_string(),
            ));
        }
    }

    // name = Z
    let rhs = match (&lhs, rhs) {
        (ValueTerm::Property(..), ValueTerm::Property(_, written)) => {
            ValueTerm::Literal(Value::String(written))
        }
        (_, rhs) => rhs,
    };

    let like = symbol.eq_ignore_ascii_case("like");

    // structure = helix
    let flags_side = match (&lhs, &rhs) {
        (ValueTerm::Property(d, _), other) | (other, ValueTerm::Property(d, _))
            if d.value_type() == ValueType::Flags =>
        {
            Some((d.clone(), other.clone()))
        }
        _ => None,
    };
    if let Some((descriptor, other)) = flags_side {
        if !(like || matches!(symbol, "=" | "==")) {
            return Err(ParseErrorKind::UnsupportedOperator(symbol.to_string()));
        }
        let flags = match other {
            ValueTerm::Literal(v) => structure_flags(&v)?,
            other => {
                return Err(ParseErrorKind::type_mismatch(
                    descriptor.name,
                    ValueType::Flags.name(),
                    other.describe(),
                ))
            }
        };
        return Ok(ValueTerm::Predicate(Predicate::HasAnyFlag {
            property: descriptor.property,
            flags,
        }));
    }

    // A regex literal always means a string match, whatever the operator
    if let ValueTerm::Regex(pattern) = lhs {
        return Ok(ValueTerm::Predicate(Predicate::regex_match(
            pattern,
            rhs.into_predicate(),
        )));
    }
    if let ValueTerm::Regex(pattern) = rhs {
        return Ok(ValueTerm::Predicate(Predicate::regex_match(
            pattern,
            lhs.into_predicate(),
        )));
    }

    if like {
        // The first property operand is the subject; the other side is the pattern
        let (subject, pattern) = match (lhs, rhs) {
            (subject @ ValueTerm::Property(..), pattern) => (subject, pattern),
            (pattern, subject) => (subject, pattern),
        };
        let body = match pattern {
            ValueTerm::Literal(v) => v.to_text(),
            other => {
                return Err(ParseErrorKind::type_mismatch(
                    "like",
                    "pattern",
                    other.describe(),
                ))
            }
        };
        let regex = anchored_pattern(&body, options)?;
        return Ok(ValueTerm::Predicate(Predicate::regex_match(
            regex,
            subject.into_predicate(),
        )));
    }

    let op = compare_op(symbol)?;
    let predicate = match (lhs, rhs) {
        (ValueTerm::Property(d, _), ValueTerm::Literal(v)) => {
            Predicate::compare(op, d.property, d.decode(&v)?)
        }
        // Normalize so the property is on the left
        (ValueTerm::Literal(v), ValueTerm::Property(d, _)) => {
            Predicate::compare(op.mirror(), d.property, d.decode(&v)?)
        }
        (lhs, rhs) => Predicate::Comparison {
            op,
            lhs: Box::new(lhs.into_predicate()),
            rhs: Box::new(rhs.into_predicate()),
        },
    };
    Ok(ValueTerm::Predicate(predicate))
}

/// One item of a property clause list
#[derive(Debug, Clone, PartialEq)]
enum ClauseItem {
    Range(Value, Value),
    Single(Value),
    Pattern(RegexLiteral),
}

impl<'d> Grammar<'d> {
    /// `ValueQuery`: a comparison, wrapped in a generator
    pub(crate) fn value_query<'a>(&self, input: &'a str) -> PResult<'a, QueryExpression> {
        let operand = |i: &'a str| self.value_operand(i);
        let (rest, term) = climb(
            &VALUE_OPERATORS,
            self.dialect.options(),
            0,
            &operand,
            &self.tracker,
            input,
        )?;

        match term {
            ValueTerm::Predicate(p) => Ok((rest, AtomGroups::from_predicates([p]).into())),
            _ => {
                let (at, _) = ws(rest)?;
                if let Ok((_, run)) = lexer::operator_run(at) {
                    if !VALUE_OPERATORS.has_symbol(run) {
                        return reject(at, ParseErrorKind::UnsupportedOperator(run.to_string()));
                    }
                }
                backtrack(input)
            }
        }
    }

    /// `ValueParens | Value | PropertyNameRef`
    fn value_operand<'a>(&self, input: &'a str) -> PResult<'a, ValueTerm> {
        let result = alt((
            |i| self.value_parens(i),
            |i| self.value(i),
            |i| self.property_ref(i),
        ))(input);
        self.expect("value", result)
    }

    /// `PropertyNameRef`
    fn property_ref<'a>(&self, input: &'a str) -> PResult<'a, ValueTerm> {
        let (rest, desc) = self.dialect.properties().name_rule(input)?;
        let written = &input[..input.len() - rest.len()];
        Ok((rest, ValueTerm::Property(desc.clone(), written.to_string())))
    }

    fn value_parens<'a>(&self, input: &'a str) -> PResult<'a, ValueTerm> {
        let operand = |i: &'a str| self.value_operand(i);
        let result = delimited(
            tuple((punct('('), ws)),
            |i| {
                climb(
                    &VALUE_OPERATORS,
                    self.dialect.options(),
                    0,
                    &operand,
                    &self.tracker,
                    i,
                )
            },
            tuple((ws, |i| self.expect("')'", punct(')')(i)))),
        )(input);
        result
    }

    /// `Number | String`
    ///
    /// Bare words and single-quoted strings are literals; double-quoted
    /// strings are anchored patterns. Property names are not bare words
    /// here, since either side of a comparison may be a property.
    pub(crate) fn value<'a>(&self, input: &'a str) -> PResult<'a, ValueTerm> {
        self.value_excluding(self.dialect.value_reserved_words(), input)
    }

    /// `value` with bare words checked against `reserved`
    fn value_excluding<'a>(
        &self,
        reserved: &ReservedWords,
        input: &'a str,
    ) -> PResult<'a, ValueTerm> {
        if let Ok((rest, n)) = lexer::number(input) {
            return Ok((rest, ValueTerm::Literal(Value::Number(n))));
        }
        if let Ok((rest, word)) = lexer::bare_word(reserved, input) {
            return Ok((rest, ValueTerm::Literal(Value::string(word))));
        }
        if let Ok((rest, text)) = lexer::quoted('\'', input) {
            return Ok((rest, ValueTerm::Literal(Value::String(text))));
        }
        let (rest, body) = lexer::quoted('"', input)?;
        match anchored_pattern(&body, self.dialect.options()) {
            Ok(regex) => Ok((rest, ValueTerm::Regex(regex))),
            Err(kind) => reject(input, kind),
        }
    }

    /// `RangeListProperty`: `<property> <item>(,<item>)*`
    ///
    /// A word that looks like a property name followed by a value, but is not
    /// one, is rejected here rather than left to fail as trailing input.
    pub(crate) fn property_clause<'a>(&self, input: &'a str) -> PResult<'a, QueryExpression> {
        let descriptor = match self.dialect.properties().name_rule(input) {
            Ok((rest, desc)) => Some((rest, desc)),
            Err(nom::Err::Error(_)) => None,
            Err(e) => return Err(e),
        };
        let Some((rest, descriptor)) = descriptor else {
            self.unknown_property(input)?;
            return self.expect("property", backtrack(input));
        };

        let (rest, _) = ws1(rest)?;
        let (rest, items) = separated_list1(tuple((ws, punct(','), ws)), |i| {
            self.expect("value", self.clause_item(i))
        })(rest)?;

        match clause_test(descriptor, items) {
            Ok(test) => {
                let mut groups = AtomGroups::new();
                groups.set(descriptor.level(), Some(test));
                Ok((rest, groups.into()))
            }
            Err(kind) => reject(input, kind),
        }
    }

    /// `Value '-' Value | Value`
    ///
    /// The property is already known, so only operator words stop a bare
    /// value (`chain X` names chain X).
    fn clause_item<'a>(&self, input: &'a str) -> PResult<'a, ClauseItem> {
        let literal = |i| self.literal(i);
        match separated_pair(literal, punct('-'), literal)(input) {
            Ok((rest, (low, high))) => return Ok((rest, ClauseItem::Range(low, high))),
            Err(nom::Err::Error(_)) => {}
            Err(e) => return Err(e),
        }
        match self.value_excluding(self.dialect.operator_words(), input)? {
            (rest, ValueTerm::Literal(v)) => Ok((rest, ClauseItem::Single(v))),
            (rest, ValueTerm::Regex(r)) => Ok((rest, ClauseItem::Pattern(r))),
            _ => backtrack(input),
        }
    }

    fn literal<'a>(&self, input: &'a str) -> PResult<'a, Value> {
        match self.value_excluding(self.dialect.operator_words(), input)? {
            (rest, ValueTerm::Literal(v)) => Ok((rest, v)),
            _ => backtrack(input),
        }
    }

    /// Fail with `UnsupportedProperty` if `input` reads as `word value`
    fn unknown_property<'a>(&self, input: &'a str) -> PResult<'a, ()> {
        if !input.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Ok((input, ()));
        }
        let Ok((after, word)) = lexer::bare_word(self.dialect.reserved_words(), input) else {
            return Ok((input, ()));
        };
        let followed_by_value = ws1(after)
            .and_then(|(i, _)| self.clause_item(i))
            .is_ok();
        if followed_by_value {
            return reject(input, ParseErrorKind::UnsupportedProperty(word.to_string()));
        }
        Ok((input, ()))
    }
}

/// Fold clause items into one test: ranges, then the value set, then patterns
fn clause_test(
    descriptor: &PropertyDescriptor,
    items: Vec<ClauseItem>,
) -> Result<BooleanExpression, ParseErrorKind> {
    if descriptor.value_type() == ValueType::Flags {
        let mut flags = SecondaryStructureFlags::empty();
        for item in items {
            match item {
                ClauseItem::Single(v) => flags |= structure_flags(&v)?,
                ClauseItem::Range(low, high) => {
                    return Err(ParseErrorKind::type_mismatch(
                        descriptor.name,
                        ValueType::Flags.name(),
                        format!("{}-{}", low.to_text(), high.to_text()),
                    ))
                }
                ClauseItem::Pattern(r) => {
                    return Err(ParseErrorKind::type_mismatch(
                        descriptor.name,
                        ValueType::Flags.name(),
                        r.to_string(),
                    ))
                }
            }
        }
        return Ok(Predicate::HasAnyFlag {
            property: descriptor.property,
            flags,
        }
        .into());
    }

    let mut ranges = Vec::new();
    let mut values = Vec::new();
    let mut patterns = Vec::new();
    for item in items {
        match item {
            ClauseItem::Range(low, high) => ranges.push(BooleanExpression::from(Predicate::InRange {
                property: descriptor.property,
                low: descriptor.decode(&low)?,
                high: descriptor.decode(&high)?,
            })),
            ClauseItem::Single(v) => values.push(descriptor.decode(&v)?),
            ClauseItem::Pattern(r) => patterns.push(BooleanExpression::from(
                Predicate::regex_match(r, Predicate::Property(descriptor.property)),
            )),
        }
    }

    let set = (!values.is_empty())
        .then(|| BooleanExpression::from(Predicate::in_set(descriptor.property, values)));
    let tests = ranges.into_iter().chain(set).chain(patterns);
    BooleanExpression::any(tests).ok_or(ParseErrorKind::Syntax)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Dialect, DialectKind};
    use molsel_query::Property;

    fn prop(name: &str) -> ValueTerm {
        let dialect = Dialect::get(DialectKind::RasMol);
        ValueTerm::Property(
            dialect.properties().get(name).unwrap().clone(),
            name.to_string(),
        )
    }

    fn build(symbol: &str, lhs: ValueTerm, rhs: ValueTerm) -> Result<Predicate, ParseErrorKind> {
        match compare(&TranspileOptions::default(), symbol, vec![lhs, rhs])? {
            ValueTerm::Predicate(p) => Ok(p),
            other => panic!("not a predicate: {:?}", other),
        }
    }

    #[test]
    fn test_operand_order_is_normalized() {
        let a = build(">=", prop("resno"), ValueTerm::Literal(Value::from(10))).unwrap();
        let b = build("<=", ValueTerm::Literal(Value::from(10)), prop("resno")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Predicate::compare(CompareOp::Ge, Property::AuthSeqId, 10));
    }

    #[test]
    fn test_literal_is_coerced() {
        let p = build("=", prop("resno"), ValueTerm::Literal(Value::from("42"))).unwrap();
        assert_eq!(p, Predicate::compare(CompareOp::Eq, Property::AuthSeqId, 42));

        let err = build("=", prop("resno"), ValueTerm::Literal(Value::from("ALA")));
        assert!(matches!(err, Err(ParseErrorKind::TypeMismatch { .. })));
    }

    #[test]
    fn test_like_prefers_property_subject() {
        let a = build("LIKE", prop("name"), ValueTerm::Literal(Value::from("C.*"))).unwrap();
        let b = build("like", ValueTerm::Literal(Value::from("C.*")), prop("name")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "(match /^C.*$/i auth_atom_id)");
    }

    #[test]
    fn test_regex_operand_overrides_operator() {
        let regex = ValueTerm::Regex(RegexLiteral::anchored("C.*", true));
        let a = build("=", prop("name"), regex.clone()).unwrap();
        let b = build("!=", regex, prop("name")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_second_property_name_reads_as_literal() {
        let p = build("=", prop("name"), prop("Z")).unwrap();
        assert_eq!(p, Predicate::compare(CompareOp::Eq, Property::AuthAtomId, "Z"));
        assert_eq!(p.to_string(), "(= auth_atom_id \"Z\")");

        let err = build("=", prop("resno"), prop("x"));
        assert!(matches!(err, Err(ParseErrorKind::TypeMismatch { .. })));
    }

    #[test]
    fn test_structure_comparison() {
        let p = build("=", prop("structure"), ValueTerm::Literal(Value::from("sheet"))).unwrap();
        assert_eq!(
            p,
            Predicate::HasAnyFlag {
                property: Property::SecondaryStructureFlags,
                flags: SecondaryStructureFlags::BETA,
            }
        );
        let err = build(">", prop("structure"), ValueTerm::Literal(Value::from("sheet")));
        assert_eq!(err, Err(ParseErrorKind::UnsupportedOperator(">".to_string())));
    }

    #[test]
    fn test_chained_comparison_is_rejected() {
        let inner = ValueTerm::Predicate(Predicate::compare(CompareOp::Eq, Property::AuthSeqId, 1));
        let err = build("=", inner, ValueTerm::Literal(Value::from(2)));
        assert!(matches!(err, Err(ParseErrorKind::TypeMismatch { .. })));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = anchored_pattern("C(", &TranspileOptions::default());
        assert!(matches!(err, Err(ParseErrorKind::InvalidPattern { .. })));

        let case = TranspileOptions::default().with_case_sensitive_like(true);
        assert_eq!(anchored_pattern("CA", &case).unwrap().flags, "");
    }

    #[test]
    fn test_clause_folding() {
        let dialect = Dialect::get(DialectKind::RasMol);
        let resno = dialect.properties().get("resno").unwrap();

        let single = clause_test(resno, vec![ClauseItem::Single(Value::from(7))]).unwrap();
        assert_eq!(
            single,
            BooleanExpression::from(Predicate::in_set(Property::AuthSeqId, vec![Value::from(7)]))
        );

        let mixed = clause_test(
            resno,
            vec![
                ClauseItem::Range(Value::from(1), Value::from(5)),
                ClauseItem::Single(Value::from(10)),
            ],
        )
        .unwrap();
        assert_eq!(
            mixed.to_string(),
            "(or (in-range auth_seq_id 1 5) (in-set auth_seq_id 10))"
        );
    }
}
