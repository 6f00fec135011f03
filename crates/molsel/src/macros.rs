//! Macro shorthand resolver
//!
//! Decodes RasMol's positional shorthand (`ALA:A.CA`, `:A`, `*.CA`) and
//! numeric atom expressions (`10-20:A.CA%B`) into a [`SelectionRecord`],
//! then turns the record into an atom-groups generator.
//!
//! Alternatives are tried in a fixed order and the first full match wins:
//!
//! ```text
//! : chain? sep name?      :A.CA  :.CA  ::CA  :A.
//! : name? .               :CA.
//! : chain                 :A
//! * chain? sep name?      *A.CA  *.CA
//! * name? .
//! resn? : chain? sep name?
//! resn? * chain? sep name?
//! resn? : chain?          ALA:A  ALA:
//! resn? * chain?          ALA*A  *
//! resn? . name?           ALA.CA
//! resn?                   ALA
//! ```
//!
//! `sep` is `.` or `:`.

use molsel_query::{AtomGroups, Predicate, QueryExpression, Value};
use nom::{
    branch::alt,
    bytes::complete::take_while_m_n,
    character::complete::satisfy,
    combinator::opt,
    sequence::preceded,
};

use crate::error::{backtrack, GrammarError, PResult, ParseErrorKind};
use crate::lexer::{self, punct};
use crate::parser::Grammar;
use crate::properties::PropertyRule;

/// A field value in a selection record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Exact(Value),
    Range(Value, Value),
}

/// Named property values decoded from shorthand
///
/// Holds at most one entry per property name; each entry remembers where it
/// appeared so later rejections point at the right place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionRecord<'a> {
    entries: Vec<(&'static str, FieldValue, &'a str)>,
}

impl<'a> SelectionRecord<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value for the same name
    pub fn insert(&mut self, name: &'static str, value: FieldValue, at: &'a str) {
        match self.entries.iter_mut().find(|(n, _, _)| *n == name) {
            Some(entry) => *entry = (name, value, at),
            None => self.entries.push((name, value, at)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|(_, v, _)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.entries.iter().map(|(n, v, _)| (*n, v))
    }
}

/// A matched shorthand field: where it started and its raw text
type Field<'a> = Option<(&'a str, &'a str)>;

/// Shorthand field rules
struct MacroFields<'d> {
    resn: PropertyRule<'d>,
    chain: PropertyRule<'d>,
    name: PropertyRule<'d>,
}

fn field<'a>(rule: &PropertyRule<'_>, input: &'a str) -> PResult<'a, Field<'a>> {
    match rule.value(input) {
        Ok((rest, raw)) => Ok((rest, Some((input, raw)))),
        Err(nom::Err::Error(_)) => Ok((input, None)),
        Err(e) => Err(e),
    }
}

fn separator(input: &str) -> PResult<'_, char> {
    alt((punct('.'), punct(':')))(input)
}

fn record<'a>(fields: [(&'static str, Field<'a>); 3]) -> SelectionRecord<'a> {
    let mut record = SelectionRecord::new();
    for (name, field) in fields {
        if let Some((at, raw)) = field {
            record.insert(name, FieldValue::Exact(Value::string(raw)), at);
        }
    }
    record
}

impl<'d> Grammar<'d> {
    fn macro_fields(&self) -> Result<MacroFields<'d>, ParseErrorKind> {
        let dict = self.dialect.properties();
        let reserved = self.dialect.reserved_words();
        Ok(MacroFields {
            resn: dict.rule("resn", reserved)?,
            chain: dict.rule("chain", reserved)?,
            name: dict.rule("name", reserved)?,
        })
    }

    /// `AtomSelectionMacro`
    pub(crate) fn atom_selection_macro<'a>(
        &self,
        input: &'a str,
    ) -> PResult<'a, SelectionRecord<'a>> {
        let fields = match self.macro_fields() {
            Ok(f) => f,
            Err(kind) => return Err(nom::Err::Failure(GrammarError::new(input, kind))),
        };
        let f = &fields;

        // chain? sep name?
        let chain_name = |i: &'a str| -> PResult<'a, SelectionRecord<'a>> {
            let (i, chain) = field(&f.chain, i)?;
            let (i, _) = separator(i)?;
            let (i, name) = field(&f.name, i)?;
            Ok((i, record([("chain", chain), ("name", name), ("resn", None)])))
        };
        // name? .
        let name_dot = |i: &'a str| -> PResult<'a, SelectionRecord<'a>> {
            let (i, name) = field(&f.name, i)?;
            let (i, _) = punct('.')(i)?;
            Ok((i, record([("name", name), ("chain", None), ("resn", None)])))
        };
        let chain_only = |i: &'a str| -> PResult<'a, SelectionRecord<'a>> {
            match field(&f.chain, i)? {
                (rest, Some(chain)) => Ok((
                    rest,
                    record([("chain", Some(chain)), ("name", None), ("resn", None)]),
                )),
                (_, None) => backtrack(i),
            }
        };
        let residue_first =
            |i: &'a str| -> PResult<'a, SelectionRecord<'a>> { self.residue_first(f, i) };

        let result = alt((
            preceded(punct(':'), alt((chain_name, name_dot, chain_only))),
            preceded(punct('*'), alt((chain_name, name_dot))),
            residue_first,
        ))(input);

        match self.expect("atom selection", result)? {
            // Must consume at least one character
            (rest, _) if rest.len() == input.len() => {
                self.expect("atom selection", backtrack(input))
            }
            ok => Ok(ok),
        }
    }

    fn residue_first<'a>(
        &self,
        f: &MacroFields<'d>,
        input: &'a str,
    ) -> PResult<'a, SelectionRecord<'a>> {
        let (after_resn, resn) = field(&f.resn, input)?;

        for marker in [':', '*'] {
            // resn? marker chain? sep name?
            let full = |i: &'a str| -> PResult<'a, SelectionRecord<'a>> {
                let (i, _) = punct(marker)(i)?;
                let (i, chain) = field(&f.chain, i)?;
                let (i, _) = separator(i)?;
                let (i, name) = field(&f.name, i)?;
                Ok((i, record([("resn", resn), ("chain", chain), ("name", name)])))
            };
            if let Ok(ok) = full(after_resn) {
                return Ok(ok);
            }
        }
        for marker in [':', '*'] {
            // resn? marker chain?
            if let Ok((i, _)) = punct::<'a>(marker)(after_resn) {
                let (i, chain) = field(&f.chain, i)?;
                return Ok((i, record([("resn", resn), ("chain", chain), ("name", None)])));
            }
        }
        // resn? . name?
        if let Ok((i, _)) = punct::<'a>('.')(after_resn) {
            let (i, name) = field(&f.name, i)?;
            return Ok((i, record([("resn", resn), ("name", name), ("chain", None)])));
        }
        Ok((after_resn, record([("resn", resn), ("chain", None), ("name", None)])))
    }

    /// `AtomExpression`: `resno[-resno][^ins][:chain][.name][%alt]`
    pub(crate) fn atom_expression<'a>(&self, input: &'a str) -> PResult<'a, SelectionRecord<'a>> {
        let result = lexer::integer(input).and_then(|(rest, n)| {
            if rest.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
                backtrack(input)
            } else {
                Ok((rest, n))
            }
        });
        let (rest, resno) = self.expect("residue number", result)?;

        let alnum = |c: char| c.is_ascii_alphanumeric();
        let (rest, high) = opt(preceded(punct('-'), lexer::integer))(rest)?;
        let at_ins = rest;
        let (rest, ins) = opt(preceded(punct('^'), satisfy(alnum)))(rest)?;
        let at_chain = rest;
        let (rest, chain) = opt(preceded(punct(':'), take_while_m_n(1, 3, alnum)))(rest)?;
        let at_name = rest;
        let (rest, name) = opt(preceded(
            punct('.'),
            take_while_m_n(1, 4, |c: char| alnum(c) || c == '\''),
        ))(rest)?;
        let at_alt = rest;
        let (rest, altloc) = opt(preceded(punct('%'), satisfy(alnum)))(rest)?;

        let mut record = SelectionRecord::new();
        let resno_value = match high {
            Some(high) => FieldValue::Range(Value::Number(resno), Value::Number(high)),
            None => FieldValue::Exact(Value::Number(resno)),
        };
        record.insert("resno", resno_value, input);
        if let Some(c) = ins {
            record.insert("insertion", FieldValue::Exact(Value::string(c.to_string())), at_ins);
        }
        if let Some(chain) = chain {
            record.insert("chain", FieldValue::Exact(Value::string(chain)), at_chain);
        }
        if let Some(name) = name {
            record.insert("name", FieldValue::Exact(Value::string(name)), at_name);
        }
        if let Some(c) = altloc {
            record.insert("altloc", FieldValue::Exact(Value::string(c.to_string())), at_alt);
        }
        Ok((rest, record))
    }

    /// Convert a record into a generator, one AND-folded test per level
    ///
    /// An empty record yields a generator with no tests, which selects
    /// everything.
    pub(crate) fn atom_selection_query<'a>(
        &self,
        record: SelectionRecord<'a>,
    ) -> Result<QueryExpression, nom::Err<GrammarError<'a>>> {
        let dict = self.dialect.properties();
        let mut predicates = Vec::with_capacity(record.len());
        for (name, value, at) in record.entries {
            let fail = |kind| nom::Err::Failure(GrammarError::new(at, kind));
            let descriptor = dict.require(name).map_err(fail)?;
            let predicate = match value {
                FieldValue::Exact(v) => Predicate::compare(
                    molsel_query::CompareOp::Eq,
                    descriptor.property,
                    descriptor.decode(&v).map_err(fail)?,
                ),
                FieldValue::Range(low, high) => Predicate::InRange {
                    property: descriptor.property,
                    low: descriptor.decode(&low).map_err(fail)?,
                    high: descriptor.decode(&high).map_err(fail)?,
                },
            };
            predicates.push(predicate);
        }
        Ok(AtomGroups::from_predicates(predicates).into())
    }
}
