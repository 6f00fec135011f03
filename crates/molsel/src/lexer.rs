//! Lexical primitives
//!
//! Scannerless matchers used directly by the grammar. Each one either consumes
//! a prefix of the input or fails without consuming anything, so callers can
//! backtrack freely.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, tag_no_case, take_while1},
    character::complete::{
        anychar, char, digit0, digit1, multispace0, multispace1, one_of, satisfy,
    },
    combinator::{not, opt, peek, recognize},
    sequence::{delimited, pair, terminated, tuple},
};

use crate::error::{backtrack, PResult};
use crate::properties::ReservedWords;

/// Check if a character can be part of an identifier
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Check if a character can appear in an operator-like run
pub(crate) fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '!' | '~')
}

/// Optional whitespace
pub(crate) fn ws(input: &str) -> PResult<'_, &str> {
    multispace0(input)
}

/// Mandatory whitespace
pub(crate) fn ws1(input: &str) -> PResult<'_, &str> {
    multispace1(input)
}

/// Succeeds without consuming when no identifier character follows
pub(crate) fn word_boundary(input: &str) -> PResult<'_, ()> {
    not(peek(satisfy(is_ident_char)))(input)
}

/// Run of identifier characters
pub(crate) fn ident(input: &str) -> PResult<'_, &str> {
    take_while1(is_ident_char)(input)
}

/// Case-insensitive word ending at a word boundary
pub(crate) fn word<'a>(w: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    terminated(tag_no_case(w), word_boundary)
}

/// A single punctuation character
pub(crate) fn punct<'a>(c: char) -> impl FnMut(&'a str) -> PResult<'a, char> {
    char(c)
}

/// Optionally signed run of digits
pub(crate) fn integer(input: &str) -> PResult<'_, f64> {
    let (rest, text) = recognize(pair(opt(char('-')), digit1))(input)?;
    match text.parse::<f64>() {
        Ok(n) => Ok((rest, n)),
        Err(_) => backtrack(input),
    }
}

/// Decimal number with optional fraction and exponent
///
/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`, not followed by an
/// identifier character (so `5MC` is not a number).
pub(crate) fn number(input: &str) -> PResult<'_, f64> {
    let (rest, text) = terminated(
        recognize(tuple((
            opt(char('-')),
            alt((tag("0"), recognize(pair(one_of("123456789"), digit0)))),
            opt(pair(char('.'), digit1)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        word_boundary,
    )(input)?;
    match text.parse::<f64>() {
        Ok(n) => Ok((rest, n)),
        Err(_) => backtrack(input),
    }
}

/// Identifier run that is not a reserved word
pub(crate) fn bare_word<'a>(reserved: &ReservedWords, input: &'a str) -> PResult<'a, &'a str> {
    if reserved.matches_at(input).is_some() {
        return backtrack(input);
    }
    ident(input)
}

/// Quoted string with backslash escapes, returning the unescaped content
pub(crate) fn quoted(quote: char, input: &str) -> PResult<'_, String> {
    let stop = match quote {
        '\'' => "\\'",
        '"' => "\\\"",
        _ => return backtrack(input),
    };
    let body: PResult<'_, Option<String>> = delimited(
        char(quote),
        opt(escaped_transform(is_not(stop), '\\', anychar)),
        char(quote),
    )(input);
    match body {
        Ok((rest, text)) => Ok((rest, text.unwrap_or_default())),
        // Unterminated or unopened
        Err(_) => backtrack(input),
    }
}

/// Run of operator characters (`<`, `>`, `=`, `!`, `~`)
pub(crate) fn operator_run(input: &str) -> PResult<'_, &str> {
    take_while1(is_operator_char)(input)
}

/// Characters allowed in an atom name field
pub(crate) fn atom_name(input: &str) -> PResult<'_, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '\'')(input)
}

/// Characters allowed in a chain field
pub(crate) fn chain_id(input: &str) -> PResult<'_, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric())(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number() {
        assert_eq!(number("10").unwrap(), ("", 10.0));
        assert_eq!(number("-2.5e3 x").unwrap(), (" x", -2500.0));
        assert_eq!(number("0.5)").unwrap(), (")", 0.5));
        assert!(number("5MC").is_err());
        assert!(number("007").is_err());
        assert!(number(".5").is_err());
    }

    #[test]
    fn test_integer() {
        assert_eq!(integer("100^B").unwrap(), ("^B", 100.0));
        assert_eq!(integer("-12:A").unwrap(), (":A", -12.0));
        assert!(integer("A").is_err());
    }

    #[test]
    fn test_quoted() {
        assert_eq!(quoted('\'', "'CA' and").unwrap(), (" and", "CA".to_string()));
        assert_eq!(quoted('"', r#""C\"1" x"#).unwrap(), (" x", "C\"1".to_string()));
        assert_eq!(quoted('\'', "''").unwrap(), ("", String::new()));
        assert_eq!(quoted('\'', r"'a\\b'").unwrap(), ("", "a\\b".to_string()));
        assert_eq!(quoted('\'', r#"'say "hi"'"#).unwrap(), ("", "say \"hi\"".to_string()));
        assert!(quoted('\'', r"'trailing\'").is_err());
        assert!(quoted('"', "\"open").is_err());
        assert!(quoted('"', "'CA'").is_err());
    }

    #[test]
    fn test_word_boundary() {
        assert_eq!(word("and")("AND chain").unwrap(), (" chain", "AND"));
        assert_eq!(word("and")("and(").unwrap(), ("(", "and"));
        assert!(word("and")("android").is_err());
    }

    #[test]
    fn test_bare_word_excludes_reserved() {
        let reserved = ReservedWords::new(["name", "resno", "and"]);
        assert_eq!(bare_word(&reserved, "ALA:A").unwrap(), (":A", "ALA"));
        assert_eq!(bare_word(&reserved, "names").unwrap(), ("", "names"));
        assert!(bare_word(&reserved, "NAME CA").is_err());
        assert!(bare_word(&reserved, "and").is_err());
    }

    #[test]
    fn test_fields() {
        assert_eq!(atom_name("C1'.x").unwrap(), (".x", "C1'"));
        assert_eq!(chain_id("A.CA").unwrap(), (".CA", "A"));
        assert_eq!(operator_run("=~ 5").unwrap(), (" 5", "=~"));
    }
}
