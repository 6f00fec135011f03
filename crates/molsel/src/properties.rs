//! Property dictionary
//!
//! Maps selection-language property names onto [`Property`] columns and
//! decides which bare words are reserved.

use ahash::AHashMap;
use molsel_query::{Property, SemanticLevel, Value, ValueType};

use crate::error::{backtrack, ParseErrorKind, PResult};
use crate::lexer;

/// Lexical shape of a property value in macro shorthand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// Identifier run that is not a reserved word
    Word,
    /// Alphanumeric run
    Alnum,
    /// Alphanumeric run that may contain primes (`C1'`)
    AtomName,
}

/// A property known to a dialect
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    /// Canonical name
    pub name: &'static str,
    /// Alternative spellings
    pub aliases: &'static [&'static str],
    /// Target column
    pub property: Property,
    /// Value shape in macro shorthand
    pub token: TokenClass,
}

impl PropertyDescriptor {
    const fn new(
        name: &'static str,
        aliases: &'static [&'static str],
        property: Property,
        token: TokenClass,
    ) -> Self {
        PropertyDescriptor {
            name,
            aliases,
            property,
            token,
        }
    }

    /// Level whose bucket this property's tests land in
    pub fn level(&self) -> SemanticLevel {
        self.property.level()
    }

    /// Declared value type
    pub fn value_type(&self) -> ValueType {
        self.property.value_type()
    }

    /// Canonical name followed by the aliases
    pub fn spellings(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }

    /// Coerce a literal to this property's value type
    pub fn decode(&self, value: &Value) -> Result<Value, ParseErrorKind> {
        let mismatch = || {
            ParseErrorKind::type_mismatch(self.name, self.value_type().name(), value.to_text())
        };

        match (self.value_type(), value) {
            (ValueType::Integer, Value::Number(n)) if n.fract() == 0.0 => Ok(Value::Number(*n)),
            (ValueType::Integer, Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(n) if n.fract() == 0.0 => Ok(Value::Number(n)),
                _ => Err(mismatch()),
            },
            (ValueType::Number, Value::Number(n)) => Ok(Value::Number(*n)),
            (ValueType::Number, Value::String(s)) => {
                s.trim().parse::<f64>().map(Value::Number).map_err(|_| mismatch())
            }
            (ValueType::Text, v) => Ok(Value::String(v.to_text())),
            _ => Err(mismatch()),
        }
    }
}

/// RasMol property table
pub(crate) static RASMOL_PROPERTIES: &[PropertyDescriptor] = &[
    PropertyDescriptor::new("chain", &[], Property::AuthAsymId, TokenClass::Alnum),
    PropertyDescriptor::new("resn", &["resname", "group"], Property::AuthCompId, TokenClass::Word),
    PropertyDescriptor::new("resno", &["resi", "resid", "resnum"], Property::AuthSeqId, TokenClass::Word),
    PropertyDescriptor::new("insertion", &["inscode"], Property::InsCode, TokenClass::Alnum),
    PropertyDescriptor::new("structure", &[], Property::SecondaryStructureFlags, TokenClass::Word),
    PropertyDescriptor::new("name", &["atomname"], Property::AuthAtomId, TokenClass::AtomName),
    PropertyDescriptor::new("elem", &["element"], Property::TypeSymbol, TokenClass::Alnum),
    PropertyDescriptor::new("altloc", &[], Property::LabelAltId, TokenClass::Alnum),
    PropertyDescriptor::new("atomno", &["atomid"], Property::Id, TokenClass::Word),
    PropertyDescriptor::new("temperature", &["bfactor"], Property::BIsoOrEquiv, TokenClass::Word),
    PropertyDescriptor::new("occupancy", &[], Property::Occupancy, TokenClass::Word),
    PropertyDescriptor::new("formalcharge", &["charge"], Property::FormalCharge, TokenClass::Word),
    PropertyDescriptor::new("x", &[], Property::CartnX, TokenClass::Word),
    PropertyDescriptor::new("y", &[], Property::CartnY, TokenClass::Word),
    PropertyDescriptor::new("z", &[], Property::CartnZ, TokenClass::Word),
];

/// Case-insensitive name → descriptor table
#[derive(Debug, Clone)]
pub struct PropertyDictionary {
    descriptors: Vec<PropertyDescriptor>,
    index: AHashMap<String, usize>,
}

impl PropertyDictionary {
    /// Build a dictionary; names and aliases must be unique
    pub fn new(descriptors: impl IntoIterator<Item = PropertyDescriptor>) -> Self {
        let descriptors: Vec<PropertyDescriptor> = descriptors.into_iter().collect();
        let mut index = AHashMap::new();
        for (i, desc) in descriptors.iter().enumerate() {
            for spelling in desc.spellings() {
                let previous = index.insert(spelling.to_ascii_lowercase(), i);
                debug_assert!(previous.is_none(), "duplicate property name: {}", spelling);
            }
        }
        PropertyDictionary { descriptors, index }
    }

    /// Look up a property by any spelling
    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.index
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.descriptors[i])
    }

    /// Look up a property, failing with `UnsupportedProperty`
    pub fn require(&self, name: &str) -> Result<&PropertyDescriptor, ParseErrorKind> {
        self.get(name)
            .ok_or_else(|| ParseErrorKind::UnsupportedProperty(name.to_string()))
    }

    /// All descriptors, in table order
    pub fn iter(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.descriptors.iter()
    }

    /// All spellings of all properties
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors.iter().flat_map(|d| d.spellings())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Parser rule for one property
    pub fn rule<'d>(
        &'d self,
        name: &str,
        reserved: &'d ReservedWords,
    ) -> Result<PropertyRule<'d>, ParseErrorKind> {
        Ok(PropertyRule {
            descriptor: self.require(name)?,
            reserved,
        })
    }

    /// Match any property name, returning its descriptor
    ///
    /// Names are tried longest-first so `resnum` is not read as `resn`.
    pub(crate) fn name_rule<'a>(&self, input: &'a str) -> PResult<'a, &PropertyDescriptor> {
        let Some(len) = self
            .names()
            .filter(|n| prefix_matches(input, n))
            .map(str::len)
            .max()
        else {
            return backtrack(input);
        };
        let (rest, name) = word_at(input, len)?;
        match self.get(name) {
            Some(desc) => Ok((rest, desc)),
            None => backtrack(input),
        }
    }
}

fn prefix_matches(input: &str, name: &str) -> bool {
    input
        .get(..name.len())
        .map_or(false, |p| p.eq_ignore_ascii_case(name))
        && !input[name.len()..].starts_with(lexer::is_ident_char)
}

fn word_at(input: &str, len: usize) -> PResult<'_, &str> {
    match input.get(..len) {
        Some(w) if !input[len..].starts_with(lexer::is_ident_char) => Ok((&input[len..], w)),
        _ => backtrack(input),
    }
}

/// Shorthand value parser for a single property
#[derive(Debug, Clone, Copy)]
pub struct PropertyRule<'d> {
    pub descriptor: &'d PropertyDescriptor,
    reserved: &'d ReservedWords,
}

impl<'d> PropertyRule<'d> {
    /// Match a raw value in the property's token class
    pub(crate) fn value<'a>(&self, input: &'a str) -> PResult<'a, &'a str> {
        match self.descriptor.token {
            TokenClass::Word => lexer::bare_word(self.reserved, input),
            TokenClass::Alnum => lexer::chain_id(input),
            TokenClass::AtomName => lexer::atom_name(input),
        }
    }
}

/// Reserved-word set, kept longest-first
#[derive(Debug, Clone, Default)]
pub struct ReservedWords {
    words: Vec<String>,
}

impl ReservedWords {
    pub fn new<S: AsRef<str>>(words: impl IntoIterator<Item = S>) -> Self {
        let mut words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().to_ascii_lowercase())
            .collect();
        words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        words.dedup();
        ReservedWords { words }
    }

    /// Reserved word starting `input` and ending at a word boundary
    pub fn matches_at(&self, input: &str) -> Option<&str> {
        self.words
            .iter()
            .find(|w| prefix_matches(input, w))
            .map(String::as_str)
    }

    /// Check if `word` is reserved (case-insensitive)
    pub fn contains(&self, word: &str) -> bool {
        let lower = word.to_ascii_lowercase();
        self.words.iter().any(|w| *w == lower)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rasmol() -> PropertyDictionary {
        PropertyDictionary::new(RASMOL_PROPERTIES.iter().cloned())
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let dict = rasmol();
        assert_eq!(dict.get("RESI").map(|d| d.name), Some("resno"));
        assert_eq!(dict.get("Chain").map(|d| d.property), Some(Property::AuthAsymId));
        assert!(dict.get("foo").is_none());
        assert_eq!(
            dict.require("foo"),
            Err(ParseErrorKind::UnsupportedProperty("foo".to_string()))
        );
    }

    #[test]
    fn test_name_rule_longest_match() {
        let dict = rasmol();
        let (rest, desc) = dict.name_rule("resnum >= 3").unwrap();
        assert_eq!(rest, " >= 3");
        assert_eq!(desc.name, "resno");

        let (rest, desc) = dict.name_rule("resn ALA").unwrap();
        assert_eq!(rest, " ALA");
        assert_eq!(desc.name, "resn");

        assert!(dict.name_rule("names").is_err());
        assert!(dict.name_rule("x1").is_err());
    }

    #[test]
    fn test_property_rule() {
        let dict = rasmol();
        let reserved = ReservedWords::new(dict.names());
        let rule = dict.rule("atomname", &reserved).unwrap();
        assert_eq!(rule.descriptor.name, "name");
        assert_eq!(rule.value("C1'.x").unwrap(), (".x", "C1'"));

        let resn = dict.rule("resn", &reserved).unwrap();
        assert_eq!(resn.value("ALA:A").unwrap(), (":A", "ALA"));
        assert!(resn.value("chain").is_err());

        assert!(dict.rule("foo", &reserved).is_err());
    }

    #[test]
    fn test_decode() {
        let dict = rasmol();
        let resno = dict.get("resno").unwrap();
        assert_eq!(resno.decode(&Value::from("10")), Ok(Value::Number(10.0)));
        assert_eq!(resno.decode(&Value::from(10)), Ok(Value::Number(10.0)));
        assert!(matches!(
            resno.decode(&Value::from("ALA")),
            Err(ParseErrorKind::TypeMismatch { .. })
        ));
        assert!(resno.decode(&Value::from(1.5)).is_err());

        let name = dict.get("name").unwrap();
        assert_eq!(name.decode(&Value::from(1)), Ok(Value::from("1")));

        let bfactor = dict.get("bfactor").unwrap();
        assert_eq!(bfactor.decode(&Value::from("2.5")), Ok(Value::Number(2.5)));
    }

    #[test]
    fn test_reserved_words_longest_first() {
        let reserved = ReservedWords::new(["resn", "resno", "RESNO", "x"]);
        assert_eq!(reserved.len(), 3);
        assert_eq!(reserved.iter().next(), Some("resno"));
        assert_eq!(reserved.matches_at("resno 5"), Some("resno"));
        assert_eq!(reserved.matches_at("resn ALA"), Some("resn"));
        assert_eq!(reserved.matches_at("resnox"), None);
        assert!(reserved.contains("X"));
    }
}
