//! Dialects and transpile options
//!
//! A [`Dialect`] bundles the property dictionary, the keyword table and the
//! reserved-word views derived from them. It is built once and never mutated,
//! so one value can serve any number of concurrent transpile calls.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use molsel_query::QueryExpression;

use crate::error::{ParseResult, UnknownDialect};
use crate::keywords;
use crate::operators::BOOLEAN_OPERATORS;
use crate::parser::Grammar;
use crate::properties::{PropertyDescriptor, PropertyDictionary, ReservedWords, RASMOL_PROPERTIES};
use crate::value::VALUE_OPERATORS;

/// Supported selection languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    /// RasMol/Jmol-style selections (`ALA:A.CA`, `resno >= 10`)
    RasMol,
}

impl DialectKind {
    pub const ALL: [DialectKind; 1] = [DialectKind::RasMol];

    pub fn name(self) -> &'static str {
        match self {
            DialectKind::RasMol => "rasmol",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DialectKind {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DialectKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDialect(s.to_string()))
    }
}

/// Which mmCIF identifier columns chain/residue/atom properties resolve to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IdentifierScheme {
    /// Author-provided identifiers (`auth_asym_id`, `auth_seq_id`, ...)
    #[default]
    Auth,
    /// Archive-assigned identifiers (`label_asym_id`, `label_seq_id`, ...)
    Label,
}

/// Options fixed when a dialect is built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranspileOptions {
    pub identifier_scheme: IdentifierScheme,
    /// When false, `LIKE` and double-quoted patterns ignore case
    pub case_sensitive_like: bool,
}

impl TranspileOptions {
    pub fn with_identifier_scheme(mut self, scheme: IdentifierScheme) -> Self {
        self.identifier_scheme = scheme;
        self
    }

    pub fn with_case_sensitive_like(mut self, value: bool) -> Self {
        self.case_sensitive_like = value;
        self
    }
}

/// An immutable, ready-to-use selection language
#[derive(Debug, Clone)]
pub struct Dialect {
    kind: DialectKind,
    options: TranspileOptions,
    properties: PropertyDictionary,
    /// Properties, keywords and operator words
    reserved: ReservedWords,
    /// Properties and operator words; keywords may appear as values
    value_reserved: ReservedWords,
    /// Operator words only, for values whose property is already known
    operator_reserved: ReservedWords,
}

static RASMOL: OnceLock<Dialect> = OnceLock::new();

impl Dialect {
    /// Build a dialect with the given options
    pub fn new(kind: DialectKind, options: TranspileOptions) -> Self {
        let descriptors = match kind {
            DialectKind::RasMol => RASMOL_PROPERTIES,
        };
        let properties = PropertyDictionary::new(descriptors.iter().map(|d| PropertyDescriptor {
            property: match options.identifier_scheme {
                IdentifierScheme::Auth => d.property,
                IdentifierScheme::Label => d.property.to_label(),
            },
            ..d.clone()
        }));

        let operator_words: Vec<&str> = BOOLEAN_OPERATORS
            .words()
            .chain(VALUE_OPERATORS.words())
            .collect();
        let reserved = ReservedWords::new(
            properties
                .names()
                .chain(keywords::names())
                .chain(operator_words.iter().copied()),
        );
        let value_reserved =
            ReservedWords::new(properties.names().chain(operator_words.iter().copied()));
        let operator_reserved = ReservedWords::new(operator_words.iter().copied());

        log::trace!(
            "built {} dialect: {} properties, {} reserved words",
            kind,
            properties.len(),
            reserved.len()
        );

        Dialect {
            kind,
            options,
            properties,
            reserved,
            value_reserved,
            operator_reserved,
        }
    }

    /// Shared dialect with default options
    pub fn get(kind: DialectKind) -> &'static Dialect {
        match kind {
            DialectKind::RasMol => {
                RASMOL.get_or_init(|| Dialect::new(kind, TranspileOptions::default()))
            }
        }
    }

    pub fn kind(&self) -> DialectKind {
        self.kind
    }

    pub fn options(&self) -> &TranspileOptions {
        &self.options
    }

    pub fn properties(&self) -> &PropertyDictionary {
        &self.properties
    }

    /// Words that cannot start a bare identifier
    pub fn reserved_words(&self) -> &ReservedWords {
        &self.reserved
    }

    /// Words that cannot be read as a bare value inside a comparison
    pub fn value_reserved_words(&self) -> &ReservedWords {
        &self.value_reserved
    }

    /// Words that cannot be read as a bare value after a property name
    pub fn operator_words(&self) -> &ReservedWords {
        &self.operator_reserved
    }

    /// Translate a selection into a query expression
    pub fn transpile(&self, text: &str) -> ParseResult<QueryExpression> {
        log::debug!("transpiling {} selection {:?}", self.kind, text);
        let result = Grammar::new(self).parse(text);
        if let Err(e) = &result {
            log::debug!("{} selection {:?} rejected: {}", self.kind, text, e);
        }
        result
    }
}
