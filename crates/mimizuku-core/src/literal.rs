//! Data values attached to data-role assertions.

use crate::name::Name;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod vocab {
    pub const RDFS_LITERAL: &str = "http://www.w3.org/2000/01/rdf-schema#Literal";
    pub const RDF_PLAIN_LITERAL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#PlainLiteral";
    pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const XSD_INT: &str = "http://www.w3.org/2001/XMLSchema#int";
    pub const XSD_LONG: &str = "http://www.w3.org/2001/XMLSchema#long";
    pub const XSD_NON_NEGATIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#nonNegativeInteger";
    pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const XSD_FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
}

/// A lexical form with its datatype (and optional language tag).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    pub datatype: Name,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Literal {
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<Name>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: datatype.into(),
            lang: None,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::typed(value, vocab::XSD_STRING)
    }

    pub fn lang_string(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            lexical: value.into(),
            datatype: Name::new(vocab::RDF_PLAIN_LITERAL),
            lang: Some(lang.into()),
        }
    }

    pub fn integer(value: i64) -> Self {
        Self::typed(value.to_string(), vocab::XSD_INTEGER)
    }

    pub fn boolean(value: bool) -> Self {
        Self::typed(value.to_string(), vocab::XSD_BOOLEAN)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lang {
            Some(lang) => write!(f, "\"{}\"@{}", self.lexical, lang),
            None => write!(f, "\"{}\"^^{}", self.lexical, self.datatype.local_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let lit = Literal::integer(42);
        assert_eq!(lit.lexical, "42");
        assert_eq!(lit.datatype.as_str(), vocab::XSD_INTEGER);
        assert_eq!(Literal::boolean(true).lexical, "true");
        assert_eq!(Literal::lang_string("hi", "en").to_string(), "\"hi\"@en");
    }

    #[test]
    fn test_display_uses_local_datatype() {
        assert_eq!(Literal::integer(7).to_string(), "\"7\"^^integer");
    }
}
