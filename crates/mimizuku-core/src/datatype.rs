//! Datatype oracle for literal nodes.
//!
//! A literal node's label contributes positive data ranges (`Datatype`,
//! `Value`) and negated ones. The oracle decides whether some data value
//! satisfies all of them at once.

use crate::error::{ReasonerError, Result};
use crate::literal::{vocab, Literal};
use crate::name::Name;
use crate::term::{Concept, ConceptKind};
use std::fmt;

pub trait DatatypeOracle: Send + Sync + fmt::Debug {
    /// `positive` holds data ranges that must hold, `negative` the ranges
    /// (given without their `¬`) that must not. `value` is the literal a
    /// node was created for, if any.
    fn is_satisfiable(
        &self,
        positive: &[Concept],
        negative: &[Concept],
        value: Option<&Literal>,
    ) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    Literal,
    PlainLiteral,
    String,
    Boolean,
    Decimal,
    Integer,
    Long,
    Int,
    NonNegativeInteger,
    Double,
    Float,
    Other(Name),
}

impl Kind {
    fn of(datatype: &Name) -> Kind {
        match datatype.as_str() {
            vocab::RDFS_LITERAL => Kind::Literal,
            vocab::RDF_PLAIN_LITERAL => Kind::PlainLiteral,
            vocab::XSD_STRING => Kind::String,
            vocab::XSD_BOOLEAN => Kind::Boolean,
            vocab::XSD_DECIMAL => Kind::Decimal,
            vocab::XSD_INTEGER => Kind::Integer,
            vocab::XSD_LONG => Kind::Long,
            vocab::XSD_INT => Kind::Int,
            vocab::XSD_NON_NEGATIVE_INTEGER => Kind::NonNegativeInteger,
            vocab::XSD_DOUBLE => Kind::Double,
            vocab::XSD_FLOAT => Kind::Float,
            _ => Kind::Other(datatype.clone()),
        }
    }

    fn is_integer_like(&self) -> bool {
        matches!(self, Kind::Integer | Kind::Long | Kind::Int | Kind::NonNegativeInteger)
    }

    /// Value space of `self` includes that of `inner`.
    fn contains(&self, inner: &Kind) -> bool {
        self == inner
            || *self == Kind::Literal
            || (*self == Kind::PlainLiteral && *inner == Kind::String)
            || (*self == Kind::Decimal && inner.is_integer_like())
            || (*self == Kind::Integer && inner.is_integer_like())
            || (*self == Kind::Long && *inner == Kind::Int)
    }

    fn intersects(&self, other: &Kind) -> bool {
        self.contains(other)
            || other.contains(self)
            || (self.is_integer_like() && other.is_integer_like())
    }

    fn admits(&self, value: &DataValue) -> bool {
        match (self, value) {
            (Kind::Literal, _) => true,
            (Kind::PlainLiteral, DataValue::Plain(..)) => true,
            (Kind::String, DataValue::Plain(_, None)) => true,
            (Kind::Boolean, DataValue::Boolean(_)) => true,
            (Kind::Decimal, DataValue::Integer(_) | DataValue::Decimal(_)) => true,
            (Kind::Integer, DataValue::Integer(_)) => true,
            (Kind::Long, DataValue::Integer(i)) => i64::try_from(*i).is_ok(),
            (Kind::Int, DataValue::Integer(i)) => i32::try_from(*i).is_ok(),
            (Kind::NonNegativeInteger, DataValue::Integer(i)) => *i >= 0,
            (Kind::Double, DataValue::Double(_)) => true,
            (Kind::Float, DataValue::Float(_)) => true,
            (Kind::Other(name), DataValue::Other(_, datatype)) => name == datatype,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum DataValue {
    Plain(String, Option<String>),
    Boolean(bool),
    Integer(i128),
    /// Normalized `digits.digits` with a non-empty fraction.
    Decimal(String),
    Double(f64),
    Float(f32),
    Other(String, Name),
}

fn invalid(literal: &Literal) -> ReasonerError {
    ReasonerError::InvalidLiteral(literal.to_string())
}

fn parse_integer(lexical: &str) -> Option<i128> {
    let trimmed = lexical.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    digits.parse::<i128>().ok()
}

fn parse_decimal(lexical: &str) -> Option<DataValue> {
    let trimmed = lexical.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let int_part = int_part.trim_start_matches('0');
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        let magnitude: i128 = if int_part.is_empty() { 0 } else { int_part.parse().ok()? };
        return Some(DataValue::Integer(if negative { -magnitude } else { magnitude }));
    }
    let sign = if negative { "-" } else { "" };
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    Some(DataValue::Decimal(format!("{}{}.{}", sign, int_part, frac_part)))
}

fn parse_float(lexical: &str) -> Option<f64> {
    match lexical.trim() {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        other => other.parse::<f64>().ok(),
    }
}

fn parse(literal: &Literal) -> Result<DataValue> {
    if let Some(lang) = &literal.lang {
        return Ok(DataValue::Plain(literal.lexical.clone(), Some(lang.to_lowercase())));
    }
    let kind = Kind::of(&literal.datatype);
    let value = match &kind {
        Kind::Literal | Kind::PlainLiteral | Kind::String => DataValue::Plain(literal.lexical.clone(), None),
        Kind::Boolean => match literal.lexical.trim() {
            "true" | "1" => DataValue::Boolean(true),
            "false" | "0" => DataValue::Boolean(false),
            _ => return Err(invalid(literal)),
        },
        Kind::Decimal => parse_decimal(&literal.lexical).ok_or_else(|| invalid(literal))?,
        k if k.is_integer_like() => {
            DataValue::Integer(parse_integer(&literal.lexical).ok_or_else(|| invalid(literal))?)
        }
        Kind::Double => DataValue::Double(parse_float(&literal.lexical).ok_or_else(|| invalid(literal))?),
        Kind::Float => {
            DataValue::Float(parse_float(&literal.lexical).ok_or_else(|| invalid(literal))? as f32)
        }
        _ => DataValue::Other(literal.lexical.clone(), literal.datatype.clone()),
    };
    if !kind.admits(&value) {
        return Err(invalid(literal));
    }
    Ok(value)
}

/// XSD datatypes commonly found in OWL ontologies.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDatatypes;

impl BuiltinDatatypes {
    pub fn new() -> Self {
        BuiltinDatatypes
    }

    /// Parses a literal against its own datatype.
    pub fn validate(&self, literal: &Literal) -> Result<()> {
        parse(literal).map(|_| ())
    }

    fn check_value(
        &self,
        value: &DataValue,
        kinds: &[Kind],
        values: &[DataValue],
        excluded_kinds: &[Kind],
        excluded_values: &[DataValue],
    ) -> bool {
        kinds.iter().all(|k| k.admits(value))
            && values.iter().all(|v| v == value)
            && !excluded_kinds.iter().any(|k| k.admits(value))
            && !excluded_values.iter().any(|v| v == value)
    }
}

fn split(ranges: &[Concept]) -> Result<(Vec<Kind>, Vec<DataValue>)> {
    let mut kinds = Vec::new();
    let mut values = Vec::new();
    for range in ranges {
        match range.kind() {
            ConceptKind::Datatype(name) => kinds.push(Kind::of(name)),
            ConceptKind::Value(literal) => values.push(parse(literal)?),
            ConceptKind::Top => kinds.push(Kind::Literal),
            _ => {
                return Err(ReasonerError::internal(format!(
                    "unexpected data range shape {}",
                    range
                )))
            }
        }
    }
    Ok((kinds, values))
}

impl DatatypeOracle for BuiltinDatatypes {
    fn is_satisfiable(
        &self,
        positive: &[Concept],
        negative: &[Concept],
        value: Option<&Literal>,
    ) -> Result<bool> {
        let (kinds, values) = split(positive)?;
        let (excluded_kinds, excluded_values) = split(negative)?;

        if let Some(literal) = value {
            let value = parse(literal)?;
            return Ok(self.check_value(&value, &kinds, &values, &excluded_kinds, &excluded_values));
        }
        if let Some(first) = values.first() {
            return Ok(self.check_value(first, &kinds, &values, &excluded_kinds, &excluded_values));
        }

        for (i, a) in kinds.iter().enumerate() {
            if kinds[i + 1..].iter().any(|b| !a.intersects(b)) {
                return Ok(false);
            }
        }
        if excluded_kinds
            .iter()
            .any(|n| kinds.iter().any(|k| n.contains(k)) || *n == Kind::Literal)
        {
            return Ok(false);
        }
        if kinds.contains(&Kind::Boolean) {
            let mut remaining = vec![DataValue::Boolean(true), DataValue::Boolean(false)];
            remaining.retain(|v| !excluded_values.contains(v));
            return Ok(!remaining.is_empty());
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(iri: &str) -> Concept {
        Concept::datatype(iri)
    }

    #[test]
    fn test_incompatible_families() {
        let oracle = BuiltinDatatypes::new();
        assert!(!oracle
            .is_satisfiable(&[dt(vocab::XSD_STRING), dt(vocab::XSD_INTEGER)], &[], None)
            .unwrap());
        assert!(oracle
            .is_satisfiable(&[dt(vocab::XSD_INT), dt(vocab::XSD_NON_NEGATIVE_INTEGER)], &[], None)
            .unwrap());
        assert!(oracle
            .is_satisfiable(&[dt(vocab::XSD_DECIMAL), dt(vocab::XSD_LONG)], &[], None)
            .unwrap());
    }

    #[test]
    fn test_value_membership() {
        let oracle = BuiltinDatatypes::new();
        let five = Literal::integer(5);
        assert!(oracle
            .is_satisfiable(&[dt(vocab::XSD_DECIMAL)], &[], Some(&five))
            .unwrap());
        assert!(!oracle
            .is_satisfiable(&[dt(vocab::XSD_STRING)], &[], Some(&five))
            .unwrap());
        let decimal_five = Literal::typed("5.000", vocab::XSD_DECIMAL);
        assert!(!oracle
            .is_satisfiable(&[], &[Concept::value(decimal_five)], Some(&five))
            .unwrap());
    }

    #[test]
    fn test_out_of_range_int() {
        let oracle = BuiltinDatatypes::new();
        let big = Literal::typed("3000000000", vocab::XSD_INT);
        assert!(matches!(
            oracle.is_satisfiable(&[], &[], Some(&big)),
            Err(ReasonerError::InvalidLiteral(_))
        ));
        let ok = Literal::typed("3000000000", vocab::XSD_LONG);
        assert!(oracle.validate(&ok).is_ok());
    }

    #[test]
    fn test_invalid_lexical_form() {
        let oracle = BuiltinDatatypes::new();
        let bad = Literal::typed("abc", vocab::XSD_INTEGER);
        assert!(oracle.validate(&bad).is_err());
        assert!(oracle.validate(&Literal::typed("maybe", vocab::XSD_BOOLEAN)).is_err());
    }

    #[test]
    fn test_boolean_domain_exhaustion() {
        let oracle = BuiltinDatatypes::new();
        let negative = [
            Concept::value(Literal::boolean(true)),
            Concept::value(Literal::typed("0", vocab::XSD_BOOLEAN)),
        ];
        assert!(!oracle
            .is_satisfiable(&[dt(vocab::XSD_BOOLEAN)], &negative, None)
            .unwrap());
        assert!(oracle
            .is_satisfiable(&[dt(vocab::XSD_BOOLEAN)], &negative[..1], None)
            .unwrap());
    }

    #[test]
    fn test_negated_supertype_excludes() {
        let oracle = BuiltinDatatypes::new();
        assert!(!oracle
            .is_satisfiable(&[dt(vocab::XSD_INT)], &[dt(vocab::XSD_INTEGER)], None)
            .unwrap());
        assert!(oracle
            .is_satisfiable(&[dt(vocab::XSD_INTEGER)], &[dt(vocab::XSD_INT)], None)
            .unwrap());
    }

    #[test]
    fn test_conflicting_value_nominals() {
        let oracle = BuiltinDatatypes::new();
        let values = [
            Concept::value(Literal::integer(1)),
            Concept::value(Literal::integer(2)),
        ];
        assert!(!oracle.is_satisfiable(&values, &[], None).unwrap());
        assert!(oracle.is_satisfiable(&values[..1], &[], None).unwrap());
    }
}
