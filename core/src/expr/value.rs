//! The internal value domain produced by evaluation.

use std::fmt;

use regex::Regex;

use crate::ast::{ConstraintId, TransformId};
use crate::cells::CellRange;
use crate::types::ValueType;

/// A compiled regular expression literal.
///
/// Two values are equal when their patterns are.
#[derive(Debug, Clone)]
pub struct RegexValue {
    regex: Regex,
}

impl RegexValue {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl PartialEq for RegexValue {
    fn eq(&self, other: &Self) -> bool {
        self.pattern() == other.pattern()
    }
}

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum InternalValue {
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
    Regex(RegexValue),
    CellRange(CellRange),
    Collection(Vec<InternalValue>),
    ConstraintRef(ConstraintId),
    TransformRef(TransformId),
    /// `"column" oftype TYPE`
    ValuetypeAssignment { column: String, value_type: ValueType },
}

impl InternalValue {
    /// Short name of the value's kind, for messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            InternalValue::Boolean(_) => "boolean",
            InternalValue::Integer(_) => "integer",
            InternalValue::Decimal(_) => "decimal",
            InternalValue::Text(_) => "text",
            InternalValue::Regex(_) => "regex",
            InternalValue::CellRange(_) => "cell range",
            InternalValue::Collection(_) => "collection",
            InternalValue::ConstraintRef(_) => "constraint",
            InternalValue::TransformRef(_) => "transform",
            InternalValue::ValuetypeAssignment { .. } => "value type assignment",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            InternalValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            InternalValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value; integers widen to decimals
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            InternalValue::Integer(i) => Some(*i as f64),
            InternalValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            InternalValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_regex(&self) -> Option<&RegexValue> {
        match self {
            InternalValue::Regex(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_cell_range(&self) -> Option<&CellRange> {
        match self {
            InternalValue::CellRange(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[InternalValue]> {
        match self {
            InternalValue::Collection(items) => Some(items),
            _ => None,
        }
    }

    /// Equality as the `==` operator sees it: integers and decimals compare
    /// numerically, collections element-wise.
    pub fn loosely_equals(&self, other: &InternalValue) -> bool {
        match (self, other) {
            (InternalValue::Integer(a), InternalValue::Integer(b)) => a == b,
            (InternalValue::Integer(_) | InternalValue::Decimal(_), _)
                if matches!(other, InternalValue::Integer(_) | InternalValue::Decimal(_)) =>
            {
                self.as_decimal() == other.as_decimal()
            }
            (InternalValue::Collection(a), InternalValue::Collection(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loosely_equals(y))
            }
            _ => self == other,
        }
    }
}

impl fmt::Display for InternalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternalValue::Boolean(b) => write!(f, "{}", b),
            InternalValue::Integer(i) => write!(f, "{}", i),
            InternalValue::Decimal(d) => write!(f, "{:?}", d),
            InternalValue::Text(s) => write!(f, "\"{}\"", s),
            InternalValue::Regex(r) => write!(f, "/{}/", r.pattern()),
            InternalValue::CellRange(r) => write!(f, "{}", r),
            InternalValue::Collection(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            InternalValue::ConstraintRef(id) => write!(f, "constraint {}", id),
            InternalValue::TransformRef(id) => write!(f, "transform {}", id),
            InternalValue::ValuetypeAssignment { column, value_type } => {
                write!(f, "\"{}\" oftype {}", column, value_type)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_source_syntax() {
        let value = InternalValue::Collection(vec![
            InternalValue::Integer(1),
            InternalValue::Decimal(2.0),
            InternalValue::Text("x".to_string()),
        ]);
        assert_eq!(value.to_string(), "[1, 2.0, \"x\"]");

        let regex = InternalValue::Regex(RegexValue::new("^a+$").unwrap());
        assert_eq!(regex.to_string(), "/^a+$/");
    }

    #[test]
    fn test_loose_equality_widens_integers() {
        assert!(InternalValue::Integer(2).loosely_equals(&InternalValue::Decimal(2.0)));
        assert!(!InternalValue::Integer(2).loosely_equals(&InternalValue::Text("2".into())));
        assert!(InternalValue::Collection(vec![InternalValue::Integer(1)])
            .loosely_equals(&InternalValue::Collection(vec![InternalValue::Decimal(1.0)])));
    }

    #[test]
    fn test_regex_equality_by_pattern() {
        assert_eq!(RegexValue::new("a|b").unwrap(), RegexValue::new("a|b").unwrap());
        assert_ne!(RegexValue::new("a").unwrap(), RegexValue::new("b").unwrap());
    }
}
