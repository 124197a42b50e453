//! Parsing raw runtime parameter text into internal values.

use crate::error::ParameterParseError;
use crate::expr::{InternalValue, RegexValue};

use super::{PrimitiveValueType, ValueType, ValueTypeProvider};

/// Parse `raw` as a value of `value_type`.
///
/// User-defined types are parsed as their primitive terminal. Only types
/// that are allowed as runtime parameters can be parsed.
pub fn parse_value_to_internal_representation(
    raw: &str,
    value_type: &ValueType,
    provider: &ValueTypeProvider<'_>,
) -> Result<InternalValue, ParameterParseError> {
    let terminal = provider
        .terminal_type(value_type)
        .ok_or_else(|| ParameterParseError::NotAllowed(value_type.to_string()))?;
    let ValueType::Primitive(primitive) = terminal else {
        return Err(ParameterParseError::NotAllowed(value_type.to_string()));
    };

    let malformed = || ParameterParseError::Malformed {
        value: raw.to_string(),
        expected: value_type.to_string(),
    };

    match primitive {
        PrimitiveValueType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(InternalValue::Boolean(true)),
            "false" => Ok(InternalValue::Boolean(false)),
            _ => Err(malformed()),
        },
        PrimitiveValueType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(InternalValue::Integer)
            .map_err(|_| malformed()),
        PrimitiveValueType::Decimal => match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(InternalValue::Decimal(value)),
            _ => Err(malformed()),
        },
        PrimitiveValueType::Text => Ok(InternalValue::Text(raw.to_string())),
        PrimitiveValueType::Regex => RegexValue::new(raw)
            .map(InternalValue::Regex)
            .map_err(|_| malformed()),
        PrimitiveValueType::CellRange
        | PrimitiveValueType::Constraint
        | PrimitiveValueType::ValuetypeAssignment
        | PrimitiveValueType::Transform => {
            Err(ParameterParseError::NotAllowed(value_type.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Model;

    fn parse(raw: &str, value_type: ValueType) -> Result<InternalValue, ParameterParseError> {
        let model = Model::new();
        let provider = ValueTypeProvider::new(&model);
        parse_value_to_internal_representation(raw, &value_type, &provider)
    }

    #[test]
    fn test_parse_primitives() {
        assert_eq!(parse("42", ValueType::INTEGER), Ok(InternalValue::Integer(42)));
        assert_eq!(parse(" 2.5 ", ValueType::DECIMAL), Ok(InternalValue::Decimal(2.5)));
        assert_eq!(parse("TRUE", ValueType::BOOLEAN), Ok(InternalValue::Boolean(true)));
        assert_eq!(
            parse("some text", ValueType::TEXT),
            Ok(InternalValue::Text("some text".to_string()))
        );
    }

    #[test]
    fn test_parse_malformed_values() {
        assert!(matches!(
            parse("4.2", ValueType::INTEGER),
            Err(ParameterParseError::Malformed { .. })
        ));
        assert!(matches!(
            parse("yes", ValueType::BOOLEAN),
            Err(ParameterParseError::Malformed { .. })
        ));
        assert!(matches!(
            parse("NaN", ValueType::DECIMAL),
            Err(ParameterParseError::Malformed { .. })
        ));
    }

    #[test]
    fn test_parse_disallowed_type() {
        assert_eq!(
            parse("A1", ValueType::CELL_RANGE),
            Err(ParameterParseError::NotAllowed("CellRange".to_string()))
        );
        assert!(parse("x", ValueType::collection(ValueType::TEXT)).is_err());
    }
}
