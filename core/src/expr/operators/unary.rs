use crate::ast::UnaryOperator;
use crate::error::EvaluationError;
use crate::expr::InternalValue;
use crate::types::{ValueType, ValueTypeProvider};

use super::{
    expect_numeric, expect_operand, invalid_operands, is_integer, OperandTypeError, Operator,
    OperatorRegistry,
};

pub(super) fn register(registry: &mut OperatorRegistry) {
    use UnaryOperator::*;

    registry.register(Operator::Unary(Not), boolean_type, not);
    registry.register(Operator::Unary(Plus), signed_type, plus);
    registry.register(Operator::Unary(Minus), signed_type, minus);
    registry.register(Operator::Unary(Sqrt), decimal_type, sqrt);
    registry.register(Operator::Unary(Floor), rounding_type, floor);
    registry.register(Operator::Unary(Ceil), rounding_type, ceil);
    registry.register(Operator::Unary(Round), rounding_type, round);
    registry.register(Operator::Unary(Lowercase), text_type, lowercase);
    registry.register(Operator::Unary(Uppercase), text_type, uppercase);
    registry.register(Operator::Unary(AsText), as_text_type, as_text);
    registry.register(Operator::Unary(AsInteger), as_integer_type, as_integer);
    registry.register(Operator::Unary(AsDecimal), as_decimal_type, as_decimal);
    registry.register(Operator::Unary(AsBoolean), as_boolean_type, as_boolean);
    registry.register(Operator::Unary(LengthOf), length_type, length_of);
}

/* ===================== Type computers ===================== */

fn boolean_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    expect_operand(operands, 0, &ValueType::BOOLEAN, provider)?;
    Ok(ValueType::BOOLEAN)
}

/// `+x` and `-x` keep integers integral
fn signed_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    expect_numeric(operands, 0, provider)?;
    if is_integer(&operands[0], provider) {
        Ok(ValueType::INTEGER)
    } else {
        Ok(ValueType::DECIMAL)
    }
}

fn decimal_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    expect_numeric(operands, 0, provider)?;
    Ok(ValueType::DECIMAL)
}

fn rounding_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    expect_numeric(operands, 0, provider)?;
    Ok(ValueType::INTEGER)
}

fn text_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    expect_operand(operands, 0, &ValueType::TEXT, provider)?;
    Ok(ValueType::TEXT)
}

/// Accepts any of `accepted`, producing `result`
fn conversion_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
    accepted: &[ValueType],
    result: ValueType,
) -> Result<ValueType, OperandTypeError> {
    let operand = operands
        .first()
        .ok_or_else(|| OperandTypeError::whole("Missing operand"))?;
    if accepted.iter().any(|t| provider.is_convertible(operand, t)) {
        return Ok(result);
    }
    let names: Vec<String> = accepted.iter().map(ToString::to_string).collect();
    Err(OperandTypeError::at(
        0,
        format!(
            "The operand needs to be of type {} but is of type {}",
            names.join(" or "),
            operand
        ),
    ))
}

fn as_text_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    conversion_type(
        operands,
        provider,
        &[ValueType::TEXT, ValueType::DECIMAL, ValueType::BOOLEAN],
        ValueType::TEXT,
    )
}

fn as_integer_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    conversion_type(
        operands,
        provider,
        &[ValueType::TEXT, ValueType::DECIMAL],
        ValueType::INTEGER,
    )
}

fn as_decimal_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    conversion_type(
        operands,
        provider,
        &[ValueType::TEXT, ValueType::DECIMAL],
        ValueType::DECIMAL,
    )
}

fn as_boolean_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    conversion_type(
        operands,
        provider,
        &[ValueType::TEXT, ValueType::BOOLEAN],
        ValueType::BOOLEAN,
    )
}

fn length_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    let operand = operands
        .first()
        .ok_or_else(|| OperandTypeError::whole("Missing operand"))?;
    if operand.is_collection() || provider.is_convertible(operand, &ValueType::TEXT) {
        return Ok(ValueType::INTEGER);
    }
    Err(OperandTypeError::at(
        0,
        format!(
            "The operand needs to be of type Text or a collection but is of type {}",
            operand
        ),
    ))
}

/* ===================== Evaluators ===================== */

fn operand(
    operands: &[InternalValue],
    operator: UnaryOperator,
) -> Result<&InternalValue, EvaluationError> {
    operands
        .first()
        .ok_or_else(|| invalid_operands(Operator::Unary(operator), operands))
}

fn not(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    match operand(operands, UnaryOperator::Not)? {
        InternalValue::Boolean(b) => Ok(InternalValue::Boolean(!b)),
        _ => Err(invalid_operands(Operator::Unary(UnaryOperator::Not), operands)),
    }
}

fn plus(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    match operand(operands, UnaryOperator::Plus)? {
        value @ (InternalValue::Integer(_) | InternalValue::Decimal(_)) => Ok(value.clone()),
        _ => Err(invalid_operands(Operator::Unary(UnaryOperator::Plus), operands)),
    }
}

fn minus(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    match operand(operands, UnaryOperator::Minus)? {
        InternalValue::Integer(i) => i
            .checked_neg()
            .map(InternalValue::Integer)
            .ok_or_else(|| EvaluationError::Arithmetic(format!("-{} overflows", i))),
        InternalValue::Decimal(d) => Ok(InternalValue::Decimal(-d)),
        _ => Err(invalid_operands(Operator::Unary(UnaryOperator::Minus), operands)),
    }
}

fn sqrt(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    let value = operand(operands, UnaryOperator::Sqrt)?
        .as_decimal()
        .ok_or_else(|| invalid_operands(Operator::Unary(UnaryOperator::Sqrt), operands))?;
    if value < 0.0 {
        return Err(EvaluationError::Arithmetic(format!(
            "square root of negative number {}",
            value
        )));
    }
    Ok(InternalValue::Decimal(value.sqrt()))
}

fn to_integer(value: f64) -> Result<InternalValue, EvaluationError> {
    if !value.is_finite() || value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(EvaluationError::Arithmetic(format!(
            "{} does not fit into an integer",
            value
        )));
    }
    Ok(InternalValue::Integer(value as i64))
}

fn rounded(
    operands: &[InternalValue],
    operator: UnaryOperator,
    round: fn(f64) -> f64,
) -> Result<InternalValue, EvaluationError> {
    match operand(operands, operator)? {
        InternalValue::Integer(i) => Ok(InternalValue::Integer(*i)),
        InternalValue::Decimal(d) => to_integer(round(*d)),
        _ => Err(invalid_operands(Operator::Unary(operator), operands)),
    }
}

fn floor(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    rounded(operands, UnaryOperator::Floor, f64::floor)
}

fn ceil(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    rounded(operands, UnaryOperator::Ceil, f64::ceil)
}

fn round(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    rounded(operands, UnaryOperator::Round, f64::round)
}

fn lowercase(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    match operand(operands, UnaryOperator::Lowercase)? {
        InternalValue::Text(s) => Ok(InternalValue::Text(s.to_lowercase())),
        _ => Err(invalid_operands(Operator::Unary(UnaryOperator::Lowercase), operands)),
    }
}

fn uppercase(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    match operand(operands, UnaryOperator::Uppercase)? {
        InternalValue::Text(s) => Ok(InternalValue::Text(s.to_uppercase())),
        _ => Err(invalid_operands(Operator::Unary(UnaryOperator::Uppercase), operands)),
    }
}

fn as_text(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    let text = match operand(operands, UnaryOperator::AsText)? {
        InternalValue::Text(s) => s.clone(),
        InternalValue::Integer(i) => i.to_string(),
        InternalValue::Decimal(d) => d.to_string(),
        InternalValue::Boolean(b) => b.to_string(),
        _ => return Err(invalid_operands(Operator::Unary(UnaryOperator::AsText), operands)),
    };
    Ok(InternalValue::Text(text))
}

fn conversion_error(text: impl Into<String>, target: &str) -> EvaluationError {
    EvaluationError::Conversion {
        text: text.into(),
        target: target.to_string(),
    }
}

fn as_integer(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    match operand(operands, UnaryOperator::AsInteger)? {
        InternalValue::Integer(i) => Ok(InternalValue::Integer(*i)),
        InternalValue::Decimal(d) if d.fract() == 0.0 => {
            to_integer(*d).map_err(|_| conversion_error(d.to_string(), "Integer"))
        }
        InternalValue::Decimal(d) => Err(conversion_error(d.to_string(), "Integer")),
        InternalValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(InternalValue::Integer)
            .map_err(|_| conversion_error(s.as_str(), "Integer")),
        _ => Err(invalid_operands(Operator::Unary(UnaryOperator::AsInteger), operands)),
    }
}

fn as_decimal(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    match operand(operands, UnaryOperator::AsDecimal)? {
        InternalValue::Integer(i) => Ok(InternalValue::Decimal(*i as f64)),
        InternalValue::Decimal(d) => Ok(InternalValue::Decimal(*d)),
        InternalValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(d) if d.is_finite() => Ok(InternalValue::Decimal(d)),
            _ => Err(conversion_error(s.as_str(), "Decimal")),
        },
        _ => Err(invalid_operands(Operator::Unary(UnaryOperator::AsDecimal), operands)),
    }
}

fn as_boolean(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    match operand(operands, UnaryOperator::AsBoolean)? {
        InternalValue::Boolean(b) => Ok(InternalValue::Boolean(*b)),
        InternalValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(InternalValue::Boolean(true)),
            "false" => Ok(InternalValue::Boolean(false)),
            _ => Err(conversion_error(s.as_str(), "Boolean")),
        },
        _ => Err(invalid_operands(Operator::Unary(UnaryOperator::AsBoolean), operands)),
    }
}

fn length_of(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    let length = match operand(operands, UnaryOperator::LengthOf)? {
        InternalValue::Text(s) => s.chars().count(),
        InternalValue::Collection(items) => items.len(),
        _ => return Err(invalid_operands(Operator::Unary(UnaryOperator::LengthOf), operands)),
    };
    i64::try_from(length)
        .map(InternalValue::Integer)
        .map_err(|_| EvaluationError::Arithmetic(format!("length {} overflows", length)))
}
