use std::cmp::Ordering;

use crate::ast::BinaryOperator;
use crate::error::EvaluationError;
use crate::expr::InternalValue;
use crate::types::{ValueType, ValueTypeProvider};

use super::{
    expect_numeric, expect_operand, invalid_operands, is_integer, is_numeric, OperandTypeError,
    Operator, OperatorRegistry,
};

pub(super) fn register(registry: &mut OperatorRegistry) {
    use BinaryOperator::*;

    registry.register(Operator::Binary(Pow), decimal_type, pow);
    registry.register(Operator::Binary(Root), decimal_type, root);
    registry.register(Operator::Binary(Multiply), arithmetic_type, multiply);
    registry.register(Operator::Binary(Divide), decimal_type, divide);
    registry.register(Operator::Binary(Modulo), arithmetic_type, modulo);
    registry.register(Operator::Binary(Add), arithmetic_type, add);
    registry.register(Operator::Binary(Subtract), arithmetic_type, subtract);
    registry.register(Operator::Binary(Matches), matches_type, matches);
    registry.register(Operator::Binary(In), in_type, contains);
    registry.register(Operator::Binary(Less), relational_type, less);
    registry.register(Operator::Binary(LessEqual), relational_type, less_equal);
    registry.register(Operator::Binary(Greater), relational_type, greater);
    registry.register(Operator::Binary(GreaterEqual), relational_type, greater_equal);
    registry.register(Operator::Binary(Equal), equality_type, equal);
    registry.register(Operator::Binary(NotEqual), equality_type, not_equal);
    registry.register(Operator::Binary(Xor), logical_type, xor);
    registry.register(Operator::Binary(And), logical_type, and);
    registry.register(Operator::Binary(Or), logical_type, or);
}

/* ===================== Type computers ===================== */

fn decimal_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    expect_numeric(operands, 0, provider)?;
    expect_numeric(operands, 1, provider)?;
    Ok(ValueType::DECIMAL)
}

/// Integer when both sides are integral, Decimal otherwise
fn arithmetic_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    expect_numeric(operands, 0, provider)?;
    expect_numeric(operands, 1, provider)?;
    if is_integer(&operands[0], provider) && is_integer(&operands[1], provider) {
        Ok(ValueType::INTEGER)
    } else {
        Ok(ValueType::DECIMAL)
    }
}

fn relational_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    expect_numeric(operands, 0, provider)?;
    expect_numeric(operands, 1, provider)?;
    Ok(ValueType::BOOLEAN)
}

fn logical_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    expect_operand(operands, 0, &ValueType::BOOLEAN, provider)?;
    expect_operand(operands, 1, &ValueType::BOOLEAN, provider)?;
    Ok(ValueType::BOOLEAN)
}

fn matches_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    expect_operand(operands, 0, &ValueType::TEXT, provider)?;
    expect_operand(operands, 1, &ValueType::REGEX, provider)?;
    Ok(ValueType::BOOLEAN)
}

/// Both sides numeric, both Text or both Boolean
fn comparable(left: &ValueType, right: &ValueType, provider: &ValueTypeProvider<'_>) -> bool {
    (is_numeric(left, provider) && is_numeric(right, provider))
        || [ValueType::TEXT, ValueType::BOOLEAN].iter().any(|t| {
            provider.is_convertible(left, t) && provider.is_convertible(right, t)
        })
}

fn equality_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    let [left, right] = operands else {
        return Err(OperandTypeError::whole("Expected two operands"));
    };
    if !comparable(left, right, provider) {
        return Err(OperandTypeError::whole(format!(
            "Values of type {} cannot be compared with values of type {}",
            left, right
        )));
    }
    Ok(ValueType::BOOLEAN)
}

fn in_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    let [needle, haystack] = operands else {
        return Err(OperandTypeError::whole("Expected two operands"));
    };
    let searchable = [ValueType::TEXT, ValueType::INTEGER, ValueType::DECIMAL];
    if !searchable.iter().any(|t| provider.is_convertible(needle, t)) {
        return Err(OperandTypeError::at(
            0,
            format!(
                "The operand needs to be of type Text, Integer or Decimal but is of type {}",
                needle
            ),
        ));
    }
    match haystack {
        ValueType::EmptyCollection => Ok(ValueType::BOOLEAN),
        ValueType::Collection(element) if comparable(needle, element, provider) => {
            Ok(ValueType::BOOLEAN)
        }
        ValueType::Collection(element) => Err(OperandTypeError::whole(format!(
            "Values of type {} cannot be searched in a collection of {}",
            needle, element
        ))),
        other => Err(OperandTypeError::at(
            1,
            format!("The operand needs to be a collection but is of type {}", other),
        )),
    }
}

/* ===================== Evaluators ===================== */

fn pair(
    operands: &[InternalValue],
    operator: BinaryOperator,
) -> Result<(&InternalValue, &InternalValue), EvaluationError> {
    match operands {
        [left, right] => Ok((left, right)),
        _ => Err(invalid_operands(Operator::Binary(operator), operands)),
    }
}

fn numbers(
    operands: &[InternalValue],
    operator: BinaryOperator,
) -> Result<(f64, f64), EvaluationError> {
    let (left, right) = pair(operands, operator)?;
    match (left.as_decimal(), right.as_decimal()) {
        (Some(l), Some(r)) => Ok((l, r)),
        _ => Err(invalid_operands(Operator::Binary(operator), operands)),
    }
}

fn finite(value: f64, operator: BinaryOperator) -> Result<InternalValue, EvaluationError> {
    if value.is_finite() {
        Ok(InternalValue::Decimal(value))
    } else {
        Err(EvaluationError::Arithmetic(format!(
            "\"{}\" produced a non-finite result",
            operator
        )))
    }
}

fn overflow(operator: BinaryOperator) -> EvaluationError {
    EvaluationError::Arithmetic(format!("integer overflow in \"{}\"", operator))
}

/// Integer arithmetic when both sides are integers, decimal otherwise
fn arithmetic(
    operands: &[InternalValue],
    operator: BinaryOperator,
    integer: fn(i64, i64) -> Option<i64>,
    decimal: fn(f64, f64) -> f64,
) -> Result<InternalValue, EvaluationError> {
    let (left, right) = pair(operands, operator)?;
    if let (Some(l), Some(r)) = (left.as_integer(), right.as_integer()) {
        return integer(l, r)
            .map(InternalValue::Integer)
            .ok_or_else(|| overflow(operator));
    }
    let (l, r) = numbers(operands, operator)?;
    finite(decimal(l, r), operator)
}

fn pow(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    let (base, exponent) = numbers(operands, BinaryOperator::Pow)?;
    finite(base.powf(exponent), BinaryOperator::Pow)
}

fn root(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    let (radicand, degree) = numbers(operands, BinaryOperator::Root)?;
    if degree == 0.0 {
        return Err(EvaluationError::DivisionByZero);
    }
    if radicand >= 0.0 {
        return finite(radicand.powf(1.0 / degree), BinaryOperator::Root);
    }
    let integral = degree.fract() == 0.0;
    if integral && degree % 2.0 != 0.0 {
        return finite(-(-radicand).powf(1.0 / degree), BinaryOperator::Root);
    }
    Err(EvaluationError::Arithmetic(format!(
        "root of degree {} of negative number {}",
        degree, radicand
    )))
}

fn multiply(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    arithmetic(operands, BinaryOperator::Multiply, i64::checked_mul, |l, r| l * r)
}

fn add(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    arithmetic(operands, BinaryOperator::Add, i64::checked_add, |l, r| l + r)
}

fn subtract(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    arithmetic(operands, BinaryOperator::Subtract, i64::checked_sub, |l, r| l - r)
}

fn divide(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    let (dividend, divisor) = numbers(operands, BinaryOperator::Divide)?;
    if divisor == 0.0 {
        return Err(EvaluationError::DivisionByZero);
    }
    finite(dividend / divisor, BinaryOperator::Divide)
}

fn modulo(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    let (_, divisor) = numbers(operands, BinaryOperator::Modulo)?;
    if divisor == 0.0 {
        return Err(EvaluationError::DivisionByZero);
    }
    arithmetic(operands, BinaryOperator::Modulo, i64::checked_rem, |l, r| l % r)
}

fn matches(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    match pair(operands, BinaryOperator::Matches)? {
        (InternalValue::Text(text), InternalValue::Regex(regex)) => {
            Ok(InternalValue::Boolean(regex.regex().is_match(text)))
        }
        _ => Err(invalid_operands(Operator::Binary(BinaryOperator::Matches), operands)),
    }
}

fn contains(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    match pair(operands, BinaryOperator::In)? {
        (needle, InternalValue::Collection(items)) => Ok(InternalValue::Boolean(
            items.iter().any(|item| item.loosely_equals(needle)),
        )),
        _ => Err(invalid_operands(Operator::Binary(BinaryOperator::In), operands)),
    }
}

fn compare(
    operands: &[InternalValue],
    operator: BinaryOperator,
    accept: fn(Ordering) -> bool,
) -> Result<InternalValue, EvaluationError> {
    let ordering = match pair(operands, operator)? {
        (InternalValue::Integer(l), InternalValue::Integer(r)) => Some(l.cmp(r)),
        _ => {
            let (l, r) = numbers(operands, operator)?;
            l.partial_cmp(&r)
        }
    };
    Ok(InternalValue::Boolean(ordering.map_or(false, accept)))
}

fn less(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    compare(operands, BinaryOperator::Less, Ordering::is_lt)
}

fn less_equal(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    compare(operands, BinaryOperator::LessEqual, Ordering::is_le)
}

fn greater(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    compare(operands, BinaryOperator::Greater, Ordering::is_gt)
}

fn greater_equal(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    compare(operands, BinaryOperator::GreaterEqual, Ordering::is_ge)
}

fn equal(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    let (left, right) = pair(operands, BinaryOperator::Equal)?;
    Ok(InternalValue::Boolean(left.loosely_equals(right)))
}

fn not_equal(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    let (left, right) = pair(operands, BinaryOperator::NotEqual)?;
    Ok(InternalValue::Boolean(!left.loosely_equals(right)))
}

fn booleans(
    operands: &[InternalValue],
    operator: BinaryOperator,
) -> Result<(bool, bool), EvaluationError> {
    let (left, right) = pair(operands, operator)?;
    match (left.as_bool(), right.as_bool()) {
        (Some(l), Some(r)) => Ok((l, r)),
        _ => Err(invalid_operands(Operator::Binary(operator), operands)),
    }
}

fn xor(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    let (l, r) = booleans(operands, BinaryOperator::Xor)?;
    Ok(InternalValue::Boolean(l ^ r))
}

fn and(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    let (l, r) = booleans(operands, BinaryOperator::And)?;
    Ok(InternalValue::Boolean(l && r))
}

fn or(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    let (l, r) = booleans(operands, BinaryOperator::Or)?;
    Ok(InternalValue::Boolean(l || r))
}
