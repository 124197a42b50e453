//! Tests for operator typing and evaluation

use super::*;
use crate::ast::{BinaryOperator, Model, TernaryOperator, UnaryOperator};
use crate::expr::RegexValue;

// ============================================================================
// Helper Functions
// ============================================================================

fn type_of(operator: Operator, operands: &[ValueType]) -> Result<ValueType, OperandTypeError> {
    let model = Model::new();
    let provider = ValueTypeProvider::new(&model);
    OperatorRegistry::standard().compute_type(operator, operands, &provider)
}

fn eval(operator: Operator, operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    OperatorRegistry::standard().evaluate(operator, operands)
}

fn binary(operator: BinaryOperator) -> Operator {
    Operator::Binary(operator)
}

fn unary(operator: UnaryOperator) -> Operator {
    Operator::Unary(operator)
}

fn int(value: i64) -> InternalValue {
    InternalValue::Integer(value)
}

fn dec(value: f64) -> InternalValue {
    InternalValue::Decimal(value)
}

fn text(value: &str) -> InternalValue {
    InternalValue::Text(value.to_string())
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_standard_registry_covers_every_operator() {
    let registry = OperatorRegistry::standard();
    for op in UnaryOperator::ALL {
        assert!(registry.get(Operator::Unary(op)).is_some(), "missing {}", op);
    }
    for op in BinaryOperator::ALL {
        assert!(registry.get(Operator::Binary(op)).is_some(), "missing {}", op);
    }
    assert!(registry
        .get(Operator::Ternary(TernaryOperator::Replace))
        .is_some());
    assert_eq!(registry.len(), UnaryOperator::ALL.len() + BinaryOperator::ALL.len() + 1);
}

#[test]
#[should_panic(expected = "registered twice")]
fn test_duplicate_registration_panics() {
    let mut registry = OperatorRegistry::standard();
    let definition = *registry.get(binary(BinaryOperator::Add)).unwrap();
    registry.register(
        binary(BinaryOperator::Add),
        definition.compute_type,
        definition.evaluate,
    );
}

// ============================================================================
// Typing
// ============================================================================

#[test]
fn test_arithmetic_typing_keeps_integers() {
    assert_eq!(
        type_of(binary(BinaryOperator::Add), &[ValueType::INTEGER, ValueType::INTEGER]),
        Ok(ValueType::INTEGER)
    );
    assert_eq!(
        type_of(binary(BinaryOperator::Add), &[ValueType::INTEGER, ValueType::DECIMAL]),
        Ok(ValueType::DECIMAL)
    );
    assert_eq!(
        type_of(binary(BinaryOperator::Divide), &[ValueType::INTEGER, ValueType::INTEGER]),
        Ok(ValueType::DECIMAL)
    );
}

#[test]
fn test_arithmetic_typing_rejects_text() {
    let err = type_of(binary(BinaryOperator::Multiply), &[ValueType::INTEGER, ValueType::TEXT])
        .unwrap_err();
    assert_eq!(err.operand, Some(1));
    assert!(err.message.contains("Text"));
}

#[test]
fn test_equality_typing_requires_comparable_operands() {
    assert_eq!(
        type_of(binary(BinaryOperator::Equal), &[ValueType::INTEGER, ValueType::DECIMAL]),
        Ok(ValueType::BOOLEAN)
    );
    assert!(type_of(binary(BinaryOperator::Equal), &[ValueType::TEXT, ValueType::INTEGER]).is_err());
}

#[test]
fn test_in_typing() {
    let texts = ValueType::collection(ValueType::TEXT);
    assert_eq!(
        type_of(binary(BinaryOperator::In), &[ValueType::TEXT, texts]),
        Ok(ValueType::BOOLEAN)
    );
    assert_eq!(
        type_of(binary(BinaryOperator::In), &[ValueType::INTEGER, ValueType::EmptyCollection]),
        Ok(ValueType::BOOLEAN)
    );
    assert!(type_of(binary(BinaryOperator::In), &[ValueType::TEXT, ValueType::TEXT]).is_err());
}

#[test]
fn test_conversion_typing() {
    assert_eq!(
        type_of(unary(UnaryOperator::AsInteger), &[ValueType::TEXT]),
        Ok(ValueType::INTEGER)
    );
    assert_eq!(
        type_of(unary(UnaryOperator::LengthOf), &[ValueType::collection(ValueType::BOOLEAN)]),
        Ok(ValueType::INTEGER)
    );
    assert!(type_of(unary(UnaryOperator::AsBoolean), &[ValueType::INTEGER]).is_err());
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_integer_arithmetic() {
    assert_eq!(eval(binary(BinaryOperator::Add), &[int(2), int(3)]), Ok(int(5)));
    assert_eq!(eval(binary(BinaryOperator::Multiply), &[int(2), dec(1.5)]), Ok(dec(3.0)));
    assert_eq!(eval(binary(BinaryOperator::Modulo), &[int(7), int(3)]), Ok(int(1)));
    assert_eq!(eval(binary(BinaryOperator::Divide), &[int(7), int(2)]), Ok(dec(3.5)));
}

#[test]
fn test_integer_overflow_is_an_error() {
    let result = eval(binary(BinaryOperator::Add), &[int(i64::MAX), int(1)]);
    assert!(matches!(result, Err(EvaluationError::Arithmetic(_))));
    let result = eval(unary(UnaryOperator::Minus), &[int(i64::MIN)]);
    assert!(matches!(result, Err(EvaluationError::Arithmetic(_))));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(
        eval(binary(BinaryOperator::Divide), &[int(1), int(0)]),
        Err(EvaluationError::DivisionByZero)
    );
    assert_eq!(
        eval(binary(BinaryOperator::Modulo), &[dec(1.0), dec(0.0)]),
        Err(EvaluationError::DivisionByZero)
    );
    assert_eq!(
        eval(binary(BinaryOperator::Root), &[int(8), int(0)]),
        Err(EvaluationError::DivisionByZero)
    );
}

#[test]
fn test_roots_of_negative_numbers() {
    match eval(binary(BinaryOperator::Root), &[int(-8), int(3)]) {
        Ok(InternalValue::Decimal(d)) => assert!((d + 2.0).abs() < 1e-9),
        other => panic!("unexpected {:?}", other),
    }
    assert!(eval(binary(BinaryOperator::Root), &[int(-4), int(2)]).is_err());
    assert!(eval(unary(UnaryOperator::Sqrt), &[int(-1)]).is_err());
    assert_eq!(eval(unary(UnaryOperator::Sqrt), &[int(9)]), Ok(dec(3.0)));
}

#[test]
fn test_rounding() {
    assert_eq!(eval(unary(UnaryOperator::Floor), &[dec(2.7)]), Ok(int(2)));
    assert_eq!(eval(unary(UnaryOperator::Ceil), &[dec(2.1)]), Ok(int(3)));
    assert_eq!(eval(unary(UnaryOperator::Round), &[dec(-2.5)]), Ok(int(-3)));
    assert_eq!(eval(unary(UnaryOperator::Round), &[int(4)]), Ok(int(4)));
}

#[test]
fn test_text_conversions() {
    assert_eq!(eval(unary(UnaryOperator::AsInteger), &[text(" 42 ")]), Ok(int(42)));
    assert_eq!(eval(unary(UnaryOperator::AsDecimal), &[text("0.5")]), Ok(dec(0.5)));
    assert_eq!(
        eval(unary(UnaryOperator::AsBoolean), &[text("False")]),
        Ok(InternalValue::Boolean(false))
    );
    assert_eq!(eval(unary(UnaryOperator::AsText), &[dec(1.5)]), Ok(text("1.5")));
    assert!(matches!(
        eval(unary(UnaryOperator::AsInteger), &[text("forty")]),
        Err(EvaluationError::Conversion { .. })
    ));
    assert!(eval(unary(UnaryOperator::AsInteger), &[dec(1.5)]).is_err());
}

#[test]
fn test_comparisons_and_membership() {
    assert_eq!(
        eval(binary(BinaryOperator::LessEqual), &[int(2), dec(2.0)]),
        Ok(InternalValue::Boolean(true))
    );
    assert_eq!(
        eval(binary(BinaryOperator::Equal), &[text("a"), text("a")]),
        Ok(InternalValue::Boolean(true))
    );
    let haystack = InternalValue::Collection(vec![int(1), int(2)]);
    assert_eq!(
        eval(binary(BinaryOperator::In), &[dec(2.0), haystack.clone()]),
        Ok(InternalValue::Boolean(true))
    );
    assert_eq!(
        eval(binary(BinaryOperator::In), &[int(3), haystack]),
        Ok(InternalValue::Boolean(false))
    );
}

#[test]
fn test_regex_operators() {
    let regex = InternalValue::Regex(RegexValue::new("[0-9]+").unwrap());
    assert_eq!(
        eval(binary(BinaryOperator::Matches), &[text("abc123"), regex.clone()]),
        Ok(InternalValue::Boolean(true))
    );
    assert_eq!(
        eval(
            Operator::Ternary(TernaryOperator::Replace),
            &[text("a1b22"), regex, text("$0#")]
        ),
        Ok(text("a$0#b$0#"))
    );
}

#[test]
fn test_mismatched_operands_are_reported() {
    let result = eval(binary(BinaryOperator::And), &[InternalValue::Boolean(true), int(1)]);
    assert!(matches!(result, Err(EvaluationError::InvalidOperands { .. })));
}
