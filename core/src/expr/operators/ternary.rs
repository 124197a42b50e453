use regex::NoExpand;

use crate::ast::TernaryOperator;
use crate::error::EvaluationError;
use crate::expr::InternalValue;
use crate::types::{ValueType, ValueTypeProvider};

use super::{expect_operand, invalid_operands, OperandTypeError, Operator, OperatorRegistry};

pub(super) fn register(registry: &mut OperatorRegistry) {
    registry.register(
        Operator::Ternary(TernaryOperator::Replace),
        replace_type,
        replace,
    );
}

/// `TEXT replace REGEX with TEXT`
fn replace_type(
    operands: &[ValueType],
    provider: &ValueTypeProvider<'_>,
) -> Result<ValueType, OperandTypeError> {
    expect_operand(operands, 0, &ValueType::TEXT, provider)?;
    expect_operand(operands, 1, &ValueType::REGEX, provider)?;
    expect_operand(operands, 2, &ValueType::TEXT, provider)?;
    Ok(ValueType::TEXT)
}

/// Replaces every match; the replacement is taken literally
fn replace(operands: &[InternalValue]) -> Result<InternalValue, EvaluationError> {
    match operands {
        [InternalValue::Text(text), InternalValue::Regex(regex), InternalValue::Text(replacement)] => {
            Ok(InternalValue::Text(
                regex
                    .regex()
                    .replace_all(text, NoExpand(replacement))
                    .into_owned(),
            ))
        }
        _ => Err(invalid_operands(
            Operator::Ternary(TernaryOperator::Replace),
            operands,
        )),
    }
}
