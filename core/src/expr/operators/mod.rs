//! Operator registry
//!
//! Every operator has two entries: a type computer used by type inference
//! and an evaluator used by constant folding and execution. Both dispatch on
//! the operand types themselves, so one entry per operator is enough.
//!
//! # Adding an Operator
//!
//! 1. Add the variant to the operator enum in `ast::expr`
//! 2. Write a type computer and an evaluator in the matching file here
//! 3. Register both in [`OperatorRegistry::standard`]

mod binary;
mod ternary;
mod unary;

use std::collections::HashMap;

use tracing::trace;

use crate::ast::{BinaryOperator, TernaryOperator, UnaryOperator};
use crate::error::EvaluationError;
use crate::types::{ValueType, ValueTypeProvider};

use super::InternalValue;

/// Any operator of the expression language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Unary(UnaryOperator),
    Binary(BinaryOperator),
    Ternary(TernaryOperator),
}

impl Operator {
    pub fn arity(self) -> usize {
        match self {
            Operator::Unary(_) => 1,
            Operator::Binary(_) => 2,
            Operator::Ternary(_) => 3,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Unary(op) => write!(f, "{}", op),
            Operator::Binary(op) => write!(f, "{}", op),
            Operator::Ternary(op) => write!(f, "{}", op),
        }
    }
}

/// Why an operator cannot be applied to the given operand types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandTypeError {
    /// The offending operand, if a single one is to blame
    pub operand: Option<usize>,
    pub message: String,
}

impl OperandTypeError {
    pub fn at(operand: usize, message: impl Into<String>) -> Self {
        Self {
            operand: Some(operand),
            message: message.into(),
        }
    }

    pub fn whole(message: impl Into<String>) -> Self {
        Self {
            operand: None,
            message: message.into(),
        }
    }
}

pub type TypeComputer =
    fn(&[ValueType], &ValueTypeProvider<'_>) -> Result<ValueType, OperandTypeError>;

pub type OperatorEvaluator = fn(&[InternalValue]) -> Result<InternalValue, EvaluationError>;

#[derive(Debug, Clone, Copy)]
pub struct OperatorDefinition {
    pub operator: Operator,
    pub compute_type: TypeComputer,
    pub evaluate: OperatorEvaluator,
}

/// Operator type computers and evaluators, keyed by operator.
#[derive(Debug, Clone, Default)]
pub struct OperatorRegistry {
    definitions: HashMap<Operator, OperatorDefinition>,
}

impl OperatorRegistry {
    /// A registry without any operators
    pub fn empty() -> Self {
        Self::default()
    }

    /// All operators of the language
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        unary::register(&mut registry);
        binary::register(&mut registry);
        ternary::register(&mut registry);
        trace!(operators = registry.definitions.len(), "operator registry built");
        registry
    }

    /// Register an operator.
    ///
    /// # Panics
    ///
    /// Panics if the operator is already registered.
    pub fn register(
        &mut self,
        operator: Operator,
        compute_type: TypeComputer,
        evaluate: OperatorEvaluator,
    ) {
        let previous = self.definitions.insert(
            operator,
            OperatorDefinition {
                operator,
                compute_type,
                evaluate,
            },
        );
        assert!(
            previous.is_none(),
            "operator \"{}\" is registered twice",
            operator
        );
    }

    pub fn get(&self, operator: Operator) -> Option<&OperatorDefinition> {
        self.definitions.get(&operator)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn compute_type(
        &self,
        operator: Operator,
        operands: &[ValueType],
        provider: &ValueTypeProvider<'_>,
    ) -> Result<ValueType, OperandTypeError> {
        let definition = self.get(operator).ok_or_else(|| {
            OperandTypeError::whole(format!("The operator \"{}\" is not supported", operator))
        })?;
        (definition.compute_type)(operands, provider)
    }

    pub fn evaluate(
        &self,
        operator: Operator,
        operands: &[InternalValue],
    ) -> Result<InternalValue, EvaluationError> {
        let definition = self
            .get(operator)
            .ok_or_else(|| invalid_operands(operator, operands))?;
        (definition.evaluate)(operands)
    }
}

/* ===================== Shared helpers ===================== */

pub(super) fn invalid_operands(operator: Operator, operands: &[InternalValue]) -> EvaluationError {
    let kinds: Vec<&str> = operands.iter().map(InternalValue::kind_name).collect();
    EvaluationError::InvalidOperands {
        operator: operator.to_string(),
        operands: kinds.join(", "),
    }
}

fn is_numeric(value_type: &ValueType, provider: &ValueTypeProvider<'_>) -> bool {
    provider.is_convertible(value_type, &ValueType::DECIMAL)
}

fn is_integer(value_type: &ValueType, provider: &ValueTypeProvider<'_>) -> bool {
    provider.is_convertible(value_type, &ValueType::INTEGER)
}

/// Require operand `index` to convert to `expected`
fn expect_operand(
    operands: &[ValueType],
    index: usize,
    expected: &ValueType,
    provider: &ValueTypeProvider<'_>,
) -> Result<(), OperandTypeError> {
    match operands.get(index) {
        Some(actual) if provider.is_convertible(actual, expected) => Ok(()),
        Some(actual) => Err(OperandTypeError::at(
            index,
            format!(
                "The operand needs to be of type {} but is of type {}",
                expected, actual
            ),
        )),
        None => Err(OperandTypeError::whole("Missing operand")),
    }
}

fn expect_numeric(
    operands: &[ValueType],
    index: usize,
    provider: &ValueTypeProvider<'_>,
) -> Result<(), OperandTypeError> {
    match operands.get(index) {
        Some(actual) if is_numeric(actual, provider) => Ok(()),
        Some(actual) => Err(OperandTypeError::at(
            index,
            format!(
                "The operand needs to be of type Integer or Decimal but is of type {}",
                actual
            ),
        )),
        None => Err(OperandTypeError::whole("Missing operand")),
    }
}

#[cfg(test)]
mod tests;
