//! Static type inference for expressions.

use crate::ast::{Expression, Span};
use crate::types::{ValueType, ValueTypeProvider};

use super::operators::{Operator, OperatorRegistry};

/// What type inference may consult
#[derive(Debug, Clone)]
pub struct TypingContext<'a> {
    pub value_types: ValueTypeProvider<'a>,
    pub operators: &'a OperatorRegistry,
    /// Type of the `value` keyword; only set inside expression constraints
    pub value_keyword_type: Option<ValueType>,
}

impl<'a> TypingContext<'a> {
    pub fn new(value_types: ValueTypeProvider<'a>, operators: &'a OperatorRegistry) -> Self {
        Self {
            value_types,
            operators,
            value_keyword_type: None,
        }
    }

    pub fn with_value_keyword(mut self, value_type: ValueType) -> Self {
        self.value_keyword_type = Some(value_type);
        self
    }
}

/// A typing fault found while inferring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeIssue {
    pub span: Span,
    pub message: String,
}

/// Infer the static type of `expression`.
///
/// Returns `None` when the expression cannot be typed. The innermost fault
/// pushes one [`TypeIssue`]; enclosing expressions then return `None`
/// without adding more, so callers can short-circuit. Unresolved
/// references are link errors and yield `None` silently.
pub fn infer_expression_type(
    expression: &Expression,
    context: &TypingContext<'_>,
    issues: &mut Vec<TypeIssue>,
) -> Option<ValueType> {
    match expression {
        Expression::Boolean { .. } => Some(ValueType::BOOLEAN),
        Expression::Integer { .. } => Some(ValueType::INTEGER),
        Expression::Decimal { .. } => Some(ValueType::DECIMAL),
        Expression::Text { .. } => Some(ValueType::TEXT),
        Expression::Regex { .. } => Some(ValueType::REGEX),
        Expression::CellRange { .. } => Some(ValueType::CELL_RANGE),
        Expression::ValueTypeAssignment { .. } => Some(ValueType::VALUETYPE_ASSIGNMENT),
        Expression::ConstraintRef { reference } => {
            reference.get().map(|_| ValueType::CONSTRAINT)
        }
        Expression::TransformRef { reference } => reference.get().map(|_| ValueType::TRANSFORM),
        Expression::Variable { reference } => {
            let target = reference.get()?;
            let transform = context.value_types.model().transform(target.transform)?;
            let port = transform.ports.get(target.port)?;
            context.value_types.resolve(&port.value_type)
        }
        Expression::ValueKeyword { span } => match &context.value_keyword_type {
            Some(value_type) => Some(value_type.clone()),
            None => {
                issues.push(TypeIssue {
                    span: *span,
                    message: "The value keyword is only allowed inside expression constraints"
                        .to_string(),
                });
                None
            }
        },
        Expression::Collection { elements, span } => {
            infer_collection_type(elements, *span, context, issues)
        }
        Expression::Unary {
            operator,
            operand,
            span,
        } => infer_operator_type(
            Operator::Unary(*operator),
            &[operand.as_ref()],
            *span,
            context,
            issues,
        ),
        Expression::Binary {
            operator,
            left,
            right,
            span,
        } => infer_operator_type(
            Operator::Binary(*operator),
            &[left.as_ref(), right.as_ref()],
            *span,
            context,
            issues,
        ),
        Expression::Ternary {
            operator,
            first,
            second,
            third,
            span,
        } => infer_operator_type(
            Operator::Ternary(*operator),
            &[first.as_ref(), second.as_ref(), third.as_ref()],
            *span,
            context,
            issues,
        ),
    }
}

fn infer_operator_type(
    operator: Operator,
    operands: &[&Expression],
    span: Span,
    context: &TypingContext<'_>,
    issues: &mut Vec<TypeIssue>,
) -> Option<ValueType> {
    let mut operand_types = Vec::with_capacity(operands.len());
    for operand in operands {
        operand_types.push(infer_expression_type(operand, context, issues)?);
    }
    match context
        .operators
        .compute_type(operator, &operand_types, &context.value_types)
    {
        Ok(value_type) => Some(value_type),
        Err(err) => {
            let span = err
                .operand
                .and_then(|index| operands.get(index))
                .map(|operand| operand.span())
                .unwrap_or(span);
            issues.push(TypeIssue {
                span,
                message: err.message,
            });
            None
        }
    }
}

/// `[]` is the empty collection; otherwise the first element type every
/// element converts to.
fn infer_collection_type(
    elements: &[Expression],
    span: Span,
    context: &TypingContext<'_>,
    issues: &mut Vec<TypeIssue>,
) -> Option<ValueType> {
    if elements.is_empty() {
        return Some(ValueType::EmptyCollection);
    }
    let mut element_types = Vec::with_capacity(elements.len());
    for element in elements {
        element_types.push(infer_expression_type(element, context, issues)?);
    }
    let common = element_types.iter().find(|candidate| {
        element_types
            .iter()
            .all(|t| context.value_types.is_convertible(t, candidate))
    });
    match common {
        Some(element_type) => Some(ValueType::collection(element_type.clone())),
        None => {
            let mut names: Vec<String> = element_types.iter().map(ToString::to_string).collect();
            names.dedup();
            issues.push(TypeIssue {
                span,
                message: format!(
                    "The type of the collection cannot be inferred from its elements of type {}",
                    names.join(", ")
                ),
            });
            None
        }
    }
}
