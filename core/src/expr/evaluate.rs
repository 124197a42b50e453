//! Constant folding and runtime evaluation of expressions.
//!
//! [`evaluate_expression`] returns `Ok(None)` for "unknown". That only
//! happens under [`EvaluationStrategy::Lazy`]; under
//! [`EvaluationStrategy::Exhaustive`] every missing value is an
//! [`EvaluationError`].

use tracing::trace;

use crate::ast::{BinaryOperator, Expression, PropertyValue, TernaryOperator};
use crate::cells::CellRange;
use crate::error::EvaluationError;
use crate::types::{ValueType, ValueTypeProvider};

use super::operators::{Operator, OperatorRegistry};
use super::{
    EvaluationContext, EvaluationStrategy, InternalValue, RegexValue, RuntimeParameterProvider,
    VariableKey,
};

pub type EvaluationResult = Result<Option<InternalValue>, EvaluationError>;

/// A value that is not available: unknown when lazy, an error otherwise
fn missing(strategy: EvaluationStrategy, error: EvaluationError) -> EvaluationResult {
    match strategy {
        EvaluationStrategy::Lazy => Ok(None),
        EvaluationStrategy::Exhaustive => Err(error),
    }
}

/// Evaluate `expression` against `context`.
pub fn evaluate_expression(
    expression: &Expression,
    context: &EvaluationContext<'_>,
    strategy: EvaluationStrategy,
) -> EvaluationResult {
    match expression {
        Expression::Boolean { value, .. } => Ok(Some(InternalValue::Boolean(*value))),
        Expression::Integer { value, .. } => Ok(Some(InternalValue::Integer(*value))),
        Expression::Decimal { value, .. } => Ok(Some(InternalValue::Decimal(*value))),
        Expression::Text { value, .. } => Ok(Some(InternalValue::Text(value.clone()))),
        Expression::Regex { pattern, .. } => RegexValue::new(pattern)
            .map(|regex| Some(InternalValue::Regex(regex)))
            .map_err(|err| EvaluationError::InvalidRegex {
                pattern: pattern.clone(),
                reason: err.to_string(),
            }),
        Expression::CellRange { range, .. } => {
            Ok(Some(InternalValue::CellRange(CellRange::from_literal(range)?)))
        }
        Expression::Collection { elements, .. } => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                match evaluate_expression(element, context, strategy)? {
                    Some(value) => values.push(value),
                    None => return Ok(None),
                }
            }
            Ok(Some(InternalValue::Collection(values)))
        }
        Expression::ValueTypeAssignment {
            column, value_type, ..
        } => match context.value_types.resolve(value_type) {
            Some(resolved) => Ok(Some(InternalValue::ValuetypeAssignment {
                column: column.clone(),
                value_type: resolved,
            })),
            None => missing(
                strategy,
                EvaluationError::UnresolvedReference(value_type.reference.name.clone()),
            ),
        },
        Expression::ConstraintRef { reference } => match reference.get() {
            Some(id) => Ok(Some(InternalValue::ConstraintRef(id))),
            None => missing(
                strategy,
                EvaluationError::UnresolvedReference(reference.name.clone()),
            ),
        },
        Expression::TransformRef { reference } => match reference.get() {
            Some(id) => Ok(Some(InternalValue::TransformRef(id))),
            None => missing(
                strategy,
                EvaluationError::UnresolvedReference(reference.name.clone()),
            ),
        },
        Expression::Variable { reference } => {
            let bound = reference
                .get()
                .and_then(|target| context.lookup(VariableKey::Port(target)));
            match bound {
                Some(value) => Ok(Some(value.clone())),
                None => missing(
                    strategy,
                    EvaluationError::UnresolvedVariable(reference.name.clone()),
                ),
            }
        }
        Expression::ValueKeyword { .. } => match context.lookup(VariableKey::Value) {
            Some(value) => Ok(Some(value.clone())),
            None => missing(
                strategy,
                EvaluationError::UnresolvedVariable("value".to_string()),
            ),
        },
        Expression::Unary {
            operator, operand, ..
        } => {
            let Some(operand) = evaluate_expression(operand, context, strategy)? else {
                return Ok(None);
            };
            context
                .operators
                .evaluate(Operator::Unary(*operator), &[operand])
                .map(Some)
        }
        Expression::Binary {
            operator,
            left,
            right,
            ..
        } => evaluate_binary(*operator, left, right, context, strategy),
        Expression::Ternary {
            operator,
            first,
            second,
            third,
            ..
        } => evaluate_ternary(
            *operator,
            [first.as_ref(), second.as_ref(), third.as_ref()],
            context,
            strategy,
        ),
    }
}

fn evaluate_binary(
    operator: BinaryOperator,
    left: &Expression,
    right: &Expression,
    context: &EvaluationContext<'_>,
    strategy: EvaluationStrategy,
) -> EvaluationResult {
    let left = evaluate_expression(left, context, strategy)?;

    // A decisive left operand settles `and`/`or` without looking right.
    if strategy == EvaluationStrategy::Lazy {
        if let Some(decided) = decisive_operand(operator, left.as_ref()) {
            return Ok(Some(decided));
        }
    }

    let right = evaluate_expression(right, context, strategy)?;
    let (Some(left), Some(right)) = (left.clone(), right.clone()) else {
        // an unknown side still yields to a decisive other side
        if strategy == EvaluationStrategy::Lazy {
            if let Some(decided) = decisive_operand(operator, left.as_ref().or(right.as_ref())) {
                return Ok(Some(decided));
            }
        }
        return Ok(None);
    };
    context
        .operators
        .evaluate(Operator::Binary(operator), &[left, right])
        .map(Some)
}

fn decisive_operand(
    operator: BinaryOperator,
    known: Option<&InternalValue>,
) -> Option<InternalValue> {
    match (operator, known) {
        (BinaryOperator::And, Some(InternalValue::Boolean(false))) => {
            Some(InternalValue::Boolean(false))
        }
        (BinaryOperator::Or, Some(InternalValue::Boolean(true))) => {
            Some(InternalValue::Boolean(true))
        }
        _ => None,
    }
}

fn evaluate_ternary(
    operator: TernaryOperator,
    operands: [&Expression; 3],
    context: &EvaluationContext<'_>,
    strategy: EvaluationStrategy,
) -> EvaluationResult {
    let mut values = Vec::with_capacity(3);
    for operand in operands {
        match evaluate_expression(operand, context, strategy)? {
            Some(value) => values.push(value),
            None => return Ok(None),
        }
    }
    context
        .operators
        .evaluate(Operator::Ternary(operator), &values)
        .map(Some)
}

/// Evaluate the right-hand side of a property assignment.
///
/// Runtime parameters are parsed as `expected`. An unbound parameter is
/// unknown when lazy and an error when exhaustive.
pub fn evaluate_property_value(
    value: &PropertyValue,
    expected: &ValueType,
    context: &EvaluationContext<'_>,
    strategy: EvaluationStrategy,
) -> EvaluationResult {
    match value {
        PropertyValue::Expression { expression } => {
            evaluate_expression(expression, context, strategy)
        }
        PropertyValue::RuntimeParameter { name, .. } => {
            match context
                .runtime_parameters
                .parse(name, expected, &context.value_types)
            {
                Some(parsed) => parsed.map(Some).map_err(EvaluationError::from),
                None => missing(
                    strategy,
                    EvaluationError::UnresolvedRuntimeParameter(name.clone()),
                ),
            }
        }
    }
}

/// The constant a non-literal expression folds to, if any.
///
/// Folds exhaustively without runtime parameters or bindings. Literals
/// are never reported since there is nothing to simplify.
pub fn simplified_value(
    expression: &Expression,
    operators: &OperatorRegistry,
    value_types: ValueTypeProvider<'_>,
) -> Option<InternalValue> {
    if expression.is_literal() {
        return None;
    }
    let no_parameters = RuntimeParameterProvider::new();
    let context = EvaluationContext::new(&no_parameters, operators, value_types);
    match evaluate_expression(expression, &context, EvaluationStrategy::Exhaustive) {
        Ok(value) => value,
        Err(err) => {
            trace!(error = %err, "expression does not fold to a constant");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Model, Reference, Span, UnaryOperator};

    fn int(value: i64) -> Expression {
        Expression::Integer {
            value,
            span: Span::default(),
        }
    }

    fn boolean(value: bool) -> Expression {
        Expression::Boolean {
            value,
            span: Span::default(),
        }
    }

    fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Expression {
        Expression::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            span: Span::default(),
        }
    }

    fn value_keyword() -> Expression {
        Expression::ValueKeyword {
            span: Span::default(),
        }
    }

    fn with_context<R>(f: impl FnOnce(&EvaluationContext<'_>) -> R) -> R {
        let model = Model::new();
        let parameters = RuntimeParameterProvider::new();
        let operators = OperatorRegistry::standard();
        let context =
            EvaluationContext::new(&parameters, &operators, ValueTypeProvider::new(&model));
        f(&context)
    }

    #[test]
    fn test_folds_constant_arithmetic() {
        let expr = binary(BinaryOperator::Multiply, int(6), int(7));
        let value = with_context(|ctx| evaluate_expression(&expr, ctx, EvaluationStrategy::Lazy));
        assert_eq!(value, Ok(Some(InternalValue::Integer(42))));
    }

    #[test]
    fn test_lazy_returns_unknown_for_unbound_values() {
        let expr = binary(BinaryOperator::Greater, value_keyword(), int(3));
        let lazy = with_context(|ctx| evaluate_expression(&expr, ctx, EvaluationStrategy::Lazy));
        assert_eq!(lazy, Ok(None));

        let exhaustive =
            with_context(|ctx| evaluate_expression(&expr, ctx, EvaluationStrategy::Exhaustive));
        assert_eq!(
            exhaustive,
            Err(EvaluationError::UnresolvedVariable("value".to_string()))
        );
    }

    #[test]
    fn test_bound_value_keyword() {
        let expr = binary(BinaryOperator::Greater, value_keyword(), int(3));
        let model = Model::new();
        let parameters = RuntimeParameterProvider::new();
        let operators = OperatorRegistry::standard();
        let context =
            EvaluationContext::new(&parameters, &operators, ValueTypeProvider::new(&model))
                .with_binding(VariableKey::Value, InternalValue::Integer(5));
        assert_eq!(
            evaluate_expression(&expr, &context, EvaluationStrategy::Exhaustive),
            Ok(Some(InternalValue::Boolean(true)))
        );
    }

    #[test]
    fn test_lazy_short_circuits_logical_operators() {
        let and = binary(BinaryOperator::And, boolean(false), value_keyword());
        let or = binary(BinaryOperator::Or, boolean(true), value_keyword());
        with_context(|ctx| {
            assert_eq!(
                evaluate_expression(&and, ctx, EvaluationStrategy::Lazy),
                Ok(Some(InternalValue::Boolean(false)))
            );
            assert_eq!(
                evaluate_expression(&or, ctx, EvaluationStrategy::Lazy),
                Ok(Some(InternalValue::Boolean(true)))
            );
            assert!(evaluate_expression(&and, ctx, EvaluationStrategy::Exhaustive).is_err());
        });
    }

    #[test]
    fn test_lazy_short_circuit_works_from_either_side() {
        let and = binary(BinaryOperator::And, value_keyword(), boolean(false));
        let or = binary(BinaryOperator::Or, value_keyword(), boolean(true));
        let undecided = binary(BinaryOperator::And, value_keyword(), boolean(true));
        with_context(|ctx| {
            assert_eq!(
                evaluate_expression(&and, ctx, EvaluationStrategy::Lazy),
                Ok(Some(InternalValue::Boolean(false)))
            );
            assert_eq!(
                evaluate_expression(&or, ctx, EvaluationStrategy::Lazy),
                Ok(Some(InternalValue::Boolean(true)))
            );
            assert_eq!(
                evaluate_expression(&undecided, ctx, EvaluationStrategy::Lazy),
                Ok(None)
            );
        });
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        let expr = Expression::Regex {
            pattern: "(unclosed".to_string(),
            span: Span::default(),
        };
        let result = with_context(|ctx| evaluate_expression(&expr, ctx, EvaluationStrategy::Lazy));
        assert!(matches!(result, Err(EvaluationError::InvalidRegex { .. })));
    }

    #[test]
    fn test_unresolved_reference_is_unknown_when_lazy() {
        let expr = Expression::ConstraintRef {
            reference: Reference::new("Missing", Span::default()),
        };
        let result = with_context(|ctx| evaluate_expression(&expr, ctx, EvaluationStrategy::Lazy));
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn test_runtime_parameters() {
        let model = Model::new();
        let mut parameters = RuntimeParameterProvider::new();
        parameters.set("limit", "25");
        let operators = OperatorRegistry::standard();
        let context =
            EvaluationContext::new(&parameters, &operators, ValueTypeProvider::new(&model));

        let bound = PropertyValue::RuntimeParameter {
            name: "limit".to_string(),
            span: Span::default(),
        };
        assert_eq!(
            evaluate_property_value(
                &bound,
                &ValueType::INTEGER,
                &context,
                EvaluationStrategy::Exhaustive
            ),
            Ok(Some(InternalValue::Integer(25)))
        );

        let unbound = PropertyValue::RuntimeParameter {
            name: "url".to_string(),
            span: Span::default(),
        };
        assert_eq!(
            evaluate_property_value(&unbound, &ValueType::TEXT, &context, EvaluationStrategy::Lazy),
            Ok(None)
        );
        assert_eq!(
            evaluate_property_value(
                &unbound,
                &ValueType::TEXT,
                &context,
                EvaluationStrategy::Exhaustive
            ),
            Err(EvaluationError::UnresolvedRuntimeParameter("url".to_string()))
        );
    }

    #[test]
    fn test_simplified_value() {
        let model = Model::new();
        let operators = OperatorRegistry::standard();
        let provider = ValueTypeProvider::new(&model);

        let foldable = binary(BinaryOperator::Add, int(1), int(2));
        assert_eq!(
            simplified_value(&foldable, &operators, provider),
            Some(InternalValue::Integer(3))
        );

        let negative = Expression::Unary {
            operator: UnaryOperator::Minus,
            operand: Box::new(int(1)),
            span: Span::default(),
        };
        assert_eq!(simplified_value(&negative, &operators, provider), None);
        assert_eq!(simplified_value(&int(5), &operators, provider), None);

        let dependent = binary(BinaryOperator::Add, value_keyword(), int(2));
        assert_eq!(simplified_value(&dependent, &operators, provider), None);
    }
}
