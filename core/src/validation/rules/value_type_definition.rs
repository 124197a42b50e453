//! Rule: Value Type Definition
//!
//! Checks each `valuetype` definition on its own:
//!
//! - the transitive `oftype` chain must not loop back on itself
//! - generic parameter names must be unique
//! - `constraints` must be a collection of constraints
//! - each listed constraint must be applicable to the value type
//!
//! A definition on a supertype cycle gets the cycle error only; nothing
//! else about it is meaningful.
//!
//! # Examples
//!
//! ```conduit
//! // Error: cycle
//! valuetype A oftype B {}
//! valuetype B oftype A {}
//!
//! // Error: a length constraint on a Decimal
//! valuetype Ratio oftype Decimal { constraints: [ShortText]; }
//! ```

use crate::ast::{ConstraintDefinition, ConstraintId, Expression, ValueTypeId};
use crate::diagnostics::{Diagnostic, DiagnosticLocation, NodeRef, ValidationAcceptor};
use crate::expr::{evaluate_expression, infer_expression_type, EvaluationStrategy, InternalValue};
use crate::types::{AtomicValueType, ValueType};

use super::super::{ValidationContext, ValidationRule};

const CONSTRAINTS_PROPERTY: &str = "constraints";

/// Rule that checks user-defined value types.
pub struct ValueTypeDefinitionRule;

impl ValidationRule for ValueTypeDefinitionRule {
    fn id(&self) -> &'static str {
        "value-type-definition"
    }

    fn description(&self) -> &'static str {
        "Value types must have an acyclic supertype chain and applicable constraints"
    }

    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let model = context.model;
        let mut acceptor = ValidationAcceptor::new(self.id());

        for id in model.value_type_ids() {
            let Ok(wrapper) = AtomicValueType::wrap(model, id) else {
                continue;
            };
            let definition = wrapper.definition();
            let node = NodeRef::ValueType(id);

            if wrapper.has_supertype_cycle() {
                acceptor.error(
                    "Could not construct this value type since there is a cycle in the \
                     (transitive) \"oftype\" relation",
                    DiagnosticLocation::new(node, definition.name_span),
                );
                continue;
            }

            let mut seen: Vec<&str> = Vec::new();
            for parameter in &definition.generic_parameters {
                if seen.contains(&parameter.name.as_str()) {
                    acceptor.error(
                        format!(
                            "The generic parameter \"{}\" is declared more than once",
                            parameter.name
                        ),
                        DiagnosticLocation::new(node, parameter.span),
                    );
                }
                seen.push(&parameter.name);
            }

            if let Some(constraints) = &definition.constraints {
                let value_type = wrapper.value_type();
                check_constraints(id, &value_type, constraints, context, &mut acceptor);
            }
        }

        acceptor.into_diagnostics()
    }
}

fn check_constraints(
    id: ValueTypeId,
    value_type: &ValueType,
    constraints: &Expression,
    context: &ValidationContext<'_>,
    acceptor: &mut ValidationAcceptor,
) {
    let node = NodeRef::ValueType(id);
    let location =
        DiagnosticLocation::new(node, constraints.span()).property(CONSTRAINTS_PROPERTY);
    let provider = context.value_types();
    let expected = ValueType::collection(ValueType::CONSTRAINT);

    let mut issues = Vec::new();
    let Some(actual) = infer_expression_type(constraints, &context.typing_context(), &mut issues)
    else {
        return;
    };
    if !provider.is_convertible(&actual, &expected) {
        acceptor.error(
            format!(
                "The value of property \"{}\" needs to be of type {} but is of type {}",
                CONSTRAINTS_PROPERTY, expected, actual
            ),
            location,
        );
        return;
    }

    let evaluation = context.evaluation_context();
    let Ok(Some(InternalValue::Collection(items))) =
        evaluate_expression(constraints, &evaluation, EvaluationStrategy::Lazy)
    else {
        return;
    };
    // elements line up with the written collection when it is a literal
    let element_spans: Vec<_> = match constraints {
        Expression::Collection { elements, .. } => elements.iter().map(|e| e.span()).collect(),
        _ => Vec::new(),
    };

    for (index, item) in items.iter().enumerate() {
        let InternalValue::ConstraintRef(constraint) = item else {
            continue;
        };
        let Some(applicable) = applicable_type(*constraint, context) else {
            continue;
        };
        if provider.is_convertible(value_type, &applicable) {
            continue;
        }
        let span = element_spans
            .get(index)
            .copied()
            .unwrap_or_else(|| constraints.span());
        let name = context
            .model
            .constraint(*constraint)
            .map(|c| c.name())
            .unwrap_or_default();
        acceptor.error(
            format!(
                "The constraint \"{}\" is not applicable to value type {} (it checks values of \
                 type {})",
                name, value_type, applicable
            ),
            location.with_span(span).index(index),
        );
    }
}

/// The value type a constraint can check
fn applicable_type(id: ConstraintId, context: &ValidationContext<'_>) -> Option<ValueType> {
    match context.model.constraint(id)? {
        ConstraintDefinition::Typed {
            constraint_type, ..
        } => context
            .registry
            .constraint_type_of(constraint_type)
            .map(|info| info.applicable_type.clone()),
        ConstraintDefinition::Expression { on, .. } => context.value_types().resolve(on),
    }
}
