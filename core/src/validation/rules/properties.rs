//! Property body checks shared by block bodies and typed constraint bodies.
//!
//! Per assignment, in order: the name must be known, the name must not be
//! assigned twice, the value must have the right type (or, for `requires`,
//! the type must allow runtime parameters), the value must evaluate and pass
//! the property's validator. Then the body as a whole: required properties
//! must be present, and when no error was found so far the type's body
//! validator runs.

use crate::ast::{PropertyAssignment, PropertyBody, PropertyValue, Span};
use crate::diagnostics::{DiagnosticLocation, NodeRef, ValidationAcceptor};
use crate::error::EvaluationError;
use crate::expr::{
    evaluate_property_value, infer_expression_type, EvaluationContext, EvaluationStrategy,
};
use crate::meta::{MetaInformation, PropertySpecification, PropertyValues};

use super::super::ValidationContext;
use super::quoted_list;

/// One body and the meta information it is checked against
pub(super) struct PropertyBodyCheck<'a> {
    pub info: &'a dyn MetaInformation,
    pub body: &'a PropertyBody,
    pub node: NodeRef,
    /// Where "missing required properties" is reported
    pub anchor: Span,
}

pub(super) fn check_property_body(
    check: PropertyBodyCheck<'_>,
    context: &ValidationContext<'_>,
    acceptor: &mut ValidationAcceptor,
) {
    let PropertyBodyCheck {
        info,
        body,
        node,
        anchor,
    } = check;
    let errors_before = acceptor.error_count();
    let evaluation = context.evaluation_context();

    let mut assigned: Vec<&str> = Vec::new();
    for assignment in &body.properties {
        let location =
            DiagnosticLocation::new(node, assignment.name_span).property(&assignment.name);
        let Some(specification) = info.property(&assignment.name) else {
            acceptor.error(
                format!(
                    "Invalid property name \"{}\" for {}",
                    assignment.name,
                    info.name()
                ),
                location,
            );
            continue;
        };
        if assigned.contains(&assignment.name.as_str()) {
            acceptor.error(
                format!("Property \"{}\" is assigned more than once", assignment.name),
                location,
            );
            continue;
        }
        assigned.push(&assignment.name);
        check_assignment(
            assignment,
            specification,
            node,
            context,
            &evaluation,
            acceptor,
        );
    }

    let missing = info.missing_required_property_names(&assigned);
    if !missing.is_empty() {
        acceptor.error(
            format!(
                "The following required properties are missing: {}",
                quoted_list(&missing)
            ),
            DiagnosticLocation::new(node, anchor),
        );
    }

    if acceptor.error_count() > errors_before {
        return;
    }
    if let Some(validator) = info.body_validator() {
        let values = PropertyValues::new(info, body, node, &evaluation, EvaluationStrategy::Lazy);
        validator(&values, acceptor);
    }
}

fn check_assignment(
    assignment: &PropertyAssignment,
    specification: &PropertySpecification,
    node: NodeRef,
    context: &ValidationContext<'_>,
    evaluation: &EvaluationContext<'_>,
    acceptor: &mut ValidationAcceptor,
) {
    let provider = context.value_types();
    let expected = &specification.value_type;
    let location =
        DiagnosticLocation::new(node, assignment.value.span()).property(&assignment.name);

    match &assignment.value {
        PropertyValue::RuntimeParameter { .. } => {
            if !provider.is_allowed_as_runtime_parameter(expected) {
                acceptor.error(
                    format!(
                        "Runtime parameters are not allowed for properties of type {}",
                        expected
                    ),
                    location,
                );
                return;
            }
        }
        PropertyValue::Expression { expression } => {
            // typing issues inside the expression belong to the expression rule
            let mut issues = Vec::new();
            let Some(actual) =
                infer_expression_type(expression, &context.typing_context(), &mut issues)
            else {
                return;
            };
            if !provider.is_convertible(&actual, expected) {
                acceptor.error(
                    format!(
                        "The value of property \"{}\" needs to be of type {} but is of type {}",
                        assignment.name, expected, actual
                    ),
                    location,
                );
                return;
            }
        }
    }

    match evaluate_property_value(
        &assignment.value,
        expected,
        evaluation,
        EvaluationStrategy::Lazy,
    ) {
        Ok(Some(value)) => {
            if let Some(validator) = specification.validator {
                validator(&value, location, acceptor);
            }
        }
        Ok(None) => {}
        // invalid literals are reported where they are written
        Err(EvaluationError::InvalidRegex { .. } | EvaluationError::InvalidCellRange(_)) => {}
        Err(err) => acceptor.error(
            format!(
                "The value of property \"{}\" cannot be evaluated: {}",
                assignment.name, err
            ),
            location,
        ),
    }
}
