//! Rule: Transform Definition
//!
//! A transform maps `from` ports to exactly one `to` port:
//!
//! - port names are unique
//! - exactly one `to` port and exactly one output assignment
//! - the assignment targets the `to` port with a convertible value
//! - every `from` port should be used (warning)
//!
//! # Examples
//!
//! ```conduit
//! transform CelsiusToKelvin {
//!     from celsius oftype Decimal;
//!     to kelvin oftype Decimal;
//!     kelvin: celsius + 273.15;
//! }
//! ```

use crate::ast::{Expression, PortKind, PortTarget, TransformDefinition, TransformId};
use crate::diagnostics::{Diagnostic, DiagnosticLocation, NodeRef, ValidationAcceptor};
use crate::expr::infer_expression_type;

use super::super::{ValidationContext, ValidationRule};

/// Rule that checks transform definitions.
pub struct TransformDefinitionRule;

impl ValidationRule for TransformDefinitionRule {
    fn id(&self) -> &'static str {
        "transform-definition"
    }

    fn description(&self) -> &'static str {
        "Transforms must have one output port with one type-correct assignment"
    }

    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let mut acceptor = ValidationAcceptor::new(self.id());
        for id in context.model.transform_ids() {
            if let Some(transform) = context.model.transform(id) {
                check_transform(id, transform, context, &mut acceptor);
            }
        }
        acceptor.into_diagnostics()
    }
}

fn check_transform(
    id: TransformId,
    transform: &TransformDefinition,
    context: &ValidationContext<'_>,
    acceptor: &mut ValidationAcceptor,
) {
    let node = NodeRef::Transform(id);
    let at_name = DiagnosticLocation::new(node, transform.name_span);

    // Ports
    let mut seen: Vec<&str> = Vec::new();
    for port in &transform.ports {
        if seen.contains(&port.name.as_str()) {
            acceptor.error(
                format!("The port name \"{}\" is used more than once", port.name),
                DiagnosticLocation::new(node, port.name_span),
            );
        }
        seen.push(&port.name);
    }
    let outputs = transform.output_ports().count();
    if outputs != 1 {
        acceptor.error(
            format!(
                "A transform needs exactly one output port but {} are defined",
                outputs
            ),
            at_name.clone(),
        );
    }

    // Output assignment
    match transform.output_assignments.as_slice() {
        [] => acceptor.error("The output port is never assigned", at_name),
        [assignment] => {
            let location = DiagnosticLocation::new(node, assignment.port.span)
                .property(&assignment.port.name);
            if let Some(port) = assignment
                .port
                .get()
                .and_then(|index| transform.ports.get(index))
            {
                if port.kind != PortKind::To {
                    acceptor.error(
                        format!(
                            "Only the output port can be assigned but \"{}\" is an input port",
                            port.name
                        ),
                        location,
                    );
                } else {
                    let provider = context.value_types();
                    let mut issues = Vec::new();
                    let actual = infer_expression_type(
                        &assignment.expression,
                        &context.typing_context(),
                        &mut issues,
                    );
                    if let (Some(actual), Some(expected)) =
                        (actual, provider.resolve(&port.value_type))
                    {
                        if !provider.is_convertible(&actual, &expected) {
                            acceptor.error(
                                format!(
                                    "The value assigned to port \"{}\" needs to be of type {} \
                                     but is of type {}",
                                    port.name, expected, actual
                                ),
                                location.with_span(assignment.expression.span()),
                            );
                        }
                    }
                }
            }
        }
        [_, rest @ ..] => {
            for assignment in rest {
                acceptor.error(
                    "Only one output assignment is allowed",
                    DiagnosticLocation::new(node, assignment.span),
                );
            }
        }
    }

    // Unused inputs
    for (index, port) in transform.input_ports() {
        let target = PortTarget {
            transform: id,
            port: index,
        };
        if !is_used(transform, target) {
            acceptor.warning(
                format!("The input port \"{}\" is never used", port.name),
                DiagnosticLocation::new(node, port.name_span),
            );
        }
    }
}

fn is_used(transform: &TransformDefinition, target: PortTarget) -> bool {
    let mut used = false;
    for assignment in &transform.output_assignments {
        assignment.expression.walk(&mut |expression| {
            if let Expression::Variable { reference } = expression {
                used |= reference.get() == Some(target);
            }
        });
    }
    used
}
