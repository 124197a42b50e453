//! Rule: Constraint Definition
//!
//! A typed constraint's body is checked against its constraint type exactly
//! like a block body is checked against its block type. An expression
//! constraint must produce a `Boolean` for values of its `on` type.
//!
//! # Examples
//!
//! ```conduit
//! // Error: the required property "maxLength" is missing
//! constraint Short oftype LengthConstraint { minLength: 1; }
//!
//! // Error: the expression is of type Integer
//! constraint Sized on Text: lengthof value;
//! ```

use crate::ast::ConstraintDefinition;
use crate::diagnostics::{Diagnostic, DiagnosticLocation, NodeRef, ValidationAcceptor};
use crate::expr::infer_expression_type;
use crate::types::ValueType;

use super::super::{ValidationContext, ValidationRule};
use super::properties::{check_property_body, PropertyBodyCheck};

/// Rule that checks constraint definitions.
pub struct ConstraintDefinitionRule;

impl ValidationRule for ConstraintDefinitionRule {
    fn id(&self) -> &'static str {
        "constraint-definition"
    }

    fn description(&self) -> &'static str {
        "Constraint bodies must be valid and expression constraints must be Boolean"
    }

    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let model = context.model;
        let mut acceptor = ValidationAcceptor::new(self.id());

        for id in model.constraint_ids() {
            let node = NodeRef::Constraint(id);
            match model.constraint(id) {
                Some(ConstraintDefinition::Typed {
                    name_span,
                    constraint_type,
                    body,
                    ..
                }) => {
                    let Some(info) = context.registry.constraint_type_of(constraint_type) else {
                        continue;
                    };
                    check_property_body(
                        PropertyBodyCheck {
                            info,
                            body,
                            node,
                            anchor: *name_span,
                        },
                        context,
                        &mut acceptor,
                    );
                }
                Some(ConstraintDefinition::Expression { on, expression, .. }) => {
                    let Some(on_type) = context.value_types().resolve(on) else {
                        continue;
                    };
                    let typing = context.typing_context().with_value_keyword(on_type);
                    // issues inside the expression are reported by the expression rule
                    let mut issues = Vec::new();
                    let Some(actual) = infer_expression_type(expression, &typing, &mut issues)
                    else {
                        continue;
                    };
                    if !context
                        .value_types()
                        .is_convertible(&actual, &ValueType::BOOLEAN)
                    {
                        acceptor.error(
                            format!(
                                "The expression of a constraint needs to be of type {} but is \
                                 of type {}",
                                ValueType::BOOLEAN,
                                actual
                            ),
                            DiagnosticLocation::new(node, expression.span()),
                        );
                    }
                }
                None => {}
            }
        }

        acceptor.into_diagnostics()
    }
}
