//! Rule: Value Type Reference
//!
//! Checks every place a value type is written: composite property
//! declarations, `oftype` supertypes, the `on` type of expression
//! constraints, transform ports and `"column" oftype TYPE` assignments.
//!
//! - internal primitives (`Constraint`, `Transform`, ...) cannot be named
//! - the number of generic arguments must match the referenced type
//!
//! Generic arguments are checked recursively. Unresolved names were already
//! reported by the linker.
//!
//! # Examples
//!
//! ```conduit
//! // Error: Collection expects exactly one generic argument
//! property columns oftype Collection<Text, Text>;
//!
//! // Error: Text is not generic
//! valuetype Name oftype Text<Integer> {}
//! ```

use crate::ast::{ConstraintDefinition, Expression, ValueTypeReference, ValueTypeTarget};
use crate::diagnostics::{Diagnostic, DiagnosticLocation, NodeRef, ValidationAcceptor};

use super::super::{ValidationContext, ValidationRule};
use super::expression_sites;

/// Rule that checks value type use sites.
pub struct ValueTypeReferenceRule;

impl ValidationRule for ValueTypeReferenceRule {
    fn id(&self) -> &'static str {
        "value-type-reference"
    }

    fn description(&self) -> &'static str {
        "Referenced value types must be usable and have the right number of generic arguments"
    }

    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let model = context.model;
        let mut checker = ReferenceChecker {
            context,
            acceptor: ValidationAcceptor::new(self.id()),
        };

        for id in model.block_type_ids() {
            let Some(block_type) = model.block_type(id) else {
                continue;
            };
            for declaration in &block_type.properties {
                checker.check(&declaration.value_type, NodeRef::BlockType(id));
            }
        }
        for id in model.value_type_ids() {
            if let Some(supertype) = model.value_type(id).and_then(|v| v.supertype.as_ref()) {
                checker.check(supertype, NodeRef::ValueType(id));
            }
        }
        for id in model.constraint_ids() {
            if let Some(ConstraintDefinition::Expression { on, .. }) =
                model.constraint(id)
            {
                checker.check(on, NodeRef::Constraint(id));
            }
        }
        for id in model.transform_ids() {
            let Some(transform) = model.transform(id) else {
                continue;
            };
            for port in &transform.ports {
                checker.check(&port.value_type, NodeRef::Transform(id));
            }
        }
        for site in expression_sites(model) {
            site.expression.walk(&mut |expression| {
                if let Expression::ValueTypeAssignment { value_type, .. } = expression {
                    checker.check(value_type, site.node);
                }
            });
        }

        checker.acceptor.into_diagnostics()
    }
}

struct ReferenceChecker<'c, 'a> {
    context: &'c ValidationContext<'a>,
    acceptor: ValidationAcceptor,
}

impl ReferenceChecker<'_, '_> {
    fn check(&mut self, reference: &ValueTypeReference, node: NodeRef) {
        let Some(target) = reference.reference.get() else {
            return;
        };
        let name = &reference.reference.name;
        let location = DiagnosticLocation::new(node, reference.reference.span);
        let arguments = reference.generic_arguments.len();

        match target {
            ValueTypeTarget::Primitive(primitive) => {
                if !primitive.is_referenceable_by_user() {
                    self.acceptor.error(
                        format!("Value type {} cannot be referenced in this context", name),
                        location.clone(),
                    );
                }
                if arguments > 0 {
                    self.not_generic(name, location);
                }
            }
            ValueTypeTarget::GenericParameter { .. } => {
                if arguments > 0 {
                    self.not_generic(name, location);
                }
            }
            ValueTypeTarget::Collection => {
                if arguments != 1 {
                    self.wrong_arity(name, 1, arguments, location);
                }
            }
            ValueTypeTarget::Defined(id) => {
                let expected = self
                    .context
                    .model
                    .value_type(id)
                    .map(|definition| definition.generic_parameters.len());
                if let Some(expected) = expected.filter(|expected| *expected != arguments) {
                    if expected == 0 {
                        self.not_generic(name, location);
                    } else {
                        self.wrong_arity(name, expected, arguments, location);
                    }
                }
            }
        }

        for argument in &reference.generic_arguments {
            self.check(argument, node);
        }
    }

    fn not_generic(&mut self, name: &str, location: DiagnosticLocation) {
        self.acceptor.error(
            format!("Value type {} does not take generic arguments", name),
            location,
        );
    }

    fn wrong_arity(
        &mut self,
        name: &str,
        expected: usize,
        actual: usize,
        location: DiagnosticLocation,
    ) {
        self.acceptor.error(
            format!(
                "Value type {} expects {} generic argument(s) but {} were given",
                name, expected, actual
            ),
            location,
        );
    }
}
