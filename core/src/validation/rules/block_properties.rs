//! Rule: Block Properties
//!
//! Checks every block body against the meta information of its block type:
//! known and unique property names, value types, evaluable values, property
//! validators, required properties and the type's body validator.
//!
//! # Examples
//!
//! ```conduit
//! // Error: the following required properties are missing: "url"
//! block Source oftype HttpExtractor { }
//! ```
//!
//! # Notes
//!
//! - Composite block types treat a property with a default expression as
//!   optional even if the expression cannot be folded. A hint on the block
//!   points out each such property that the block leaves unassigned.

use crate::diagnostics::{Diagnostic, DiagnosticLocation, NodeRef, ValidationAcceptor};

use super::super::{ValidationContext, ValidationRule};
use super::properties::{check_property_body, PropertyBodyCheck};

/// Rule that checks block bodies against their block types.
pub struct BlockPropertiesRule;

impl ValidationRule for BlockPropertiesRule {
    fn id(&self) -> &'static str {
        "block-properties"
    }

    fn description(&self) -> &'static str {
        "Block bodies must match the properties of their block type"
    }

    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let mut acceptor = ValidationAcceptor::new(self.id());

        for id in context.model.block_ids() {
            let Some(block) = context.model.block(id) else {
                continue;
            };
            let Some(info) = context.block_type_of(id) else {
                continue;
            };
            let node = NodeRef::Block(id);
            check_property_body(
                PropertyBodyCheck {
                    info: &*info,
                    body: &block.body,
                    node,
                    anchor: block.name_span,
                },
                context,
                &mut acceptor,
            );

            if !info.is_composite() {
                continue;
            }
            for name in info.expression_default_names() {
                if block.body.property(name).is_none() {
                    acceptor.hint(
                        format!(
                            "Property \"{}\" is not assigned; its default expression is assumed \
                             to be evaluable at runtime",
                            name
                        ),
                        DiagnosticLocation::new(node, block.name_span).property(name),
                    );
                }
            }
        }

        acceptor.into_diagnostics()
    }
}
