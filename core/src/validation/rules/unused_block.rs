//! Rule: Unused Block
//!
//! Warns about a block whose type has an input (or output) that no pipe is
//! connected to. The warning is anchored at the block's name.
//!
//! # Notes
//!
//! - Inside a composite block type, every starting block is fed by the
//!   composite's input and every block without outgoing pipes feeds its
//!   output, as long as the composite declares them. Whether their IO types
//!   fit is checked by `composite-block-type`.
//! - This is a warning, not an error: the block is simply never run.
//! - Can be switched off with `diagnostics.unused_block_warnings`.

use crate::ast::Container;
use crate::diagnostics::{Diagnostic, DiagnosticLocation, NodeRef, ValidationAcceptor};
use crate::graph::PipelineWrapper;
use crate::meta::BlockTypeInfo;

use super::super::{ValidationContext, ValidationRule};
use super::bodies;

/// Rule that checks for blocks with unconnected sides.
pub struct UnusedBlockRule;

impl ValidationRule for UnusedBlockRule {
    fn id(&self) -> &'static str {
        "unused-block"
    }

    fn description(&self) -> &'static str {
        "Every input and output of a block should be connected"
    }

    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let mut acceptor = ValidationAcceptor::new(self.id());
        if !context.options.unused_block_warnings {
            return acceptor.into_diagnostics();
        }

        for body in bodies(context.model) {
            let (fed_by_container, feeds_container) = container_ports(context, &body);
            for &block in body.blocks() {
                let Some(info) = context.block_type_of(block) else {
                    continue;
                };
                let Some(definition) = context.model.block(block) else {
                    continue;
                };
                let location =
                    DiagnosticLocation::new(NodeRef::Block(block), definition.name_span);

                if info.has_input() && body.ingoing_pipes(block).is_empty() && !fed_by_container {
                    acceptor.warning(
                        format!(
                            "A pipe should be connected to the input of block \"{}\"",
                            definition.name
                        ),
                        location.clone(),
                    );
                }
                if info.has_output() && body.outgoing_pipes(block).is_empty() && !feeds_container
                {
                    acceptor.warning(
                        format!(
                            "A pipe should be connected to the output of block \"{}\"",
                            definition.name
                        ),
                        location,
                    );
                }
            }
        }

        acceptor.into_diagnostics()
    }
}

/// Whether the body's container declares an input and an output
fn container_ports(context: &ValidationContext<'_>, body: &PipelineWrapper<'_>) -> (bool, bool) {
    let Container::Composite(id) = body.container() else {
        return (false, false);
    };
    match BlockTypeInfo::from_composite(context.model, id, context.operators) {
        Ok(info) => (info.has_input(), info.has_output()),
        Err(_) => (false, false),
    }
}
