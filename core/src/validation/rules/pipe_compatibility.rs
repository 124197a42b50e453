//! Rule: Pipe Compatibility
//!
//! A pipe may only connect a block with an output to a block with an input
//! of the same IO type. Blocks whose meta information cannot be determined
//! are skipped.
//!
//! # Examples
//!
//! ```conduit
//! // Error at both ends: File cannot be piped into a Table input
//! Source -> Loader;
//! ```

use crate::diagnostics::{Diagnostic, DiagnosticLocation, NodeRef, ValidationAcceptor};

use super::super::{ValidationContext, ValidationRule};
use super::bodies;

/// Rule that checks the IO types of connected blocks.
pub struct PipeCompatibilityRule;

impl ValidationRule for PipeCompatibilityRule {
    fn id(&self) -> &'static str {
        "pipe-compatibility"
    }

    fn description(&self) -> &'static str {
        "Pipes must connect an output to an input of the same IO type"
    }

    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let mut acceptor = ValidationAcceptor::new(self.id());

        for body in bodies(context.model) {
            for pipe in body.pipes() {
                let (Some(from), Some(to)) =
                    (context.block_type_of(pipe.from), context.block_type_of(pipe.to))
                else {
                    continue;
                };
                let node = NodeRef::Pipe(pipe.pipe);
                let at_from = DiagnosticLocation::new(node, pipe.from_span).index(pipe.hop);
                let at_to = DiagnosticLocation::new(node, pipe.to_span).index(pipe.hop);

                if !from.has_output() {
                    acceptor.error(
                        format!("Blocks of type {} do not have an output", from.name),
                        at_from.clone(),
                    );
                }
                if !to.has_input() {
                    acceptor.error(
                        format!("Blocks of type {} do not have an input", to.name),
                        at_to.clone(),
                    );
                }
                if from.has_output() && to.has_input() && !from.can_be_connected_to(&to) {
                    let message = format!(
                        "The output type \"{}\" of {} is incompatible with the input type \"{}\" \
                         of {}",
                        from.output, from.name, to.input, to.name
                    );
                    acceptor.error(message.clone(), at_from);
                    acceptor.error(message, at_to);
                }
            }
        }

        acceptor.into_diagnostics()
    }
}
