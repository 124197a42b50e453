//! Rule: Pipeline Structure
//!
//! Checks the block graph of every pipeline and composite block type body:
//!
//! - at least one starting block (a block with outgoing but no ingoing pipes)
//! - at most one pipe into each block, reported once per offending pipe
//! - no cycles, reported once per pipe closing one
//!
//! # Examples
//!
//! ```conduit
//! // Error on both pipes: at most one pipe can be connected to "Z"
//! X -> Z;
//! Y -> Z;
//! ```

use crate::diagnostics::{Diagnostic, DiagnosticLocation, NodeRef, ValidationAcceptor};

use super::super::{ValidationContext, ValidationRule};
use super::{block_name, bodies, container_label, container_node};

/// Rule that checks pipeline topology.
pub struct PipelineStructureRule;

impl ValidationRule for PipelineStructureRule {
    fn id(&self) -> &'static str {
        "pipeline-structure"
    }

    fn description(&self) -> &'static str {
        "Pipelines need a starting block, single inputs and no cycles"
    }

    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let model = context.model;
        let mut acceptor = ValidationAcceptor::new(self.id());

        for body in bodies(model) {
            let container = body.container();

            if body.starting_blocks().is_empty() {
                acceptor.error(
                    format!(
                        "The {} has no starting block; a block without ingoing pipes is needed",
                        container_label(model, container)
                    ),
                    DiagnosticLocation::new(container_node(container), body.name_span()),
                );
            }

            for pipe in body.multiple_input_edges() {
                acceptor.error(
                    format!(
                        "At most one pipe can be connected to the input of block \"{}\"",
                        block_name(model, pipe.to)
                    ),
                    DiagnosticLocation::new(NodeRef::Pipe(pipe.pipe), pipe.to_span)
                        .index(pipe.hop),
                );
            }

            for pipe in body.find_cycles() {
                acceptor.error(
                    format!(
                        "The pipe from \"{}\" to \"{}\" closes a cycle",
                        block_name(model, pipe.from),
                        block_name(model, pipe.to)
                    ),
                    DiagnosticLocation::new(NodeRef::Pipe(pipe.pipe), pipe.from_span)
                        .index(pipe.hop),
                );
            }
        }

        acceptor.into_diagnostics()
    }
}
