//! Rule: Composite Block Type
//!
//! Checks the declaration of a composite block type and its body against
//! the ports it declares:
//!
//! - `input`/`output` name a known IO type
//! - property names are unique and defaults have the declared type
//! - defaults do not fail to evaluate (e.g. divide by zero)
//! - the body's starting blocks accept the declared input type
//! - the body's final blocks produce the declared output type
//!
//! # Examples
//!
//! ```conduit
//! blocktype CarsLoader {
//!     input inputs oftype File;
//!     output outputs oftype Table;
//!
//!     // Error: the starting block takes a TextFile, not a File
//!     Lines -> Table;
//!     block Lines oftype TextRangeSelector {}
//!     block Table oftype TableInterpreter { header: true; columns: []; }
//! }
//! ```
//!
//! # Notes
//!
//! Blocks inside the body whose type cannot be determined are skipped.

use crate::ast::{BlockId, BlockTypeId, CompositeBlockTypeDefinition, IoPortDeclaration};
use crate::diagnostics::{Diagnostic, DiagnosticLocation, NodeRef, ValidationAcceptor};
use crate::error::EvaluationError;
use crate::expr::{evaluate_expression, infer_expression_type, EvaluationStrategy};
use crate::graph::PipelineWrapper;
use crate::meta::IoType;

use super::super::{ValidationContext, ValidationRule};
use super::block_name;

/// Rule that checks composite block type definitions.
pub struct CompositeBlockTypeRule;

impl ValidationRule for CompositeBlockTypeRule {
    fn id(&self) -> &'static str {
        "composite-block-type"
    }

    fn description(&self) -> &'static str {
        "Composite block types must declare valid ports and properties matching their body"
    }

    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let mut acceptor = ValidationAcceptor::new(self.id());
        for id in context.model.block_type_ids() {
            if let Some(definition) = context.model.block_type(id) {
                check_composite(id, definition, context, &mut acceptor);
            }
        }
        acceptor.into_diagnostics()
    }
}

fn check_composite(
    id: BlockTypeId,
    definition: &CompositeBlockTypeDefinition,
    context: &ValidationContext<'_>,
    acceptor: &mut ValidationAcceptor,
) {
    let node = NodeRef::BlockType(id);

    let input = port_type(definition.input.as_ref(), node, acceptor);
    let output = port_type(definition.output.as_ref(), node, acceptor);

    // Property declarations
    let provider = context.value_types();
    let evaluation = context.evaluation_context();
    let mut seen: Vec<&str> = Vec::new();
    for declaration in &definition.properties {
        let location =
            DiagnosticLocation::new(node, declaration.name_span).property(&declaration.name);
        if seen.contains(&declaration.name.as_str()) {
            acceptor.error(
                format!("The property \"{}\" is declared more than once", declaration.name),
                location.clone(),
            );
        }
        seen.push(&declaration.name);

        let (Some(default), Some(expected)) = (
            declaration.default.as_ref(),
            provider.resolve(&declaration.value_type),
        ) else {
            continue;
        };
        let mut issues = Vec::new();
        let Some(actual) = infer_expression_type(default, &context.typing_context(), &mut issues)
        else {
            continue;
        };
        if !provider.is_convertible(&actual, &expected) {
            acceptor.error(
                format!(
                    "The default value of property \"{}\" needs to be of type {} but is of \
                     type {}",
                    declaration.name, expected, actual
                ),
                location.with_span(default.span()),
            );
            continue;
        }
        match evaluate_expression(default, &evaluation, EvaluationStrategy::Lazy) {
            Ok(_) => {}
            // invalid literals are reported where they are written
            Err(EvaluationError::InvalidRegex { .. } | EvaluationError::InvalidCellRange(_)) => {}
            Err(err) => acceptor.error(
                format!(
                    "The default value of property \"{}\" cannot be evaluated: {}",
                    declaration.name, err
                ),
                location.with_span(default.span()),
            ),
        }
    }

    // Body against the declared ports
    let (Some(input), Some(output)) = (input, output) else {
        return;
    };
    let Some(body) = PipelineWrapper::for_composite(context.model, id) else {
        return;
    };
    let starting = body.starting_blocks();
    for block in &starting {
        let Some(info) = context.block_type_of(*block) else {
            continue;
        };
        if info.input != input {
            acceptor.error(
                format!(
                    "The input type \"{}\" of block \"{}\" does not match the declared input \
                     type \"{}\"",
                    info.input,
                    block_name(context.model, *block),
                    input
                ),
                block_location(context, *block),
            );
        }
    }
    // final blocks mirror starting blocks: no outgoing pipe
    for block in body.blocks() {
        if !body.outgoing_pipes(*block).is_empty() {
            continue;
        }
        let Some(info) = context.block_type_of(*block) else {
            continue;
        };
        if info.output != output {
            acceptor.error(
                format!(
                    "The output type \"{}\" of block \"{}\" does not match the declared output \
                     type \"{}\"",
                    info.output,
                    block_name(context.model, *block),
                    output
                ),
                block_location(context, *block),
            );
        }
    }
}

/// IO type of a declared port; `None` (after reporting) for unknown names
fn port_type(
    port: Option<&IoPortDeclaration>,
    node: NodeRef,
    acceptor: &mut ValidationAcceptor,
) -> Option<IoType> {
    let Some(port) = port else {
        return Some(IoType::None);
    };
    let io_type = IoType::from_name(&port.io_type);
    if io_type.is_none() {
        acceptor.error(
            format!("\"{}\" is not a known IO type", port.io_type),
            DiagnosticLocation::new(node, port.io_type_span),
        );
    }
    io_type
}

fn block_location(context: &ValidationContext<'_>, block: BlockId) -> DiagnosticLocation {
    let span = context
        .model
        .block(block)
        .map(|b| b.name_span)
        .unwrap_or_default();
    DiagnosticLocation::new(NodeRef::Block(block), span)
}
