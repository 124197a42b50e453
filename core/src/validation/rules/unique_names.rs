//! Rule: Unique Names
//!
//! Reports names that are defined more than once:
//!
//! - top-level definitions (pipelines, block types, value types,
//!   constraints, transforms) share one namespace
//! - block names must be unique within their pipeline or composite body
//! - user-defined block types and value types must not shadow built-in ones
//!
//! Every occurrence of a duplicated name is reported, so each definition
//! shows the problem.

use std::collections::HashMap;

use crate::ast::Span;
use crate::diagnostics::{Diagnostic, DiagnosticLocation, NodeRef, ValidationAcceptor};
use crate::types::PrimitiveValueType;

use super::super::{ValidationContext, ValidationRule};
use super::{bodies, container_label};

/// Rule that checks for duplicated and shadowing names.
pub struct UniqueNamesRule;

impl ValidationRule for UniqueNamesRule {
    fn id(&self) -> &'static str {
        "unique-names"
    }

    fn description(&self) -> &'static str {
        "Definitions and blocks must have unique names"
    }

    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let model = context.model;
        let mut acceptor = ValidationAcceptor::new(self.id());

        // Top-level definitions
        let mut definitions: Vec<(&str, NodeRef, Span)> = Vec::new();
        for id in model.pipeline_ids() {
            if let Some(pipeline) = model.pipeline(id) {
                definitions.push((&pipeline.name, NodeRef::Pipeline(id), pipeline.name_span));
            }
        }
        for id in model.block_type_ids() {
            if let Some(block_type) = model.block_type(id) {
                definitions.push((
                    &block_type.name,
                    NodeRef::BlockType(id),
                    block_type.name_span,
                ));
            }
        }
        for id in model.value_type_ids() {
            if let Some(value_type) = model.value_type(id) {
                definitions.push((
                    &value_type.name,
                    NodeRef::ValueType(id),
                    value_type.name_span,
                ));
            }
        }
        for id in model.constraint_ids() {
            if let Some(constraint) = model.constraint(id) {
                definitions.push((
                    constraint.name(),
                    NodeRef::Constraint(id),
                    constraint.name_span(),
                ));
            }
        }
        for id in model.transform_ids() {
            if let Some(transform) = model.transform(id) {
                definitions.push((&transform.name, NodeRef::Transform(id), transform.name_span));
            }
        }
        for (name, node, span) in duplicates(&definitions) {
            acceptor.error(
                format!("The name \"{}\" is defined more than once", name),
                DiagnosticLocation::new(node, span),
            );
        }

        // Blocks per body
        for body in bodies(model) {
            let blocks: Vec<(&str, NodeRef, Span)> = body
                .blocks()
                .iter()
                .filter_map(|id| {
                    let block = model.block(*id)?;
                    Some((block.name.as_str(), NodeRef::Block(*id), block.name_span))
                })
                .collect();
            for (name, node, span) in duplicates(&blocks) {
                acceptor.error(
                    format!(
                        "The block name \"{}\" is used more than once in the {}",
                        name,
                        container_label(model, body.container())
                    ),
                    DiagnosticLocation::new(node, span),
                );
            }
        }

        // Shadowed built-ins
        for id in model.block_type_ids() {
            let Some(block_type) = model.block_type(id) else {
                continue;
            };
            if context.registry.block_type(&block_type.name).is_some()
                || context.registry.constraint_type(&block_type.name).is_some()
            {
                acceptor.error(
                    format!(
                        "The block type \"{}\" shadows a built-in type of the same name",
                        block_type.name
                    ),
                    DiagnosticLocation::new(NodeRef::BlockType(id), block_type.name_span),
                );
            }
        }
        for id in model.value_type_ids() {
            let Some(value_type) = model.value_type(id) else {
                continue;
            };
            if PrimitiveValueType::from_name(&value_type.name).is_some()
                || value_type.name == "Collection"
            {
                acceptor.error(
                    format!(
                        "The value type \"{}\" shadows a built-in value type of the same name",
                        value_type.name
                    ),
                    DiagnosticLocation::new(NodeRef::ValueType(id), value_type.name_span),
                );
            }
        }

        acceptor.into_diagnostics()
    }
}

/// Entries whose name occurs more than once, in their original order
fn duplicates<'a>(entries: &[(&'a str, NodeRef, Span)]) -> Vec<(&'a str, NodeRef, Span)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (name, _, _) in entries {
        *counts.entry(name).or_default() += 1;
    }
    entries
        .iter()
        .filter(|(name, _, _)| counts.get(name).is_some_and(|count| *count > 1))
        .copied()
        .collect()
}
