//! Validation Rules
//!
//! Each file in this module contains one validation rule.
//! Rules are organized by what they check:
//!
//! - `unique_names.rs` - Definitions and blocks sharing a name
//! - `value_type_definition.rs` - Supertype cycles, generics, attached constraints
//! - `value_type_reference.rs` - Every written value type: visibility and arity
//! - `constraint_definition.rs` - Typed constraint bodies, expression constraint types
//! - `transform_definition.rs` - Transform ports and the output assignment
//! - `composite_block_type.rs` - Composite ports, property declarations, body IO
//! - `pipeline_structure.rs` - Starting blocks, multiple inputs, cycles
//! - `pipe_compatibility.rs` - IO types on both sides of each pipe
//! - `block_properties.rs` - Block bodies against their block type
//! - `unused_block.rs` - Blocks with an unconnected input or output
//! - `expression.rs` - Typing, literal values and simplification of every expression
//!
//! `properties.rs` holds the property body checks shared by blocks and typed
//! constraints.

mod block_properties;
mod composite_block_type;
mod constraint_definition;
mod expression;
mod pipe_compatibility;
mod pipeline_structure;
mod properties;
mod transform_definition;
mod unique_names;
mod unused_block;
mod value_type_definition;
mod value_type_reference;

pub use block_properties::BlockPropertiesRule;
pub use composite_block_type::CompositeBlockTypeRule;
pub use constraint_definition::ConstraintDefinitionRule;
pub use expression::ExpressionRule;
pub use pipe_compatibility::PipeCompatibilityRule;
pub use pipeline_structure::PipelineStructureRule;
pub use transform_definition::TransformDefinitionRule;
pub use unique_names::UniqueNamesRule;
pub use unused_block::UnusedBlockRule;
pub use value_type_definition::ValueTypeDefinitionRule;
pub use value_type_reference::ValueTypeReferenceRule;

use crate::ast::{
    BlockId, ConstraintDefinition, Container, Expression, Model, PropertyBody, PropertyValue,
    ValueTypeReference,
};
use crate::diagnostics::NodeRef;
use crate::graph::PipelineWrapper;

/// Graph views of every pipeline and composite block type body
fn bodies(model: &Model) -> impl Iterator<Item = PipelineWrapper<'_>> {
    let pipelines = model.pipeline_ids().map(Container::Pipeline);
    let composites = model.block_type_ids().map(Container::Composite);
    pipelines
        .chain(composites)
        .filter_map(move |container| PipelineWrapper::for_container(model, container))
}

/// `"a", "b"` for messages
fn quoted_list<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| format!("\"{}\"", name.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn container_node(container: Container) -> NodeRef {
    match container {
        Container::Pipeline(id) => NodeRef::Pipeline(id),
        Container::Composite(id) => NodeRef::BlockType(id),
    }
}

/// `pipeline "P"` or `block type "T"`
fn container_label(model: &Model, container: Container) -> String {
    match container {
        Container::Pipeline(id) => {
            let name = model.pipeline(id).map(|p| p.name.as_str()).unwrap_or_default();
            format!("pipeline \"{}\"", name)
        }
        Container::Composite(id) => {
            let name = model.block_type(id).map(|t| t.name.as_str()).unwrap_or_default();
            format!("block type \"{}\"", name)
        }
    }
}

fn block_name(model: &Model, block: BlockId) -> &str {
    model.block(block).map(|b| b.name.as_str()).unwrap_or_default()
}

/// A top-level expression and where it is written
struct ExpressionSite<'m> {
    node: NodeRef,
    property: Option<&'m str>,
    expression: &'m Expression,
    /// Type of the `value` keyword inside an expression constraint
    value_keyword: Option<&'m ValueTypeReference>,
}

impl<'m> ExpressionSite<'m> {
    fn new(node: NodeRef, property: Option<&'m str>, expression: &'m Expression) -> Self {
        Self {
            node,
            property,
            expression,
            value_keyword: None,
        }
    }
}

/// Every top-level expression of the model, definitions first
fn expression_sites(model: &Model) -> Vec<ExpressionSite<'_>> {
    let mut sites = Vec::new();

    for id in model.value_type_ids() {
        if let Some(expression) = model.value_type(id).and_then(|v| v.constraints.as_ref()) {
            sites.push(ExpressionSite::new(
                NodeRef::ValueType(id),
                Some("constraints"),
                expression,
            ));
        }
    }
    for id in model.constraint_ids() {
        match model.constraint(id) {
            Some(ConstraintDefinition::Typed { body, .. }) => {
                push_body(&mut sites, NodeRef::Constraint(id), body);
            }
            Some(ConstraintDefinition::Expression { on, expression, .. }) => {
                sites.push(ExpressionSite {
                    value_keyword: Some(on),
                    ..ExpressionSite::new(NodeRef::Constraint(id), None, expression)
                });
            }
            None => {}
        }
    }
    for id in model.transform_ids() {
        let Some(transform) = model.transform(id) else {
            continue;
        };
        for assignment in &transform.output_assignments {
            sites.push(ExpressionSite::new(
                NodeRef::Transform(id),
                Some(&assignment.port.name),
                &assignment.expression,
            ));
        }
    }
    for id in model.block_type_ids() {
        let Some(block_type) = model.block_type(id) else {
            continue;
        };
        for declaration in &block_type.properties {
            if let Some(default) = &declaration.default {
                sites.push(ExpressionSite::new(
                    NodeRef::BlockType(id),
                    Some(&declaration.name),
                    default,
                ));
            }
        }
    }
    for id in model.block_ids() {
        if let Some(block) = model.block(id) {
            push_body(&mut sites, NodeRef::Block(id), &block.body);
        }
    }

    sites
}

fn push_body<'m>(sites: &mut Vec<ExpressionSite<'m>>, node: NodeRef, body: &'m PropertyBody) {
    for assignment in &body.properties {
        if let PropertyValue::Expression { expression } = &assignment.value {
            sites.push(ExpressionSite::new(node, Some(&assignment.name), expression));
        }
    }
}
