//! Single-document linker.
//!
//! Fills in the `target` of every by-name [`Reference`] in a [`Model`]. Names
//! are looked up in the scope a reference appears in:
//!
//! - pipe endpoints: blocks of the enclosing pipeline or composite body
//! - block types: composite block types of the model, then built-ins
//! - constraint types: built-ins
//! - value types: generic parameters of the enclosing value type, then
//!   user-defined value types, then primitives and `Collection`
//! - constraints and transforms: model-wide
//! - variables: `from` ports of the enclosing transform
//!
//! A name that cannot be found stays unresolved and is reported once as an
//! `unresolved-reference` error. References that already carry a target are
//! left alone, so linking twice is harmless.

use std::collections::HashMap;

use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticLocation, NodeRef, ValidationAcceptor};
use crate::meta::MetaInformationRegistry;
use crate::types::PrimitiveValueType;

use super::{
    BlockId, BlockTypeId, ConstraintDefinition, ConstraintId, Expression, Model, PipeId,
    PortTarget, PropertyBody, PropertyValue, Reference, TransformId, TypeTarget, ValueTypeId,
    ValueTypeReference, ValueTypeTarget,
};

pub const RULE_ID: &str = "unresolved-reference";

/// Resolve all references of `model` in place.
///
/// Returns one diagnostic per reference that could not be resolved.
pub fn link_model(model: &mut Model, registry: &MetaInformationRegistry) -> Vec<Diagnostic> {
    let mut linker = Linker {
        names: Names::collect(model),
        registry,
        acceptor: ValidationAcceptor::new(RULE_ID),
    };

    let body_scopes = body_scopes(model);

    for (index, block) in model.blocks.iter_mut().enumerate() {
        let node = NodeRef::Block(BlockId(index));
        let target = linker.block_type_target(&block.block_type.name);
        linker.resolve(&mut block.block_type, target, "block type", node);
        linker.link_body(&mut block.body, Scope::EMPTY, node);
    }

    for (index, pipe) in model.pipes.iter_mut().enumerate() {
        let id = PipeId(index);
        let blocks = body_scopes.get(&id);
        for endpoint in pipe.endpoints_mut() {
            let target = blocks.and_then(|names| names.get(&endpoint.name).copied());
            linker.resolve(endpoint, target, "block", NodeRef::Pipe(id));
        }
    }

    for (index, block_type) in model.block_types.iter_mut().enumerate() {
        let node = NodeRef::BlockType(BlockTypeId(index));
        for declaration in &mut block_type.properties {
            linker.link_value_type(&mut declaration.value_type, Scope::EMPTY, node);
            if let Some(default) = &mut declaration.default {
                linker.link_expression(default, Scope::EMPTY, node);
            }
        }
    }

    let generic_names: Vec<Vec<String>> = model
        .value_types
        .iter()
        .map(|t| t.generic_parameters.iter().map(|p| p.name.clone()).collect())
        .collect();
    for (index, value_type) in model.value_types.iter_mut().enumerate() {
        let id = ValueTypeId(index);
        let node = NodeRef::ValueType(id);
        let scope = Scope {
            generics: Some((id, generic_names[index].as_slice())),
            ports: None,
        };
        if let Some(supertype) = &mut value_type.supertype {
            linker.link_value_type(supertype, scope, node);
        }
        if let Some(constraints) = &mut value_type.constraints {
            linker.link_expression(constraints, scope, node);
        }
    }

    for (index, constraint) in model.constraints.iter_mut().enumerate() {
        let node = NodeRef::Constraint(ConstraintId(index));
        match constraint {
            ConstraintDefinition::Typed {
                constraint_type,
                body,
                ..
            } => {
                let target = linker
                    .registry
                    .constraint_type(&constraint_type.name)
                    .map(|_| TypeTarget::Builtin);
                linker.resolve(constraint_type, target, "constraint type", node);
                linker.link_body(body, Scope::EMPTY, node);
            }
            ConstraintDefinition::Expression { on, expression, .. } => {
                linker.link_value_type(on, Scope::EMPTY, node);
                linker.link_expression(expression, Scope::EMPTY, node);
            }
        }
    }

    for (index, transform) in model.transforms.iter_mut().enumerate() {
        let id = TransformId(index);
        let node = NodeRef::Transform(id);
        for port in &mut transform.ports {
            linker.link_value_type(&mut port.value_type, Scope::EMPTY, node);
        }
        let inputs: Vec<(String, usize)> = transform
            .input_ports()
            .map(|(position, port)| (port.name.clone(), position))
            .collect();
        let all_ports: Vec<(String, usize)> = transform
            .ports
            .iter()
            .enumerate()
            .map(|(position, port)| (port.name.clone(), position))
            .collect();
        let scope = Scope {
            generics: None,
            ports: Some((id, inputs.as_slice())),
        };
        for assignment in &mut transform.output_assignments {
            let target = lookup(&all_ports, &assignment.port.name);
            linker.resolve(&mut assignment.port, target, "port", node);
            linker.link_expression(&mut assignment.expression, scope, node);
        }
    }

    let diagnostics = linker.acceptor.into_diagnostics();
    debug!(unresolved = diagnostics.len(), "model linked");
    diagnostics
}

/// Model-wide name tables; the first definition of a name wins
struct Names {
    block_types: HashMap<String, BlockTypeId>,
    value_types: HashMap<String, ValueTypeId>,
    constraints: HashMap<String, ConstraintId>,
    transforms: HashMap<String, TransformId>,
}

impl Names {
    fn collect(model: &Model) -> Self {
        fn first_wins<'a, I: Copy>(
            names: impl Iterator<Item = (&'a str, I)>,
        ) -> HashMap<String, I> {
            let mut table = HashMap::new();
            for (name, id) in names {
                table.entry(name.to_string()).or_insert(id);
            }
            table
        }

        Self {
            block_types: first_wins(
                model
                    .block_type_ids()
                    .zip(&model.block_types)
                    .map(|(id, t)| (t.name.as_str(), id)),
            ),
            value_types: first_wins(
                model
                    .value_type_ids()
                    .zip(&model.value_types)
                    .map(|(id, t)| (t.name.as_str(), id)),
            ),
            constraints: first_wins(
                model
                    .constraint_ids()
                    .zip(&model.constraints)
                    .map(|(id, c)| (c.name(), id)),
            ),
            transforms: first_wins(
                model
                    .transform_ids()
                    .zip(&model.transforms)
                    .map(|(id, t)| (t.name.as_str(), id)),
            ),
        }
    }
}

/// Block names visible to each pipe, taken from the body that lists it
fn body_scopes(model: &Model) -> HashMap<PipeId, HashMap<String, BlockId>> {
    let bodies = model
        .pipelines
        .iter()
        .map(|p| (&p.blocks, &p.pipes))
        .chain(model.block_types.iter().map(|t| (&t.blocks, &t.pipes)));

    let mut scopes = HashMap::new();
    for (blocks, pipes) in bodies {
        let mut names = HashMap::new();
        for id in blocks {
            if let Some(block) = model.block(*id) {
                names.entry(block.name.clone()).or_insert(*id);
            }
        }
        for pipe in pipes {
            scopes.insert(*pipe, names.clone());
        }
    }
    scopes
}

fn lookup(names: &[(String, usize)], name: &str) -> Option<usize> {
    names.iter().find(|(n, _)| n == name).map(|(_, index)| *index)
}

/// Names that are only visible inside one definition
#[derive(Debug, Clone, Copy)]
struct Scope<'s> {
    generics: Option<(ValueTypeId, &'s [String])>,
    ports: Option<(TransformId, &'s [(String, usize)])>,
}

impl Scope<'_> {
    const EMPTY: Scope<'static> = Scope {
        generics: None,
        ports: None,
    };
}

struct Linker<'r> {
    names: Names,
    registry: &'r MetaInformationRegistry,
    acceptor: ValidationAcceptor,
}

impl Linker<'_> {
    fn resolve<T: Copy>(
        &mut self,
        reference: &mut Reference<T>,
        target: Option<T>,
        kind: &str,
        node: NodeRef,
    ) {
        if reference.is_resolved() {
            return;
        }
        match target {
            Some(target) => reference.target = Some(target),
            None => self.acceptor.error(
                format!("Could not resolve reference to {} \"{}\"", kind, reference.name),
                DiagnosticLocation::new(node, reference.span),
            ),
        }
    }

    fn block_type_target(&self, name: &str) -> Option<TypeTarget> {
        if let Some(id) = self.names.block_types.get(name) {
            return Some(TypeTarget::Composite(*id));
        }
        self.registry.block_type(name).map(|_| TypeTarget::Builtin)
    }

    fn value_type_target(&self, name: &str, scope: Scope<'_>) -> Option<ValueTypeTarget> {
        if let Some((owner, parameters)) = scope.generics {
            if let Some(index) = parameters.iter().position(|p| p == name) {
                return Some(ValueTypeTarget::GenericParameter { owner, index });
            }
        }
        if let Some(id) = self.names.value_types.get(name) {
            return Some(ValueTypeTarget::Defined(*id));
        }
        if let Some(primitive) = PrimitiveValueType::from_name(name) {
            return Some(ValueTypeTarget::Primitive(primitive));
        }
        (name == "Collection").then_some(ValueTypeTarget::Collection)
    }

    fn link_value_type(
        &mut self,
        reference: &mut ValueTypeReference,
        scope: Scope<'_>,
        node: NodeRef,
    ) {
        let target = self.value_type_target(&reference.reference.name, scope);
        self.resolve(&mut reference.reference, target, "value type", node);
        for argument in &mut reference.generic_arguments {
            self.link_value_type(argument, scope, node);
        }
    }

    fn link_body(&mut self, body: &mut PropertyBody, scope: Scope<'_>, node: NodeRef) {
        for property in &mut body.properties {
            if let PropertyValue::Expression { expression } = &mut property.value {
                self.link_expression(expression, scope, node);
            }
        }
    }

    fn link_expression(&mut self, expression: &mut Expression, scope: Scope<'_>, node: NodeRef) {
        match expression {
            Expression::ConstraintRef { reference } => {
                let target = self.names.constraints.get(&reference.name).copied();
                self.resolve(reference, target, "constraint", node);
            }
            Expression::TransformRef { reference } => {
                let target = self.names.transforms.get(&reference.name).copied();
                self.resolve(reference, target, "transform", node);
            }
            Expression::Variable { reference } => {
                let target = scope.ports.and_then(|(transform, inputs)| {
                    lookup(inputs, &reference.name).map(|port| PortTarget { transform, port })
                });
                self.resolve(reference, target, "variable", node);
            }
            Expression::ValueTypeAssignment { value_type, .. } => {
                self.link_value_type(value_type, scope, node);
            }
            Expression::Collection { elements, .. } => {
                for element in elements {
                    self.link_expression(element, scope, node);
                }
            }
            Expression::Unary { operand, .. } => self.link_expression(operand, scope, node),
            Expression::Binary { left, right, .. } => {
                self.link_expression(left, scope, node);
                self.link_expression(right, scope, node);
            }
            Expression::Ternary {
                first,
                second,
                third,
                ..
            } => {
                self.link_expression(first, scope, node);
                self.link_expression(second, scope, node);
                self.link_expression(third, scope, node);
            }
            Expression::Boolean { .. }
            | Expression::Integer { .. }
            | Expression::Decimal { .. }
            | Expression::Text { .. }
            | Expression::Regex { .. }
            | Expression::CellRange { .. }
            | Expression::ValueKeyword { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BlockDefinition, PipeDefinition, PipelineDefinition, PortKind, Span};

    fn block(name: &str, block_type: &str) -> BlockDefinition {
        BlockDefinition {
            name: name.to_string(),
            name_span: Span::default(),
            block_type: Reference::new(block_type, Span::default()),
            body: PropertyBody::default(),
            span: Span::default(),
        }
    }

    #[test]
    fn test_links_blocks_and_builtin_types() {
        let mut model = Model::new();
        model.blocks.push(block("Source", "HttpExtractor"));
        model.blocks.push(block("Sink", "SQLiteLoader"));
        model.pipes.push(PipeDefinition::Chain {
            blocks: vec![
                Reference::new("Source", Span::default()),
                Reference::new("Sink", Span::default()),
            ],
            span: Span::default(),
        });
        model.pipelines.push(PipelineDefinition {
            name: "P".to_string(),
            name_span: Span::default(),
            blocks: vec![BlockId(0), BlockId(1)],
            pipes: vec![PipeId(0)],
            span: Span::default(),
        });

        let diagnostics = link_model(&mut model, &MetaInformationRegistry::with_builtins());

        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(model.blocks[0].block_type.get(), Some(TypeTarget::Builtin));
        let endpoints: Vec<_> = model.pipes[0].endpoints().iter().map(|r| r.get()).collect();
        assert_eq!(endpoints, vec![Some(BlockId(0)), Some(BlockId(1))]);
    }

    #[test]
    fn test_unresolved_names_are_reported_once_each() {
        let mut model = Model::new();
        model.blocks.push(block("Source", "NoSuchExtractor"));
        model.pipes.push(PipeDefinition::Single {
            from: Reference::new("Source", Span::default()),
            to: Reference::new("Missing", Span::default()),
            span: Span::default(),
        });
        model.pipelines.push(PipelineDefinition {
            name: "P".to_string(),
            name_span: Span::default(),
            blocks: vec![BlockId(0)],
            pipes: vec![PipeId(0)],
            span: Span::default(),
        });

        let diagnostics = link_model(&mut model, &MetaInformationRegistry::with_builtins());

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.rule_id == RULE_ID && d.is_error()));
        assert!(diagnostics[0].message.contains("NoSuchExtractor"));
        assert!(diagnostics[1].message.contains("\"Missing\""));
        assert!(model.blocks[0].block_type.get().is_none());
    }

    #[test]
    fn test_blocks_of_other_bodies_are_not_visible() {
        let mut model = Model::new();
        model.blocks.push(block("A", "HttpExtractor"));
        model.blocks.push(block("B", "SQLiteLoader"));
        model.pipes.push(PipeDefinition::Single {
            from: Reference::new("A", Span::default()),
            to: Reference::new("B", Span::default()),
            span: Span::default(),
        });
        for (name, blocks, pipes) in [
            ("First", vec![BlockId(0)], vec![PipeId(0)]),
            ("Second", vec![BlockId(1)], vec![]),
        ] {
            model.pipelines.push(PipelineDefinition {
                name: name.to_string(),
                name_span: Span::default(),
                blocks,
                pipes,
                span: Span::default(),
            });
        }

        let diagnostics = link_model(&mut model, &MetaInformationRegistry::with_builtins());

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("\"B\""));
    }

    #[test]
    fn test_value_type_scopes() {
        let mut model = Model::new();
        model.value_types.push(crate::ast::ValueTypeDefinition {
            name: "Wrapper".to_string(),
            name_span: Span::default(),
            generic_parameters: vec![crate::ast::GenericParameter {
                name: "T".to_string(),
                span: Span::default(),
            }],
            supertype: Some(ValueTypeReference::generic(
                "Collection",
                vec![ValueTypeReference::named("T")],
            )),
            constraints: None,
            span: Span::default(),
        });

        let diagnostics = link_model(&mut model, &MetaInformationRegistry::new());

        assert!(diagnostics.is_empty());
        let supertype = model.value_types[0].supertype.as_ref().unwrap();
        assert_eq!(supertype.reference.get(), Some(ValueTypeTarget::Collection));
        assert_eq!(
            supertype.generic_arguments[0].reference.get(),
            Some(ValueTypeTarget::GenericParameter {
                owner: ValueTypeId(0),
                index: 0
            })
        );
    }

    #[test]
    fn test_variables_resolve_to_input_ports_only() {
        use crate::ast::{TransformDefinition, TransformOutputAssignment, TransformPort};

        let port = |kind, name: &str| TransformPort {
            kind,
            name: name.to_string(),
            name_span: Span::default(),
            value_type: ValueTypeReference::named("Integer"),
            span: Span::default(),
        };
        let variable = |name: &str| Expression::Variable {
            reference: Reference::new(name, Span::default()),
        };
        let mut model = Model::new();
        model.transforms.push(TransformDefinition {
            name: "Double".to_string(),
            name_span: Span::default(),
            ports: vec![port(PortKind::From, "x"), port(PortKind::To, "y")],
            output_assignments: vec![TransformOutputAssignment {
                port: Reference::new("y", Span::default()),
                expression: Expression::Binary {
                    operator: crate::ast::BinaryOperator::Add,
                    left: Box::new(variable("x")),
                    right: Box::new(variable("y")),
                    span: Span::default(),
                },
                span: Span::default(),
            }],
            span: Span::default(),
        });

        let diagnostics = link_model(&mut model, &MetaInformationRegistry::new());

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("variable \"y\""));
        let assignment = &model.transforms[0].output_assignments[0];
        assert_eq!(assignment.port.get(), Some(1));
        let Expression::Binary { left, .. } = &assignment.expression else {
            panic!("expected a binary expression");
        };
        let Expression::Variable { reference } = left.as_ref() else {
            panic!("expected a variable");
        };
        assert_eq!(
            reference.get(),
            Some(PortTarget {
                transform: TransformId(0),
                port: 0
            })
        );
    }
}
