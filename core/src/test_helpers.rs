//! Test helpers for building models without a parser
//!
//! Every node the builder creates gets its own span (the `start` offset is a
//! running counter) so tests can tell diagnostics apart by location.

use crate::ast::link::link_model;
use crate::ast::*;
use crate::diagnostics::Diagnostic;
use crate::meta::MetaInformationRegistry;

/// Where newly added blocks and pipes go
#[derive(Debug, Clone, Copy)]
enum Body {
    None,
    Pipeline(PipelineId),
    Composite(BlockTypeId),
}

/// Incrementally assembles a [`Model`].
pub struct ModelBuilder {
    model: Model,
    body: Body,
    next_offset: usize,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self {
            model: Model::new(),
            body: Body::None,
            next_offset: 1,
        }
    }

    /// A fresh span, distinct from every other span of this builder
    pub fn span(&mut self) -> Span {
        let start = self.next_offset;
        self.next_offset += 1;
        Span::new(start, start + 1, start, 0, start, 1)
    }

    /// Start a pipeline; following blocks and pipes go into its body
    pub fn pipeline(&mut self, name: &str) -> PipelineId {
        let id = PipelineId(self.model.pipelines.len());
        let name_span = self.span();
        let span = self.span();
        self.model.pipelines.push(PipelineDefinition {
            name: name.to_string(),
            name_span,
            blocks: Vec::new(),
            pipes: Vec::new(),
            span,
        });
        self.body = Body::Pipeline(id);
        id
    }

    /// Start a composite block type; following blocks and pipes go into its
    /// body.
    pub fn composite(
        &mut self,
        name: &str,
        input: Option<&str>,
        output: Option<&str>,
        properties: Vec<PropertyDeclaration>,
    ) -> BlockTypeId {
        let id = BlockTypeId(self.model.block_types.len());
        let input = input.map(|io_type| self.port("inputs", io_type));
        let output = output.map(|io_type| self.port("outputs", io_type));
        let name_span = self.span();
        let span = self.span();
        self.model.block_types.push(CompositeBlockTypeDefinition {
            name: name.to_string(),
            name_span,
            input,
            output,
            properties,
            blocks: Vec::new(),
            pipes: Vec::new(),
            span,
        });
        self.body = Body::Composite(id);
        id
    }

    fn port(&mut self, name: &str, io_type: &str) -> IoPortDeclaration {
        IoPortDeclaration {
            name: name.to_string(),
            io_type: io_type.to_string(),
            io_type_span: self.span(),
            span: self.span(),
        }
    }

    pub fn block(
        &mut self,
        name: &str,
        block_type: &str,
        properties: Vec<(&str, PropertyValue)>,
    ) -> BlockId {
        let id = BlockId(self.model.blocks.len());
        let name_span = self.span();
        let type_span = self.span();
        let body = self.body(properties);
        let span = self.span();
        self.model.blocks.push(BlockDefinition {
            name: name.to_string(),
            name_span,
            block_type: Reference::new(block_type, type_span),
            body,
            span,
        });
        match self.body {
            Body::Pipeline(pipeline) => self.model.pipelines[pipeline.0].blocks.push(id),
            Body::Composite(block_type) => self.model.block_types[block_type.0].blocks.push(id),
            Body::None => {}
        }
        id
    }

    fn body(&mut self, properties: Vec<(&str, PropertyValue)>) -> PropertyBody {
        let properties = properties
            .into_iter()
            .map(|(name, value)| PropertyAssignment {
                name: name.to_string(),
                name_span: self.span(),
                value,
                span: self.span(),
            })
            .collect();
        PropertyBody {
            properties,
            span: self.span(),
        }
    }

    /// `pipe { from: FROM; to: TO; }`
    pub fn pipe(&mut self, from: &str, to: &str) -> PipeId {
        let from = Reference::new(from, self.span());
        let to = Reference::new(to, self.span());
        let span = self.span();
        self.push_pipe(PipeDefinition::Single { from, to, span })
    }

    /// `A -> B -> C`
    pub fn chain(&mut self, blocks: &[&str]) -> PipeId {
        let blocks = blocks
            .iter()
            .map(|name| Reference::new(*name, self.span()))
            .collect();
        let span = self.span();
        self.push_pipe(PipeDefinition::Chain { blocks, span })
    }

    fn push_pipe(&mut self, pipe: PipeDefinition) -> PipeId {
        let id = PipeId(self.model.pipes.len());
        self.model.pipes.push(pipe);
        match self.body {
            Body::Pipeline(pipeline) => self.model.pipelines[pipeline.0].pipes.push(id),
            Body::Composite(block_type) => self.model.block_types[block_type.0].pipes.push(id),
            Body::None => {}
        }
        id
    }

    pub fn value_type(
        &mut self,
        name: &str,
        generic_parameters: &[&str],
        supertype: Option<ValueTypeReference>,
        constraints: Option<Expression>,
    ) -> ValueTypeId {
        let id = ValueTypeId(self.model.value_types.len());
        let generic_parameters = generic_parameters
            .iter()
            .map(|name| GenericParameter {
                name: name.to_string(),
                span: self.span(),
            })
            .collect();
        let name_span = self.span();
        let span = self.span();
        self.model.value_types.push(ValueTypeDefinition {
            name: name.to_string(),
            name_span,
            generic_parameters,
            supertype,
            constraints,
            span,
        });
        id
    }

    /// `constraint NAME oftype TYPE { ... }`
    pub fn typed_constraint(
        &mut self,
        name: &str,
        constraint_type: &str,
        properties: Vec<(&str, PropertyValue)>,
    ) -> ConstraintId {
        let id = ConstraintId(self.model.constraints.len());
        let name_span = self.span();
        let constraint_type = Reference::new(constraint_type, self.span());
        let body = self.body(properties);
        let span = self.span();
        self.model.constraints.push(ConstraintDefinition::Typed {
            name: name.to_string(),
            name_span,
            constraint_type,
            body,
            span,
        });
        id
    }

    /// `constraint NAME on TYPE: EXPRESSION;`
    pub fn expression_constraint(
        &mut self,
        name: &str,
        on: ValueTypeReference,
        expression: Expression,
    ) -> ConstraintId {
        let id = ConstraintId(self.model.constraints.len());
        let name_span = self.span();
        let span = self.span();
        self.model.constraints.push(ConstraintDefinition::Expression {
            name: name.to_string(),
            name_span,
            on,
            expression,
            span,
        });
        id
    }

    /// A transform with the given ports and `PORT: EXPRESSION` assignments
    pub fn transform(
        &mut self,
        name: &str,
        ports: &[(PortKind, &str, ValueTypeReference)],
        assignments: Vec<(&str, Expression)>,
    ) -> TransformId {
        let id = TransformId(self.model.transforms.len());
        let ports = ports
            .iter()
            .map(|(kind, name, value_type)| TransformPort {
                kind: *kind,
                name: name.to_string(),
                name_span: self.span(),
                value_type: value_type.clone(),
                span: self.span(),
            })
            .collect();
        let output_assignments = assignments
            .into_iter()
            .map(|(port, expression)| TransformOutputAssignment {
                port: Reference::new(port, self.span()),
                expression,
                span: self.span(),
            })
            .collect();
        let name_span = self.span();
        let span = self.span();
        self.model.transforms.push(TransformDefinition {
            name: name.to_string(),
            name_span,
            ports,
            output_assignments,
            span,
        });
        id
    }

    /// The model as built, unlinked
    pub fn build(self) -> Model {
        self.model
    }

    /// Link against the built-in registry; link errors are returned as well
    pub fn link(self) -> (Model, Vec<Diagnostic>) {
        let mut model = self.model;
        let diagnostics = link_model(&mut model, &MetaInformationRegistry::with_builtins());
        (model, diagnostics)
    }

    /// Link and fail the test on any link error
    pub fn linked(self) -> Model {
        let (model, diagnostics) = self.link();
        assert!(diagnostics.is_empty(), "unexpected link errors: {:?}", diagnostics);
        model
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Expression Helpers
// ============================================================================

pub fn int(value: i64) -> Expression {
    Expression::Integer {
        value,
        span: Span::default(),
    }
}

pub fn dec(value: f64) -> Expression {
    Expression::Decimal {
        value,
        span: Span::default(),
    }
}

pub fn text(value: &str) -> Expression {
    Expression::Text {
        value: value.to_string(),
        span: Span::default(),
    }
}

pub fn boolean(value: bool) -> Expression {
    Expression::Boolean {
        value,
        span: Span::default(),
    }
}

pub fn regex(pattern: &str) -> Expression {
    Expression::Regex {
        pattern: pattern.to_string(),
        span: Span::default(),
    }
}

pub fn cells(range: CellRangeLiteral) -> Expression {
    Expression::CellRange {
        range,
        span: Span::default(),
    }
}

pub fn collection(elements: Vec<Expression>) -> Expression {
    Expression::Collection {
        elements,
        span: Span::default(),
    }
}

pub fn unary(operator: UnaryOperator, operand: Expression) -> Expression {
    Expression::Unary {
        operator,
        operand: Box::new(operand),
        span: Span::default(),
    }
}

pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Expression {
    Expression::Binary {
        operator,
        left: Box::new(left),
        right: Box::new(right),
        span: Span::default(),
    }
}

pub fn constraint_ref(name: &str) -> Expression {
    Expression::ConstraintRef {
        reference: Reference::new(name, Span::default()),
    }
}

pub fn transform_ref(name: &str) -> Expression {
    Expression::TransformRef {
        reference: Reference::new(name, Span::default()),
    }
}

pub fn variable(name: &str) -> Expression {
    Expression::Variable {
        reference: Reference::new(name, Span::default()),
    }
}

pub fn value_keyword() -> Expression {
    Expression::ValueKeyword {
        span: Span::default(),
    }
}

pub fn assign_type(column: &str, value_type: ValueTypeReference) -> Expression {
    Expression::ValueTypeAssignment {
        column: column.to_string(),
        value_type,
        span: Span::default(),
    }
}

/// `requires NAME`
pub fn requires(name: &str) -> PropertyValue {
    PropertyValue::RuntimeParameter {
        name: name.to_string(),
        span: Span::default(),
    }
}

/// A named value type use site, e.g. `vt("Text")`
pub fn vt(name: &str) -> ValueTypeReference {
    ValueTypeReference::named(name)
}

/// `Collection<ELEMENT>`
pub fn collection_of(element: ValueTypeReference) -> ValueTypeReference {
    ValueTypeReference::generic("Collection", vec![element])
}

/// `property NAME oftype TYPE: DEFAULT;`
pub fn declare(
    name: &str,
    value_type: ValueTypeReference,
    default: Option<Expression>,
) -> PropertyDeclaration {
    PropertyDeclaration {
        name: name.to_string(),
        name_span: Span::default(),
        value_type,
        default,
        span: Span::default(),
    }
}
