//! Abstract Syntax Tree node types
//!
//! The parser hands over one document as an arena-shaped [`Model`]: every
//! node kind lives in its own `Vec` and nodes point at each other through
//! typed ids. Cross references carry a [`Reference`] whose `target` is filled
//! in by the linker (see [`link`]). Consumers trust a reference once its
//! target is set and quietly skip it otherwise.
//!
//! The whole tree is `serde`-serializable so an external parser can pass it
//! over as JSON.

mod expr;
pub mod link;

pub use expr::*;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::types::PrimitiveValueType;

/* ===================== Spans ===================== */

/// Source location span for error reporting and editor tooling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    /// Start byte offset
    pub start: usize,
    /// End byte offset
    pub end: usize,
    /// Start line (0-indexed)
    pub start_line: usize,
    /// Start column (0-indexed)
    pub start_col: usize,
    /// End line (0-indexed)
    pub end_line: usize,
    /// End column (0-indexed)
    pub end_col: usize,
}

impl Span {
    pub fn new(
        start: usize,
        end: usize,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Self {
        Self {
            start,
            end,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Create a span that covers both self and other
    pub fn merge(&self, other: &Span) -> Span {
        let (start_line, start_col) = if self.start <= other.start {
            (self.start_line, self.start_col)
        } else {
            (other.start_line, other.start_col)
        };
        let (end_line, end_col) = if self.end >= other.end {
            (self.end_line, self.end_col)
        } else {
            (other.end_line, other.end_col)
        };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }
}

/// Helper function for serde to skip serializing default spans
pub(crate) fn is_default_span(span: &Span) -> bool {
    *span == Span::default()
}

/* ===================== Ids ===================== */

macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

arena_id!(
    /// Index into [`Model::blocks`]
    BlockId
);
arena_id!(
    /// Index into [`Model::pipes`]
    PipeId
);
arena_id!(
    /// Index into [`Model::pipelines`]
    PipelineId
);
arena_id!(
    /// Index into [`Model::block_types`]
    BlockTypeId
);
arena_id!(
    /// Index into [`Model::value_types`]
    ValueTypeId
);
arena_id!(
    /// Index into [`Model::constraints`]
    ConstraintId
);
arena_id!(
    /// Index into [`Model::transforms`]
    TransformId
);

/* ===================== References ===================== */

/// A by-name cross reference.
///
/// `target` is `None` until the linker resolved the name. A reference that
/// stays unresolved is a link error which is reported once by the linker;
/// everything downstream treats it as "nothing to check".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference<T> {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub target: Option<T>,
}

impl<T: Copy> Reference<T> {
    /// Create an unresolved reference
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
            target: None,
        }
    }

    /// Create a reference that is already linked
    pub fn resolved(name: impl Into<String>, span: Span, target: T) -> Self {
        Self {
            name: name.into(),
            span,
            target: Some(target),
        }
    }

    /// The linked target, if any
    pub fn get(&self) -> Option<T> {
        self.target
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }
}

/// What a block type or constraint type reference points at.
///
/// Built-in types live in the [`MetaInformationRegistry`](crate::meta::MetaInformationRegistry)
/// and are looked up by the reference's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTarget {
    Builtin,
    Composite(BlockTypeId),
}

/// What a value type reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueTypeTarget {
    Primitive(PrimitiveValueType),
    /// The built-in generic `Collection<T>`
    Collection,
    /// A user-defined value type
    Defined(ValueTypeId),
    /// The `index`-th generic parameter of the user-defined value type `owner`
    GenericParameter { owner: ValueTypeId, index: usize },
}

/// Target of a variable expression: one port of a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortTarget {
    pub transform: TransformId,
    pub port: usize,
}

/* ===================== Model ===================== */

/// One parsed and linked document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Model {
    pub blocks: Vec<BlockDefinition>,
    pub pipes: Vec<PipeDefinition>,
    pub pipelines: Vec<PipelineDefinition>,
    pub block_types: Vec<CompositeBlockTypeDefinition>,
    pub value_types: Vec<ValueTypeDefinition>,
    pub constraints: Vec<ConstraintDefinition>,
    pub transforms: Vec<TransformDefinition>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserialize a model from the parser's JSON output
    pub fn from_json(source: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Read and deserialize a model file
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, LoadError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    pub fn block(&self, id: BlockId) -> Option<&BlockDefinition> {
        self.blocks.get(id.0)
    }

    pub fn pipe(&self, id: PipeId) -> Option<&PipeDefinition> {
        self.pipes.get(id.0)
    }

    pub fn pipeline(&self, id: PipelineId) -> Option<&PipelineDefinition> {
        self.pipelines.get(id.0)
    }

    pub fn block_type(&self, id: BlockTypeId) -> Option<&CompositeBlockTypeDefinition> {
        self.block_types.get(id.0)
    }

    pub fn value_type(&self, id: ValueTypeId) -> Option<&ValueTypeDefinition> {
        self.value_types.get(id.0)
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&ConstraintDefinition> {
        self.constraints.get(id.0)
    }

    pub fn transform(&self, id: TransformId) -> Option<&TransformDefinition> {
        self.transforms.get(id.0)
    }

    pub fn pipeline_ids(&self) -> impl Iterator<Item = PipelineId> {
        (0..self.pipelines.len()).map(PipelineId)
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        (0..self.blocks.len()).map(BlockId)
    }

    pub fn pipe_ids(&self) -> impl Iterator<Item = PipeId> {
        (0..self.pipes.len()).map(PipeId)
    }

    pub fn block_type_ids(&self) -> impl Iterator<Item = BlockTypeId> {
        (0..self.block_types.len()).map(BlockTypeId)
    }

    pub fn value_type_ids(&self) -> impl Iterator<Item = ValueTypeId> {
        (0..self.value_types.len()).map(ValueTypeId)
    }

    pub fn constraint_ids(&self) -> impl Iterator<Item = ConstraintId> {
        (0..self.constraints.len()).map(ConstraintId)
    }

    pub fn transform_ids(&self) -> impl Iterator<Item = TransformId> {
        (0..self.transforms.len()).map(TransformId)
    }

    /// The pipeline or composite block type whose body lists `block`
    pub fn container_of(&self, block: BlockId) -> Option<Container> {
        if let Some(index) = self.pipelines.iter().position(|p| p.blocks.contains(&block)) {
            return Some(Container::Pipeline(PipelineId(index)));
        }
        self.block_types
            .iter()
            .position(|t| t.blocks.contains(&block))
            .map(|index| Container::Composite(BlockTypeId(index)))
    }
}

/// A node that owns a block/pipe body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Pipeline(PipelineId),
    Composite(BlockTypeId),
}

/* ===================== Pipelines, Blocks, Pipes ===================== */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub name_span: Span,
    #[serde(default)]
    pub blocks: Vec<BlockId>,
    #[serde(default)]
    pub pipes: Vec<PipeId>,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub name_span: Span,
    pub block_type: Reference<TypeTarget>,
    #[serde(default)]
    pub body: PropertyBody,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

/// A pipe statement.
///
/// `Single` is the `pipe { from: A; to: B; }` form, `Chain` the arrow form
/// `A -> B -> C`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum PipeDefinition {
    Single {
        from: Reference<BlockId>,
        to: Reference<BlockId>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Chain {
        blocks: Vec<Reference<BlockId>>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
}

impl PipeDefinition {
    pub fn span(&self) -> Span {
        match self {
            PipeDefinition::Single { span, .. } => *span,
            PipeDefinition::Chain { span, .. } => *span,
        }
    }

    /// All endpoint references in source order
    pub fn endpoints(&self) -> Vec<&Reference<BlockId>> {
        match self {
            PipeDefinition::Single { from, to, .. } => vec![from, to],
            PipeDefinition::Chain { blocks, .. } => blocks.iter().collect(),
        }
    }

    pub(crate) fn endpoints_mut(&mut self) -> Vec<&mut Reference<BlockId>> {
        match self {
            PipeDefinition::Single { from, to, .. } => vec![from, to],
            PipeDefinition::Chain { blocks, .. } => blocks.iter_mut().collect(),
        }
    }
}

/* ===================== Properties ===================== */

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyBody {
    #[serde(default)]
    pub properties: Vec<PropertyAssignment>,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

impl PropertyBody {
    pub fn property(&self, name: &str) -> Option<&PropertyAssignment> {
        self.properties.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAssignment {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub name_span: Span,
    pub value: PropertyValue,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

/// Right-hand side of a property assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum PropertyValue {
    Expression {
        expression: Expression,
    },
    /// `requires NAME`: supplied by the runner at execution time
    RuntimeParameter {
        name: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
}

impl From<Expression> for PropertyValue {
    fn from(expression: Expression) -> Self {
        PropertyValue::Expression { expression }
    }
}

impl PropertyValue {
    pub fn span(&self) -> Span {
        match self {
            PropertyValue::Expression { expression } => expression.span(),
            PropertyValue::RuntimeParameter { span, .. } => *span,
        }
    }
}

/* ===================== Composite Block Types ===================== */

/// A user-defined block type built from other blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeBlockTypeDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub name_span: Span,
    #[serde(default)]
    pub input: Option<IoPortDeclaration>,
    #[serde(default)]
    pub output: Option<IoPortDeclaration>,
    #[serde(default)]
    pub properties: Vec<PropertyDeclaration>,
    #[serde(default)]
    pub blocks: Vec<BlockId>,
    #[serde(default)]
    pub pipes: Vec<PipeId>,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

/// `input NAME oftype IOTYPE;` / `output NAME oftype IOTYPE;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IoPortDeclaration {
    pub name: String,
    pub io_type: String,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub io_type_span: Span,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

/// `property NAME oftype TYPE: DEFAULT;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub name_span: Span,
    pub value_type: ValueTypeReference,
    #[serde(default)]
    pub default: Option<Expression>,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

/* ===================== Value Types ===================== */

/// `valuetype NAME<T, ...> oftype SUPER { constraints: [...]; }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueTypeDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub name_span: Span,
    #[serde(default)]
    pub generic_parameters: Vec<GenericParameter>,
    #[serde(default)]
    pub supertype: Option<ValueTypeReference>,
    /// Expected to evaluate to a `Collection<Constraint>`
    #[serde(default)]
    pub constraints: Option<Expression>,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

/// A use site of a value type, e.g. `Collection<Integer>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueTypeReference {
    pub reference: Reference<ValueTypeTarget>,
    #[serde(default)]
    pub generic_arguments: Vec<ValueTypeReference>,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

impl ValueTypeReference {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            reference: Reference::new(name, Span::default()),
            generic_arguments: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn generic(name: impl Into<String>, arguments: Vec<ValueTypeReference>) -> Self {
        Self {
            generic_arguments: arguments,
            ..Self::named(name)
        }
    }
}

/* ===================== Constraints ===================== */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum ConstraintDefinition {
    /// `constraint NAME oftype LengthConstraint { ... }`
    Typed {
        name: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        name_span: Span,
        constraint_type: Reference<TypeTarget>,
        #[serde(default)]
        body: PropertyBody,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    /// `constraint NAME on TYPE: EXPRESSION;`
    Expression {
        name: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        name_span: Span,
        on: ValueTypeReference,
        expression: Expression,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
}

impl ConstraintDefinition {
    pub fn name(&self) -> &str {
        match self {
            ConstraintDefinition::Typed { name, .. } => name,
            ConstraintDefinition::Expression { name, .. } => name,
        }
    }

    pub fn name_span(&self) -> Span {
        match self {
            ConstraintDefinition::Typed { name_span, .. } => *name_span,
            ConstraintDefinition::Expression { name_span, .. } => *name_span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ConstraintDefinition::Typed { span, .. } => *span,
            ConstraintDefinition::Expression { span, .. } => *span,
        }
    }
}

/* ===================== Transforms ===================== */

/// `transform NAME { from a oftype T; to b oftype U; b: EXPRESSION; }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub name_span: Span,
    #[serde(default)]
    pub ports: Vec<TransformPort>,
    #[serde(default)]
    pub output_assignments: Vec<TransformOutputAssignment>,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

impl TransformDefinition {
    pub fn input_ports(&self) -> impl Iterator<Item = (usize, &TransformPort)> {
        self.ports
            .iter()
            .enumerate()
            .filter(|(_, p)| p.kind == PortKind::From)
    }

    pub fn output_ports(&self) -> impl Iterator<Item = (usize, &TransformPort)> {
        self.ports
            .iter()
            .enumerate()
            .filter(|(_, p)| p.kind == PortKind::To)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    From,
    To,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformPort {
    pub kind: PortKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub name_span: Span,
    pub value_type: ValueTypeReference,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

/// `PORT: EXPRESSION;` inside a transform; `port` targets an index into `ports`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformOutputAssignment {
    pub port: Reference<usize>,
    pub expression: Expression,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}
