//! Block type meta information.

use indexmap::IndexMap;
use tracing::trace;

use crate::ast::{BlockTypeId, IoPortDeclaration, Model};
use crate::error::WrapError;
use crate::expr::{
    evaluate_expression, EvaluationContext, EvaluationStrategy, OperatorRegistry,
    RuntimeParameterProvider,
};
use crate::types::ValueTypeProvider;

use super::property::{lenient_required, strict_required};
use super::{
    BodyValidator, IoType, MetaInformation, PropertyDefault, PropertySpecification,
    RequiredPropertyStrategy,
};

/// Where a block type comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockTypeKind {
    Builtin,
    Composite(BlockTypeId),
}

/// Meta information of one block type, built-in or composite.
#[derive(Debug, Clone)]
pub struct BlockTypeInfo {
    pub name: String,
    pub kind: BlockTypeKind,
    pub input: IoType,
    pub output: IoType,
    pub properties: IndexMap<String, PropertySpecification>,
    pub body_validator: Option<BodyValidator>,
    pub required: RequiredPropertyStrategy,
    pub docs: Option<String>,
}

impl BlockTypeInfo {
    /// A built-in block type without properties
    pub fn builtin(name: impl Into<String>, input: IoType, output: IoType) -> Self {
        Self {
            name: name.into(),
            kind: BlockTypeKind::Builtin,
            input,
            output,
            properties: IndexMap::new(),
            body_validator: None,
            required: strict_required,
            docs: None,
        }
    }

    pub fn with_property(
        mut self,
        name: impl Into<String>,
        specification: PropertySpecification,
    ) -> Self {
        self.properties.insert(name.into(), specification);
        self
    }

    pub fn with_body_validator(mut self, validator: BodyValidator) -> Self {
        self.body_validator = Some(validator);
        self
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }

    pub fn can_be_wrapped(model: &Model, id: BlockTypeId) -> bool {
        let Some(definition) = model.block_type(id) else {
            return false;
        };
        let provider = ValueTypeProvider::new(model);
        port_type(definition.input.as_ref()).is_ok()
            && port_type(definition.output.as_ref()).is_ok()
            && definition
                .properties
                .iter()
                .all(|p| provider.resolve(&p.value_type).is_some())
    }

    /// Derive the meta information of a composite block type.
    ///
    /// Defaults are folded lazily without bindings. The ones that stay
    /// unknown are kept as expressions, the ones that fail keep their error.
    pub fn from_composite(
        model: &Model,
        id: BlockTypeId,
        operators: &OperatorRegistry,
    ) -> Result<Self, WrapError> {
        let definition = model.block_type(id).ok_or_else(|| WrapError::Incomplete {
            kind: "block type",
            reason: format!("no composite block type with id {}", id),
        })?;
        let provider = ValueTypeProvider::new(model);
        let no_parameters = RuntimeParameterProvider::new();
        let context = EvaluationContext::new(&no_parameters, operators, provider);

        let mut properties = IndexMap::new();
        for declaration in &definition.properties {
            let value_type =
                provider
                    .resolve(&declaration.value_type)
                    .ok_or_else(|| WrapError::Incomplete {
                        kind: "block type",
                        reason: format!(
                            "the type of property \"{}\" is unresolved",
                            declaration.name
                        ),
                    })?;
            let default = declaration.default.as_ref().map(|expression| {
                match evaluate_expression(expression, &context, EvaluationStrategy::Lazy) {
                    Ok(Some(value)) => PropertyDefault::Value(value),
                    Ok(None) => PropertyDefault::Expression(expression.clone()),
                    Err(err) => {
                        trace!(property = %declaration.name, error = %err, "default is invalid");
                        PropertyDefault::Invalid(err)
                    }
                }
            });
            // first declaration wins; duplicates are reported by validation
            properties
                .entry(declaration.name.clone())
                .or_insert(PropertySpecification {
                    value_type,
                    default,
                    validator: None,
                    docs: None,
                });
        }

        Ok(Self {
            name: definition.name.clone(),
            kind: BlockTypeKind::Composite(id),
            input: port_type(definition.input.as_ref())?,
            output: port_type(definition.output.as_ref())?,
            properties,
            body_validator: None,
            required: lenient_required,
            docs: None,
        })
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, BlockTypeKind::Composite(_))
    }

    pub fn has_input(&self) -> bool {
        !self.input.is_none()
    }

    pub fn has_output(&self) -> bool {
        !self.output.is_none()
    }

    /// The single rule for pipe legality
    pub fn can_be_connected_to(&self, next: &BlockTypeInfo) -> bool {
        self.output == next.input
    }

    /// Properties excused from being required only because their default
    /// is an expression that did not fold
    pub fn expression_default_names(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|(_, spec)| spec.has_expression_default())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

fn port_type(port: Option<&IoPortDeclaration>) -> Result<IoType, WrapError> {
    match port {
        None => Ok(IoType::None),
        Some(port) => IoType::from_name(&port.io_type).ok_or_else(|| WrapError::Incomplete {
            kind: "block type",
            reason: format!("\"{}\" is not an IO type", port.io_type),
        }),
    }
}

impl MetaInformation for BlockTypeInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn properties(&self) -> &IndexMap<String, PropertySpecification> {
        &self.properties
    }

    fn body_validator(&self) -> Option<BodyValidator> {
        self.body_validator
    }

    fn docs(&self) -> Option<&str> {
        self.docs.as_deref()
    }

    fn is_required(&self, specification: &PropertySpecification) -> bool {
        (self.required)(specification)
    }
}
