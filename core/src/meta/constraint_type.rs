//! Constraint type meta information and constraint execution.

use indexmap::IndexMap;

use crate::ast::{ConstraintDefinition, ConstraintId};
use crate::diagnostics::NodeRef;
use crate::error::EvaluationError;
use crate::expr::{
    evaluate_expression, EvaluationContext, EvaluationStrategy, InternalValue, VariableKey,
};
use crate::types::ValueType;

use super::{
    BodyValidator, MetaInformation, MetaInformationRegistry, PropertySpecification, PropertyValues,
};

/// Decides whether a value satisfies a typed constraint
pub type ConstraintExecutor = fn(&InternalValue, &PropertyValues<'_>) -> bool;

/// Meta information of one built-in constraint type.
#[derive(Debug, Clone)]
pub struct ConstraintTypeInfo {
    pub name: String,
    /// Values of this type can be checked by the constraint
    pub applicable_type: ValueType,
    pub properties: IndexMap<String, PropertySpecification>,
    pub body_validator: Option<BodyValidator>,
    pub executor: ConstraintExecutor,
    pub docs: Option<String>,
}

impl ConstraintTypeInfo {
    pub fn new(
        name: impl Into<String>,
        applicable_type: ValueType,
        executor: ConstraintExecutor,
    ) -> Self {
        Self {
            name: name.into(),
            applicable_type,
            properties: IndexMap::new(),
            body_validator: None,
            executor,
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
}

impl MetaInformation for ConstraintTypeInfo {
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
}

/// Check `value` against the constraint `id`.
///
/// Property values are evaluated exhaustively, so unbound runtime
/// parameters and broken references are errors here.
pub fn execute_constraint(
    id: ConstraintId,
    value: &InternalValue,
    context: &EvaluationContext<'_>,
    registry: &MetaInformationRegistry,
) -> Result<bool, EvaluationError> {
    let definition = context
        .model()
        .constraint(id)
        .ok_or_else(|| EvaluationError::UnresolvedReference(id.to_string()))?;

    match definition {
        ConstraintDefinition::Typed {
            constraint_type,
            body,
            ..
        } => {
            let info = registry
                .constraint_type_of(constraint_type)
                .ok_or_else(|| EvaluationError::UnresolvedReference(constraint_type.name.clone()))?;
            let values = PropertyValues::new(
                info,
                body,
                NodeRef::Constraint(id),
                context,
                EvaluationStrategy::Exhaustive,
            );
            for name in info.properties.keys() {
                values.evaluate(name)?;
            }
            Ok((info.executor)(value, &values))
        }
        ConstraintDefinition::Expression { expression, .. } => {
            let bound = context
                .clone()
                .with_binding(VariableKey::Value, value.clone());
            match evaluate_expression(expression, &bound, EvaluationStrategy::Exhaustive)? {
                Some(InternalValue::Boolean(satisfied)) => Ok(satisfied),
                Some(other) => Err(EvaluationError::Conversion {
                    text: other.to_string(),
                    target: "Boolean".to_string(),
                }),
                None => Err(EvaluationError::UnresolvedVariable("value".to_string())),
            }
        }
    }
}
