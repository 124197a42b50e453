//! Wrapper over a user-defined value type definition.

use crate::ast::{ConstraintId, Model, ValueTypeDefinition, ValueTypeId};
use crate::error::{EvaluationError, WrapError};
use crate::expr::{evaluate_expression, EvaluationContext, EvaluationStrategy, InternalValue};
use crate::meta::{execute_constraint, MetaInformationRegistry};

use super::{AtomicTypeRef, PrimitiveValueType, ValueType, ValueTypeProvider};

/// A user-defined value type (`valuetype X oftype Y`).
///
/// Borrows its definition; rebuilt whenever needed.
#[derive(Debug, Clone, Copy)]
pub struct AtomicValueType<'m> {
    id: ValueTypeId,
    definition: &'m ValueTypeDefinition,
    provider: ValueTypeProvider<'m>,
}

impl<'m> AtomicValueType<'m> {
    pub fn can_be_wrapped(model: &Model, id: ValueTypeId) -> bool {
        model.value_type(id).is_some()
    }

    pub fn wrap(model: &'m Model, id: ValueTypeId) -> Result<Self, WrapError> {
        let definition = model.value_type(id).ok_or_else(|| WrapError::Incomplete {
            kind: "value type",
            reason: format!("no definition with id {}", id),
        })?;
        Ok(Self {
            id,
            definition,
            provider: ValueTypeProvider::new(model),
        })
    }

    pub fn id(&self) -> ValueTypeId {
        self.id
    }

    pub fn name(&self) -> &'m str {
        &self.definition.name
    }

    pub fn definition(&self) -> &'m ValueTypeDefinition {
        self.definition
    }

    /// The type as seen from inside its own definition: generic parameters
    /// stay unbound.
    pub fn value_type(&self) -> ValueType {
        ValueType::Atomic(AtomicTypeRef {
            id: self.id,
            name: self.definition.name.clone(),
            generic_arguments: self
                .definition
                .generic_parameters
                .iter()
                .map(|p| ValueType::Generic {
                    name: p.name.clone(),
                })
                .collect(),
        })
    }

    pub fn supertype(&self) -> Option<ValueType> {
        self.provider.supertype(&self.value_type())
    }

    pub fn has_supertype_cycle(&self) -> bool {
        self.provider.has_supertype_cycle(self.id)
    }

    /// The primitive at the end of the `oftype` chain, if the chain ends in
    /// one
    pub fn primitive_terminal(&self) -> Option<PrimitiveValueType> {
        self.provider
            .terminal_type(&self.value_type())
            .and_then(|terminal| terminal.as_primitive())
    }

    /// The constraints listed directly on this definition.
    ///
    /// Entries that do not evaluate to a constraint reference are skipped;
    /// validation reports them.
    pub fn constraint_ids(&self, context: &EvaluationContext<'_>) -> Vec<ConstraintId> {
        let Some(expression) = &self.definition.constraints else {
            return Vec::new();
        };
        match evaluate_expression(expression, context, EvaluationStrategy::Lazy) {
            Ok(Some(InternalValue::Collection(items))) => items
                .iter()
                .filter_map(|item| match item {
                    InternalValue::ConstraintRef(id) => Some(*id),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Constraints of this type and of all user-defined supertypes, nearest
    /// first. Stops at a cycle.
    pub fn all_constraint_ids(&self, context: &EvaluationContext<'_>) -> Vec<ConstraintId> {
        let model = self.provider.model();
        let mut visited = vec![self.id];
        let mut constraints = self.constraint_ids(context);
        let mut current = self.supertype();
        while let Some(ValueType::Atomic(atomic)) = current {
            if visited.contains(&atomic.id) {
                break;
            }
            visited.push(atomic.id);
            let Ok(wrapper) = AtomicValueType::wrap(model, atomic.id) else {
                break;
            };
            constraints.extend(wrapper.constraint_ids(context));
            current = self.provider.supertype(&ValueType::Atomic(atomic));
        }
        constraints
    }

    /// Run every constraint of this type and its supertypes against `value`.
    ///
    /// Returns the constraints that are violated, nearest type first.
    pub fn validate_value(
        &self,
        value: &InternalValue,
        context: &EvaluationContext<'_>,
        registry: &MetaInformationRegistry,
    ) -> Result<Vec<ConstraintId>, EvaluationError> {
        let mut violated = Vec::new();
        for id in self.all_constraint_ids(context) {
            if !execute_constraint(id, value, context, registry)? {
                violated.push(id);
            }
        }
        Ok(violated)
    }
}
