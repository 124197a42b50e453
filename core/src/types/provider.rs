//! Model-aware value type queries.
//!
//! User-defined value types only know their definition's id, so everything
//! that has to walk an `oftype` chain goes through a [`ValueTypeProvider`]
//! borrowing the model.

use std::collections::HashSet;

use crate::ast::{Model, ValueTypeId, ValueTypeReference, ValueTypeTarget};
use crate::expr::InternalValue;

use super::{AtomicTypeRef, PrimitiveValueType, ValueType};

/// Bound generic arguments of one user-defined value type
#[derive(Debug, Clone, Copy)]
struct GenericBindings<'b> {
    owner: Option<ValueTypeId>,
    arguments: &'b [ValueType],
}

const NO_BINDINGS: GenericBindings<'static> = GenericBindings {
    owner: None,
    arguments: &[],
};

/// Resolves value type references and answers algebra questions over a model.
#[derive(Debug, Clone, Copy)]
pub struct ValueTypeProvider<'m> {
    model: &'m Model,
}

impl<'m> ValueTypeProvider<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    /// Resolve a value type use site.
    ///
    /// Returns `None` for unlinked references and for malformed generic
    /// argument lists; both are reported elsewhere.
    pub fn resolve(&self, reference: &ValueTypeReference) -> Option<ValueType> {
        self.resolve_with(reference, NO_BINDINGS)
    }

    fn resolve_with(
        &self,
        reference: &ValueTypeReference,
        bindings: GenericBindings<'_>,
    ) -> Option<ValueType> {
        match reference.reference.get()? {
            ValueTypeTarget::Primitive(primitive) => {
                if !reference.generic_arguments.is_empty() {
                    return None;
                }
                Some(ValueType::Primitive(primitive))
            }
            ValueTypeTarget::Collection => {
                let [element] = reference.generic_arguments.as_slice() else {
                    return None;
                };
                let element = self.resolve_with(element, bindings)?;
                Some(ValueType::collection(element))
            }
            ValueTypeTarget::Defined(id) => {
                let definition = self.model.value_type(id)?;
                if definition.generic_parameters.len() != reference.generic_arguments.len() {
                    return None;
                }
                let generic_arguments = reference
                    .generic_arguments
                    .iter()
                    .map(|argument| self.resolve_with(argument, bindings))
                    .collect::<Option<Vec<_>>>()?;
                Some(ValueType::Atomic(AtomicTypeRef {
                    id,
                    name: definition.name.clone(),
                    generic_arguments,
                }))
            }
            ValueTypeTarget::GenericParameter { owner, index } => {
                if bindings.owner == Some(owner) {
                    if let Some(bound) = bindings.arguments.get(index) {
                        return Some(bound.clone());
                    }
                }
                let parameter = self.model.value_type(owner)?.generic_parameters.get(index)?;
                Some(ValueType::Generic {
                    name: parameter.name.clone(),
                })
            }
        }
    }

    /// The direct supertype of a user-defined value type.
    ///
    /// Generic arguments bound on `value_type` are substituted into the
    /// supertype.
    pub fn supertype(&self, value_type: &ValueType) -> Option<ValueType> {
        let ValueType::Atomic(atomic) = value_type else {
            return None;
        };
        let definition = self.model.value_type(atomic.id)?;
        let supertype = definition.supertype.as_ref()?;
        self.resolve_with(
            supertype,
            GenericBindings {
                owner: Some(atomic.id),
                arguments: &atomic.generic_arguments,
            },
        )
    }

    /// Walk the `oftype` chain starting at `id`.
    ///
    /// Revisiting a definition before reaching a non-user-defined terminal
    /// means the chain is cyclic. The walk never loops.
    pub fn has_supertype_cycle(&self, id: ValueTypeId) -> bool {
        let mut visited = HashSet::new();
        let mut current = id;
        loop {
            if !visited.insert(current) {
                return true;
            }
            let Some(definition) = self.model.value_type(current) else {
                return false;
            };
            let Some(supertype) = &definition.supertype else {
                return false;
            };
            match supertype.reference.get() {
                Some(ValueTypeTarget::Defined(next)) => current = next,
                _ => return false,
            }
        }
    }

    /// First type along the `oftype` chain that is not user-defined.
    ///
    /// `None` when the chain is broken or cyclic.
    pub fn terminal_type(&self, value_type: &ValueType) -> Option<ValueType> {
        let mut visited = HashSet::new();
        let mut current = value_type.clone();
        loop {
            let id = match current {
                ValueType::Atomic(ref atomic) => atomic.id,
                other => return Some(other),
            };
            if !visited.insert(id) {
                return None;
            }
            current = self.supertype(&current)?;
        }
    }

    /// The convertibility relation.
    ///
    /// True iff `target` is `from` itself or one of its transitive
    /// supertypes, or a built-in widening applies: `Integer` to `Decimal`,
    /// `[]` to any collection, and collections covariantly in their
    /// element type.
    pub fn is_convertible(&self, from: &ValueType, target: &ValueType) -> bool {
        let mut visited = HashSet::new();
        let mut current = from.clone();
        loop {
            if current == *target {
                return true;
            }
            let id = match (&current, target) {
                (
                    ValueType::Primitive(PrimitiveValueType::Integer),
                    ValueType::Primitive(PrimitiveValueType::Decimal),
                ) => return true,
                (ValueType::EmptyCollection, ValueType::Collection(_)) => return true,
                (ValueType::Collection(element), ValueType::Collection(target_element)) => {
                    return self.is_convertible(element, target_element);
                }
                (ValueType::Atomic(atomic), _) => atomic.id,
                _ => return false,
            };
            if !visited.insert(id) {
                return false;
            }
            match self.supertype(&current) {
                Some(supertype) => current = supertype,
                None => return false,
            }
        }
    }

    /// Runtime parameters are allowed for the textual primitives and for
    /// user-defined types built on them.
    pub fn is_allowed_as_runtime_parameter(&self, value_type: &ValueType) -> bool {
        match self.terminal_type(value_type) {
            Some(ValueType::Primitive(primitive)) => primitive.is_allowed_as_runtime_parameter(),
            _ => false,
        }
    }

    /// Whether `value` belongs to the value domain of `value_type`
    pub fn is_internal_value_representation(
        &self,
        value_type: &ValueType,
        value: &InternalValue,
    ) -> bool {
        match value_type {
            ValueType::Primitive(primitive) => match primitive {
                PrimitiveValueType::Boolean => matches!(value, InternalValue::Boolean(_)),
                PrimitiveValueType::Decimal => {
                    matches!(value, InternalValue::Decimal(_) | InternalValue::Integer(_))
                }
                PrimitiveValueType::Integer => matches!(value, InternalValue::Integer(_)),
                PrimitiveValueType::Text => matches!(value, InternalValue::Text(_)),
                PrimitiveValueType::Regex => matches!(value, InternalValue::Regex(_)),
                PrimitiveValueType::CellRange => matches!(value, InternalValue::CellRange(_)),
                PrimitiveValueType::Constraint => matches!(value, InternalValue::ConstraintRef(_)),
                PrimitiveValueType::ValuetypeAssignment => {
                    matches!(value, InternalValue::ValuetypeAssignment { .. })
                }
                PrimitiveValueType::Transform => matches!(value, InternalValue::TransformRef(_)),
            },
            ValueType::Collection(element) => match value {
                InternalValue::Collection(items) => items
                    .iter()
                    .all(|item| self.is_internal_value_representation(element, item)),
                _ => false,
            },
            ValueType::EmptyCollection => {
                matches!(value, InternalValue::Collection(items) if items.is_empty())
            }
            ValueType::Generic { .. } => true,
            ValueType::Atomic(_) => match self.terminal_type(value_type) {
                Some(terminal) => self.is_internal_value_representation(&terminal, value),
                None => false,
            },
        }
    }
}
