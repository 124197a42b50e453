//! Evaluation context: runtime parameters, variable bindings, operators.

use std::collections::HashMap;

use crate::ast::{Model, PortTarget};
use crate::error::ParameterParseError;
use crate::types::{parse_value_to_internal_representation, ValueType, ValueTypeProvider};

use super::operators::OperatorRegistry;
use super::InternalValue;

/// How evaluation treats values that are not known yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvaluationStrategy {
    /// Stop and report "unknown" as soon as an unbound value is needed.
    /// Used while validating, before runtime values exist.
    Lazy,
    /// Every value must be bound; anything missing is an error.
    /// Used when executing.
    Exhaustive,
}

/// Raw runtime parameter values (`requires NAME`), keyed by name.
///
/// Values stay textual until a property asks for them with an expected
/// type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeParameterProvider {
    values: HashMap<String, String>,
}

impl RuntimeParameterProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn set(&mut self, name: impl Into<String>, raw: impl Into<String>) {
        self.values.insert(name.into(), raw.into());
    }

    pub fn raw(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse the parameter `name` as `value_type`; `None` if unbound
    pub fn parse(
        &self,
        name: &str,
        value_type: &ValueType,
        provider: &ValueTypeProvider<'_>,
    ) -> Option<Result<InternalValue, ParameterParseError>> {
        self.raw(name)
            .map(|raw| parse_value_to_internal_representation(raw, value_type, provider))
    }
}

/// A name an expression can read a value from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKey {
    /// The `value` keyword inside an expression constraint
    Value,
    /// An input port of a transform
    Port(PortTarget),
}

/// Everything evaluation may read from.
///
/// Scoped to one validation pass or one execution; never shared across
/// models.
#[derive(Debug, Clone)]
pub struct EvaluationContext<'a> {
    pub runtime_parameters: &'a RuntimeParameterProvider,
    pub operators: &'a OperatorRegistry,
    pub value_types: ValueTypeProvider<'a>,
    variables: HashMap<VariableKey, InternalValue>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        runtime_parameters: &'a RuntimeParameterProvider,
        operators: &'a OperatorRegistry,
        value_types: ValueTypeProvider<'a>,
    ) -> Self {
        Self {
            runtime_parameters,
            operators,
            value_types,
            variables: HashMap::new(),
        }
    }

    pub fn model(&self) -> &'a Model {
        self.value_types.model()
    }

    pub fn bind(&mut self, key: VariableKey, value: InternalValue) {
        self.variables.insert(key, value);
    }

    /// Builder form of [`bind`](Self::bind)
    pub fn with_binding(mut self, key: VariableKey, value: InternalValue) -> Self {
        self.bind(key, value);
        self
    }

    pub fn lookup(&self, key: VariableKey) -> Option<&InternalValue> {
        self.variables.get(&key)
    }

    pub fn clear_bindings(&mut self) {
        self.variables.clear();
    }
}
