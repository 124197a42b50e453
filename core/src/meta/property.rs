//! Property specifications and property value access.

use crate::ast::{Expression, Model, PropertyAssignment, PropertyBody};
use crate::diagnostics::{DiagnosticLocation, NodeRef, ValidationAcceptor};
use crate::error::EvaluationError;
use crate::expr::{
    evaluate_expression, evaluate_property_value, EvaluationContext, EvaluationResult,
    EvaluationStrategy, InternalValue,
};
use crate::types::ValueType;

use super::MetaInformation;

/// Checks a single property's value; reports through the acceptor
pub type PropertyValidator = fn(&InternalValue, DiagnosticLocation, &mut ValidationAcceptor);

/// Checks relations between the properties of one body
pub type BodyValidator = fn(&PropertyValues<'_>, &mut ValidationAcceptor);

/// Decides whether a property must be assigned
pub type RequiredPropertyStrategy = fn(&PropertySpecification) -> bool;

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyDefault {
    /// A default that folded to a constant
    Value(InternalValue),
    /// A default expression that could not be folded ahead of time
    Expression(Expression),
    /// A default expression whose folding failed; reported by validation
    Invalid(EvaluationError),
}

#[derive(Debug, Clone)]
pub struct PropertySpecification {
    pub value_type: ValueType,
    pub default: Option<PropertyDefault>,
    pub validator: Option<PropertyValidator>,
    pub docs: Option<String>,
}

impl PropertySpecification {
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            default: None,
            validator: None,
            docs: None,
        }
    }

    pub fn with_default(mut self, value: InternalValue) -> Self {
        self.default = Some(PropertyDefault::Value(value));
        self
    }

    pub fn with_validator(mut self, validator: PropertyValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }

    pub fn default_value(&self) -> Option<&InternalValue> {
        match &self.default {
            Some(PropertyDefault::Value(value)) => Some(value),
            _ => None,
        }
    }

    pub fn has_expression_default(&self) -> bool {
        matches!(self.default, Some(PropertyDefault::Expression(_)))
    }
}

/// Built-in types: required unless a constant default exists.
pub fn strict_required(specification: &PropertySpecification) -> bool {
    specification.default_value().is_none()
}

/// Composite block types: any default excuses the property, including
/// default expressions that could not be folded.
///
/// Whether such an expression really evaluates at runtime is assumed, not
/// checked; `block-properties` reports a hint whenever this applies.
pub fn lenient_required(specification: &PropertySpecification) -> bool {
    specification.default.is_none()
}

/// The assigned (or defaulted) property values of one block or constraint
/// body, as seen by body validators and constraint executors.
#[derive(Clone, Copy)]
pub struct PropertyValues<'a> {
    info: &'a dyn MetaInformation,
    body: &'a PropertyBody,
    node: NodeRef,
    context: &'a EvaluationContext<'a>,
    strategy: EvaluationStrategy,
}

impl<'a> PropertyValues<'a> {
    pub fn new(
        info: &'a dyn MetaInformation,
        body: &'a PropertyBody,
        node: NodeRef,
        context: &'a EvaluationContext<'a>,
        strategy: EvaluationStrategy,
    ) -> Self {
        Self {
            info,
            body,
            node,
            context,
            strategy,
        }
    }

    pub fn info(&self) -> &'a dyn MetaInformation {
        self.info
    }

    pub fn node(&self) -> NodeRef {
        self.node
    }

    pub fn context(&self) -> &'a EvaluationContext<'a> {
        self.context
    }

    pub fn model(&self) -> &'a Model {
        self.context.model()
    }

    pub fn assignment(&self, name: &str) -> Option<&'a PropertyAssignment> {
        self.body.property(name)
    }

    /// Where to report about `name`: its assignment, or the whole body
    pub fn location(&self, name: &str) -> DiagnosticLocation {
        let span = self
            .assignment(name)
            .map(|assignment| assignment.value.span())
            .unwrap_or(self.body.span);
        DiagnosticLocation::new(self.node, span).property(name)
    }

    /// The value of `name`: assigned, else its default.
    ///
    /// `Ok(None)` when unknown under the lazy strategy or when neither an
    /// assignment nor a default exists.
    pub fn evaluate(&self, name: &str) -> EvaluationResult {
        let specification = self.info.property(name);
        if let Some(assignment) = self.assignment(name) {
            let expected = specification
                .map(|spec| spec.value_type.clone())
                .unwrap_or(ValueType::TEXT);
            return evaluate_property_value(
                &assignment.value,
                &expected,
                self.context,
                self.strategy,
            );
        }
        match specification.and_then(|spec| spec.default.as_ref()) {
            Some(PropertyDefault::Value(value)) => Ok(Some(value.clone())),
            Some(PropertyDefault::Expression(expression)) => {
                evaluate_expression(expression, self.context, self.strategy)
            }
            Some(PropertyDefault::Invalid(err)) => Err(err.clone()),
            None => Ok(None),
        }
    }

    /// [`evaluate`](Self::evaluate) with failures folded into `None`
    pub fn value(&self, name: &str) -> Option<InternalValue> {
        self.evaluate(name).ok().flatten()
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.value(name)?.as_integer()
    }

    pub fn decimal(&self, name: &str) -> Option<f64> {
        self.value(name)?.as_decimal()
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.value(name)?.as_bool()
    }

    pub fn text(&self, name: &str) -> Option<String> {
        match self.value(name)? {
            InternalValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn collection(&self, name: &str) -> Option<Vec<InternalValue>> {
        match self.value(name)? {
            InternalValue::Collection(items) => Some(items),
            _ => None,
        }
    }
}
