//! Semantic Validation for Conduit Models
//!
//! This module provides an extensible rule-based validation system that runs
//! after linking to catch everything the grammar can't enforce: type errors,
//! invalid constants, broken pipeline topology and incompatible pipes.
//!
//! # Usage
//!
//! ```ignore
//! use conduit_core::ast::link::link_model;
//! use conduit_core::validation::{validate_model, ValidationContext, ValidationOptions};
//!
//! let mut diagnostics = link_model(&mut model, &registry);
//! let options = ValidationOptions::default();
//! let context = ValidationContext::new(&model, &registry, &operators, &parameters, &options);
//! diagnostics.extend(validate_model(&context));
//! ```
//!
//! # Architecture
//!
//! 1. **ValidationRule trait** - Each rule implements this trait
//! 2. **Validator** - Collects and runs all rules
//! 3. **Diagnostic** - The output of validation (errors, warnings, infos, hints)
//!
//! Rules are independent of each other. Inside a rule, checks on one node
//! run in order and a check is skipped only when an earlier one made its
//! precondition void (a property with an unknown name is not type checked).
//! References the linker could not resolve are skipped silently; the linker
//! already reported them.
//!
//! # Adding a New Rule
//!
//! 1. Create a new file in `validation/rules/`
//! 2. Implement `ValidationRule` for your struct
//! 3. Add it to the `Validator::new()` constructor

pub mod rules;

use std::borrow::Cow;

use tracing::debug;

use crate::ast::{BlockId, Model};
use crate::diagnostics::{Diagnostic, Severity};
use crate::expr::{EvaluationContext, OperatorRegistry, RuntimeParameterProvider, TypingContext};
use crate::meta::{BlockTypeInfo, MetaInformationRegistry};
use crate::types::ValueTypeProvider;

// ============================================================================
// Validation Context
// ============================================================================

/// Switches for the optional diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Report expressions that fold to a constant
    pub simplification_hints: bool,
    /// Warn about blocks with an unconnected input or output
    pub unused_block_warnings: bool,
    /// Drop diagnostics less severe than this
    pub minimum_severity: Severity,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            simplification_hints: true,
            unused_block_warnings: true,
            minimum_severity: Severity::Hint,
        }
    }
}

/// Everything a rule may consult. Cheap to copy.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub model: &'a Model,
    pub registry: &'a MetaInformationRegistry,
    pub operators: &'a OperatorRegistry,
    /// Known runtime parameter values; usually empty while validating
    pub runtime_parameters: &'a RuntimeParameterProvider,
    pub options: &'a ValidationOptions,
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        model: &'a Model,
        registry: &'a MetaInformationRegistry,
        operators: &'a OperatorRegistry,
        runtime_parameters: &'a RuntimeParameterProvider,
        options: &'a ValidationOptions,
    ) -> Self {
        Self {
            model,
            registry,
            operators,
            runtime_parameters,
            options,
        }
    }

    pub fn value_types(&self) -> ValueTypeProvider<'a> {
        ValueTypeProvider::new(self.model)
    }

    /// A fresh evaluation context without variable bindings
    pub fn evaluation_context(&self) -> EvaluationContext<'a> {
        EvaluationContext::new(self.runtime_parameters, self.operators, self.value_types())
    }

    pub fn typing_context(&self) -> TypingContext<'a> {
        TypingContext::new(self.value_types(), self.operators)
    }

    /// Meta information of a block's type, if it can be determined
    pub fn block_type_of(&self, block: BlockId) -> Option<Cow<'a, BlockTypeInfo>> {
        let definition = self.model.block(block)?;
        self.registry
            .block_type_of(self.model, &definition.block_type, self.operators)
    }
}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// Trait that all validation rules must implement.
///
/// Each rule is responsible for checking one specific aspect of the model.
/// Rules should be:
/// - **Independent** - Don't depend on other rules' results
/// - **Tolerant** - Skip nodes with unresolved references
/// - **Clear** - Produce helpful, actionable messages
pub trait ValidationRule: Send + Sync {
    /// Unique identifier for this rule (e.g., "pipe-compatibility")
    fn id(&self) -> &'static str;

    /// Human-readable description of what this rule checks
    fn description(&self) -> &'static str;

    /// Run the validation and return any diagnostics found.
    ///
    /// An empty vector means no issues found.
    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Diagnostic>;
}

// ============================================================================
// Validator - Runs All Rules
// ============================================================================

/// The main validator that orchestrates all validation rules.
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Create a new validator with all built-in rules.
    pub fn new() -> Self {
        Self {
            rules: vec![
                // Definitions
                Box::new(rules::UniqueNamesRule),
                Box::new(rules::ValueTypeDefinitionRule),
                Box::new(rules::ValueTypeReferenceRule),
                Box::new(rules::ConstraintDefinitionRule),
                Box::new(rules::TransformDefinitionRule),
                Box::new(rules::CompositeBlockTypeRule),
                // Pipelines
                Box::new(rules::PipelineStructureRule),
                Box::new(rules::PipeCompatibilityRule),
                Box::new(rules::BlockPropertiesRule),
                Box::new(rules::UnusedBlockRule),
                // Expressions
                Box::new(rules::ExpressionRule),
            ],
        }
    }

    /// Run all validation rules and collect their diagnostics.
    ///
    /// Diagnostics below the configured minimum severity are dropped.
    pub fn validate(&self, context: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let minimum = context.options.minimum_severity;
        let diagnostics: Vec<Diagnostic> = self
            .rules
            .iter()
            .flat_map(|rule| rule.validate(context))
            .filter(|diagnostic| diagnostic.severity <= minimum)
            .collect();
        debug!(
            rules = self.rules.len(),
            diagnostics = diagnostics.len(),
            errors = diagnostics.iter().filter(|d| d.is_error()).count(),
            "model validated"
        );
        diagnostics
    }

    /// Get a list of all registered rules (useful for documentation)
    pub fn rules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.rules.iter().map(|r| (r.id(), r.description()))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Validate a linked model and return all diagnostics found.
///
/// This is the main entry point for semantic validation. It runs all
/// registered validation rules against the model.
pub fn validate_model(context: &ValidationContext<'_>) -> Vec<Diagnostic> {
    let validator = Validator::new();
    validator.validate(context)
}

/// Check if any diagnostic is an error (not just a warning or hint).
///
/// This is useful for deciding whether to proceed with execution.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.is_error())
}
