//! Diagnostics produced by linking and validation.
//!
//! This type is independent of any specific output format (LSP, CLI, etc.)
//! so it can be used by both the runtime and tooling. The location triple
//! (`node`, `property`, `index`) is carried through untouched for editor
//! tooling; the checks themselves only care about `span`.

use serde::Serialize;

use crate::ast::{
    BlockId, BlockTypeId, ConstraintId, PipeId, PipelineId, Span, TransformId, ValueTypeId,
};

/// Severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be fixed - the program is incorrect
    Error,
    /// Should probably be fixed - meaning survives but is suspicious
    Warning,
    /// Informational, e.g. a simplifiable expression
    Info,
    /// Suggestion for improvement
    Hint,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            "hint" => Ok(Severity::Hint),
            other => Err(format!(
                "invalid severity \"{}\", expected one of: error, warning, info, hint",
                other
            )),
        }
    }
}

/// The AST node a diagnostic is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NodeRef {
    Model,
    Pipeline(PipelineId),
    Block(BlockId),
    Pipe(PipeId),
    BlockType(BlockTypeId),
    ValueType(ValueTypeId),
    Constraint(ConstraintId),
    Transform(TransformId),
}

/// Where a diagnostic points: node, precise span, optional property and index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticLocation {
    pub node: NodeRef,
    pub span: Span,
    pub property: Option<String>,
    pub index: Option<usize>,
}

impl DiagnosticLocation {
    pub fn new(node: NodeRef, span: Span) -> Self {
        Self {
            node,
            span,
            property: None,
            index: None,
        }
    }

    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Same node and property, different span
    pub fn with_span(&self, span: Span) -> Self {
        Self {
            span,
            ..self.clone()
        }
    }
}

/// A diagnostic message produced by semantic analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// The source location of the issue
    pub span: Span,
    /// The node the issue is attached to
    pub node: NodeRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Which rule produced this diagnostic
    pub rule_id: &'static str,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        location: DiagnosticLocation,
        rule_id: &'static str,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            span: location.span,
            node: location.node,
            property: location.property,
            index: location.index,
            rule_id,
        }
    }

    /// Check if this is an error (not a warning, info or hint)
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at line {}, col {}: {} [{}]",
            self.severity,
            self.span.start_line + 1,
            self.span.start_col + 1,
            self.message,
            self.rule_id
        )
    }
}

/// Collects the diagnostics of one rule.
///
/// `accept` is the single entry point every check reports through.
#[derive(Debug)]
pub struct ValidationAcceptor {
    rule_id: &'static str,
    diagnostics: Vec<Diagnostic>,
}

impl ValidationAcceptor {
    pub fn new(rule_id: &'static str) -> Self {
        Self {
            rule_id,
            diagnostics: Vec::new(),
        }
    }

    pub fn rule_id(&self) -> &'static str {
        self.rule_id
    }

    pub fn accept(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        location: DiagnosticLocation,
    ) {
        self.diagnostics
            .push(Diagnostic::new(severity, message, location, self.rule_id));
    }

    pub fn error(&mut self, message: impl Into<String>, location: DiagnosticLocation) {
        self.accept(Severity::Error, message, location);
    }

    pub fn warning(&mut self, message: impl Into<String>, location: DiagnosticLocation) {
        self.accept(Severity::Warning, message, location);
    }

    pub fn info(&mut self, message: impl Into<String>, location: DiagnosticLocation) {
        self.accept(Severity::Info, message, location);
    }

    pub fn hint(&mut self, message: impl Into<String>, location: DiagnosticLocation) {
        self.accept(Severity::Hint, message, location);
    }

    /// Number of errors reported so far
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
