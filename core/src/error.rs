//! Error types shared across the semantic core.
//!
//! User-facing problems are reported as [`Diagnostic`](crate::diagnostics::Diagnostic)s;
//! these errors are what the building blocks return to the checks (and to
//! the interpreter) so they can decide how to surface them.

use thiserror::Error;

/// A wrapper could not be built from an incomplete or malformed AST node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WrapError {
    #[error("\"{0}\" is not a valid column id")]
    InvalidColumnId(String),

    #[error("\"{0}\" is not a valid row id")]
    InvalidRowId(String),

    #[error("\"{0}\" is not a valid cell reference")]
    InvalidCellReference(String),

    #[error("the {kind} is incomplete: {reason}")]
    Incomplete { kind: &'static str, reason: String },
}

/// Constant folding or runtime evaluation failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("the runtime parameter \"{0}\" has no value")]
    UnresolvedRuntimeParameter(String),

    #[error("the variable \"{0}\" has no value")]
    UnresolvedVariable(String),

    #[error("the reference \"{0}\" could not be resolved")]
    UnresolvedReference(String),

    #[error("arithmetic error: division by zero")]
    DivisionByZero,

    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    #[error("invalid regular expression /{pattern}/: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("invalid cell range: {0}")]
    InvalidCellRange(#[from] WrapError),

    #[error("\"{text}\" cannot be converted to {target}")]
    Conversion { text: String, target: String },

    #[error("operator \"{operator}\" cannot be applied to {operands}")]
    InvalidOperands { operator: String, operands: String },

    #[error(transparent)]
    ParameterParse(#[from] ParameterParseError),
}

/// A raw runtime parameter could not be parsed into the expected value type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterParseError {
    #[error("\"{value}\" is not a valid {expected}")]
    Malformed { value: String, expected: String },

    #[error("values of type {0} cannot be supplied as runtime parameters")]
    NotAllowed(String),
}

/// Loading a model from its serialized form failed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed model: {0}")]
    Json(#[from] serde_json::Error),
}
