//! Expression Evaluator & Type Inference
//!
//! Two independent traversals over the same expression AST:
//!
//! - [`infer_expression_type`] computes the static type, or `None` when a
//!   sub-expression cannot be typed.
//! - [`evaluate_expression`] folds an expression to an [`InternalValue`]
//!   under a [`EvaluationStrategy`].
//!
//! Both dispatch operators through the [`OperatorRegistry`].

mod context;
mod evaluate;
pub mod operators;
mod typing;
mod value;

pub use context::{EvaluationContext, EvaluationStrategy, RuntimeParameterProvider, VariableKey};
pub use evaluate::{
    evaluate_expression, evaluate_property_value, simplified_value, EvaluationResult,
};
pub use operators::{Operator, OperatorRegistry};
pub use typing::{infer_expression_type, TypeIssue, TypingContext};
pub use value::{InternalValue, RegexValue};
