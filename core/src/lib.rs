//! Semantic core of the Conduit data-pipeline language.
//!
//! A parsed document arrives as an [`ast::Model`]. [`ast::link::link_model`]
//! resolves its references against the [`meta::MetaInformationRegistry`],
//! then [`validation::Validator`] runs the semantic rules and reports
//! [`diagnostics::Diagnostic`]s. The value type algebra lives in [`types`],
//! expression typing and evaluation in [`expr`], spreadsheet coordinates in
//! [`cells`] and pipeline topology in [`graph`].

pub mod ast;
pub mod cells;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod expr;
pub mod graph;
pub mod meta;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_helpers;

pub use diagnostics::{Diagnostic, Severity};
pub use validation::{validate_model, ValidationContext, ValidationOptions};
