//! Rule: Expression
//!
//! Checks every expression written in the model, wherever it appears:
//! block properties, composite defaults, value type constraints, constraint
//! bodies, expression constraints and transform output assignments.
//!
//! # Checks
//!
//! - the expression can be typed (operand types, collection element types,
//!   `value` outside expression constraints)
//! - regex literals compile
//! - cell range literals are well-formed and not inverted
//! - expressions that always produce the same value are reported as
//!   simplifiable (info, configurable)
//!
//! # Examples
//!
//! ```conduit
//! block Select oftype CellRangeSelector {
//!     select: range C5:A1;     // Error: inverted range
//! }
//! block Fetch oftype HttpExtractor {
//!     retries: 1 + 2;          // Info: can be simplified to 3
//! }
//! ```

use crate::ast::Expression;
use crate::cells::CellRange;
use crate::diagnostics::{Diagnostic, DiagnosticLocation, ValidationAcceptor};
use crate::expr::{infer_expression_type, simplified_value, RegexValue};

use super::super::{ValidationContext, ValidationRule};
use super::{expression_sites, ExpressionSite};

/// Rule that checks typing and literal values of all expressions.
pub struct ExpressionRule;

impl ValidationRule for ExpressionRule {
    fn id(&self) -> &'static str {
        "expression"
    }

    fn description(&self) -> &'static str {
        "Expressions must be well-typed and contain valid literals"
    }

    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let mut acceptor = ValidationAcceptor::new(self.id());
        for site in expression_sites(context.model) {
            check_site(&site, context, &mut acceptor);
        }
        acceptor.into_diagnostics()
    }
}

fn check_site(
    site: &ExpressionSite<'_>,
    context: &ValidationContext<'_>,
    acceptor: &mut ValidationAcceptor,
) {
    let location = |span| {
        let location = DiagnosticLocation::new(site.node, span);
        match site.property {
            Some(property) => location.property(property),
            None => location,
        }
    };

    let mut typing = context.typing_context();
    if let Some(on) = site.value_keyword {
        let Some(on_type) = context.value_types().resolve(on) else {
            return;
        };
        typing = typing.with_value_keyword(on_type);
    }
    let mut issues = Vec::new();
    infer_expression_type(site.expression, &typing, &mut issues);
    for issue in &issues {
        acceptor.error(issue.message.clone(), location(issue.span));
    }

    let errors_before = acceptor.error_count();
    site.expression.walk(&mut |expression| match expression {
        Expression::Regex { pattern, span } => {
            if let Err(err) = RegexValue::new(pattern) {
                acceptor.error(
                    format!("Invalid regular expression /{}/: {}", pattern, err),
                    location(*span),
                );
            }
        }
        Expression::CellRange { range, span } => match CellRange::from_literal(range) {
            Ok(cells) if !cells.is_valid() => acceptor.error(
                format!(
                    "The cell range {} is invalid since its start lies after its end",
                    range
                ),
                location(*span),
            ),
            Ok(_) => {}
            Err(err) => acceptor.error(format!("Invalid cell range: {}", err), location(*span)),
        },
        _ => {}
    });

    if !issues.is_empty() || acceptor.error_count() > errors_before {
        return;
    }
    // `value` and transform inputs are only known at runtime
    if !context.options.simplification_hints || site.value_keyword.is_some() {
        return;
    }
    if let Some(value) = simplified_value(site.expression, context.operators, context.value_types())
    {
        acceptor.info(
            format!("The expression can be simplified to {}", value),
            location(site.expression.span()),
        );
    }
}
