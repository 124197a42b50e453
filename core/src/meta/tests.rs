//! Tests for block and constraint type meta information

use super::*;
use crate::ast::{BinaryOperator, BlockTypeId, ConstraintId, Model, PropertyBody};
use crate::diagnostics::NodeRef;
use crate::error::EvaluationError;
use crate::expr::{
    EvaluationContext, EvaluationStrategy, InternalValue, OperatorRegistry,
    RuntimeParameterProvider,
};
use crate::test_helpers::*;
use crate::types::{ValueType, ValueTypeProvider};

fn execute(model: &Model, id: ConstraintId, value: InternalValue) -> Result<bool, EvaluationError> {
    let registry = MetaInformationRegistry::with_builtins();
    let operators = OperatorRegistry::standard();
    let parameters = RuntimeParameterProvider::new();
    let context = EvaluationContext::new(&parameters, &operators, ValueTypeProvider::new(model));
    execute_constraint(id, &value, &context, &registry)
}

// ============================================================================
// Required Property Tests
// ============================================================================

#[test]
fn test_required_strategies() {
    let plain = PropertySpecification::new(ValueType::TEXT);
    let constant = PropertySpecification::new(ValueType::INTEGER)
        .with_default(InternalValue::Integer(1));
    let mut expression = PropertySpecification::new(ValueType::DECIMAL);
    expression.default = Some(PropertyDefault::Expression(int(1)));

    assert!(strict_required(&plain));
    assert!(lenient_required(&plain));
    assert!(!strict_required(&constant));
    assert!(!lenient_required(&constant));
    // only composites excuse an unfolded default expression
    assert!(strict_required(&expression));
    assert!(!lenient_required(&expression));
}

// ============================================================================
// Composite Block Type Tests
// ============================================================================

#[test]
fn test_composite_folds_defaults_where_possible() {
    let mut builder = ModelBuilder::new();
    let id = builder.composite(
        "Fetch",
        None,
        Some("File"),
        vec![
            declare("url", vt("Text"), None),
            declare(
                "retries",
                vt("Integer"),
                Some(binary(BinaryOperator::Add, int(1), int(1))),
            ),
            declare(
                "timeout",
                vt("Decimal"),
                Some(binary(BinaryOperator::Divide, int(1), int(0))),
            ),
            declare("speed", vt("Decimal"), Some(value_keyword())),
        ],
    );
    let model = builder.linked();
    let operators = OperatorRegistry::standard();

    assert!(BlockTypeInfo::can_be_wrapped(&model, id));
    let info = BlockTypeInfo::from_composite(&model, id, &operators).unwrap();
    assert!(info.is_composite());
    assert_eq!(info.kind, BlockTypeKind::Composite(id));
    assert_eq!(info.input, IoType::None);
    assert_eq!(info.output, IoType::File);

    let names: Vec<&str> = info.properties.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["url", "retries", "timeout", "speed"]);
    assert_eq!(
        info.property("retries").unwrap().default_value(),
        Some(&InternalValue::Integer(2))
    );
    assert_eq!(
        info.property("timeout").unwrap().default,
        Some(PropertyDefault::Invalid(EvaluationError::DivisionByZero))
    );
    // only a default that stays unknown is an expression default
    assert_eq!(info.expression_default_names(), vec!["speed"]);
    assert_eq!(info.missing_required_property_names(&[]), vec!["url"]);
    assert!(info.missing_required_property_names(&["url"]).is_empty());
}

#[test]
fn test_composite_with_unknown_io_type_cannot_be_wrapped() {
    let mut builder = ModelBuilder::new();
    let id = builder.composite("Broken", Some("Spreadsheet"), None, vec![]);
    let model = builder.linked();

    assert!(!BlockTypeInfo::can_be_wrapped(&model, id));
    assert!(BlockTypeInfo::from_composite(&model, id, &OperatorRegistry::standard()).is_err());
    assert!(
        BlockTypeInfo::from_composite(&model, BlockTypeId(7), &OperatorRegistry::standard())
            .is_err()
    );
}

#[test]
fn test_pipes_connect_matching_io_types() {
    let registry = MetaInformationRegistry::with_builtins();
    let http = registry.block_type("HttpExtractor").unwrap();
    let text = registry.block_type("TextFileInterpreter").unwrap();
    let csv = registry.block_type("CSVInterpreter").unwrap();
    let sqlite = registry.block_type("SQLiteLoader").unwrap();

    assert!(http.can_be_connected_to(text));
    assert!(text.can_be_connected_to(csv));
    assert!(!http.can_be_connected_to(csv));
    assert!(!http.has_input());
    assert!(!sqlite.has_output());
}

#[test]
fn test_property_values_fall_back_to_defaults() {
    let model = Model::new();
    let registry = MetaInformationRegistry::with_builtins();
    let operators = OperatorRegistry::standard();
    let parameters = RuntimeParameterProvider::new();
    let context = EvaluationContext::new(&parameters, &operators, ValueTypeProvider::new(&model));
    let info = registry.block_type("HttpExtractor").unwrap();
    let body = PropertyBody::default();

    let values = PropertyValues::new(
        info,
        &body,
        NodeRef::Model,
        &context,
        EvaluationStrategy::Lazy,
    );
    assert_eq!(values.integer("retries"), Some(0));
    assert_eq!(values.text("retryBackoffStrategy").as_deref(), Some("exponential"));
    assert_eq!(values.boolean("followRedirects"), Some(true));
    assert_eq!(values.value("url"), None);
}

// ============================================================================
// Constraint Execution Tests
// ============================================================================

#[test]
fn test_typed_constraint_execution() {
    let mut builder = ModelBuilder::new();
    let id = builder.typed_constraint(
        "Colors",
        "AllowlistConstraint",
        vec![("allowlist", collection(vec![text("red"), text("green")]).into())],
    );
    let model = builder.linked();

    assert_eq!(execute(&model, id, InternalValue::Text("red".into())), Ok(true));
    assert_eq!(execute(&model, id, InternalValue::Text("blue".into())), Ok(false));
}

#[test]
fn test_range_constraint_bounds() {
    let mut builder = ModelBuilder::new();
    let id = builder.typed_constraint(
        "Percent",
        "RangeConstraint",
        vec![
            ("lowerBound", int(0).into()),
            ("upperBound", int(100).into()),
            ("upperBoundInclusive", boolean(false).into()),
        ],
    );
    let model = builder.linked();

    assert_eq!(execute(&model, id, InternalValue::Integer(0)), Ok(true));
    assert_eq!(execute(&model, id, InternalValue::Decimal(99.5)), Ok(true));
    assert_eq!(execute(&model, id, InternalValue::Integer(100)), Ok(false));
}

#[test]
fn test_expression_constraint_execution() {
    let mut builder = ModelBuilder::new();
    let id = builder.expression_constraint(
        "Positive",
        vt("Integer"),
        binary(BinaryOperator::Greater, value_keyword(), int(0)),
    );
    let model = builder.linked();

    assert_eq!(execute(&model, id, InternalValue::Integer(5)), Ok(true));
    assert_eq!(execute(&model, id, InternalValue::Integer(-1)), Ok(false));
}

#[test]
fn test_constraint_with_unbound_runtime_parameter_fails() {
    let mut builder = ModelBuilder::new();
    let id = builder.typed_constraint("Pattern", "RegexConstraint", vec![("regex", requires("P"))]);
    let model = builder.linked();

    assert_eq!(
        execute(&model, id, InternalValue::Text("abc".into())),
        Err(EvaluationError::UnresolvedRuntimeParameter("P".to_string()))
    );
}
