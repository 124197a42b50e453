//! Tests for the value type algebra

use super::*;
use crate::ast::{BinaryOperator, Model, ValueTypeId};
use crate::expr::{EvaluationContext, InternalValue, OperatorRegistry, RuntimeParameterProvider};
use crate::meta::MetaInformationRegistry;
use crate::test_helpers::*;

// ============================================================================
// Helper Functions
// ============================================================================

fn atomic(model: &Model, id: ValueTypeId) -> ValueType {
    AtomicValueType::wrap(model, id)
        .expect("value type should exist")
        .value_type()
}

fn collection(element: ValueType) -> ValueType {
    ValueType::collection(element)
}

// ============================================================================
// Convertibility Tests
// ============================================================================

#[test]
fn test_convertibility_is_reflexive() {
    let model = Model::new();
    let provider = ValueTypeProvider::new(&model);

    for primitive in PrimitiveValueType::ALL {
        let value_type = ValueType::from(primitive);
        assert!(
            provider.is_convertible(&value_type, &value_type),
            "{}",
            value_type
        );
    }
    let texts = collection(ValueType::TEXT);
    assert!(texts.is_convertible_to(&texts, &provider));
}

#[test]
fn test_integer_widens_to_decimal_only() {
    let model = Model::new();
    let provider = ValueTypeProvider::new(&model);

    assert!(provider.is_convertible(&ValueType::INTEGER, &ValueType::DECIMAL));
    assert!(!provider.is_convertible(&ValueType::DECIMAL, &ValueType::INTEGER));
    assert!(!provider.is_convertible(&ValueType::INTEGER, &ValueType::TEXT));
    assert!(!provider.is_convertible(&ValueType::TEXT, &ValueType::REGEX));
}

#[test]
fn test_collections_are_covariant() {
    let model = Model::new();
    let provider = ValueTypeProvider::new(&model);

    let integers = collection(ValueType::INTEGER);
    let decimals = collection(ValueType::DECIMAL);
    assert!(provider.is_convertible(&integers, &decimals));
    assert!(!provider.is_convertible(&decimals, &integers));
    assert!(!provider.is_convertible(&integers, &ValueType::INTEGER));
}

#[test]
fn test_empty_collection_converts_to_any_collection() {
    let model = Model::new();
    let provider = ValueTypeProvider::new(&model);

    assert!(provider.is_convertible(
        &ValueType::EmptyCollection,
        &collection(ValueType::TEXT)
    ));
    assert!(provider.is_convertible(
        &ValueType::EmptyCollection,
        &collection(collection(ValueType::INTEGER))
    ));
    assert!(!provider.is_convertible(
        &collection(ValueType::TEXT),
        &ValueType::EmptyCollection
    ));
    assert!(!provider.is_convertible(&ValueType::EmptyCollection, &ValueType::TEXT));
}

#[test]
fn test_user_defined_types_convert_along_supertypes() {
    let mut builder = ModelBuilder::new();
    let percent = builder.value_type("Percent", &[], Some(vt("Decimal")), None);
    let score = builder.value_type("Score", &[], Some(vt("Percent")), None);
    let model = builder.linked();
    let provider = ValueTypeProvider::new(&model);
    let (percent, score) = (atomic(&model, percent), atomic(&model, score));

    assert!(provider.is_convertible(&score, &percent));
    assert!(provider.is_convertible(&score, &ValueType::DECIMAL));
    assert!(!provider.is_convertible(&percent, &score));
    assert!(!provider.is_convertible(&ValueType::DECIMAL, &percent));
    assert!(!provider.is_convertible(&score, &ValueType::INTEGER));
    assert!(provider.is_convertible(
        &collection(score.clone()),
        &collection(ValueType::DECIMAL)
    ));
}

#[test]
fn test_terminal_and_flags_of_user_defined_types() {
    let mut builder = ModelBuilder::new();
    let code = builder.value_type("Code", &[], Some(vt("Text")), None);
    let pattern = builder.value_type("Pattern", &[], Some(vt("Regex")), None);
    let model = builder.linked();
    let provider = ValueTypeProvider::new(&model);

    let code_wrapper = AtomicValueType::wrap(&model, code).unwrap();
    assert_eq!(code_wrapper.primitive_terminal(), Some(PrimitiveValueType::Text));
    assert_eq!(code_wrapper.name(), "Code");
    assert!(provider.is_allowed_as_runtime_parameter(&code_wrapper.value_type()));
    assert!(!provider.is_allowed_as_runtime_parameter(&atomic(&model, pattern)));
    assert!(code_wrapper.value_type().is_referenceable_by_user());
    assert_eq!(code_wrapper.value_type().kind(), ValueTypeKind::UserDefined);
}

#[test]
fn test_value_domain_of_user_defined_type() {
    let mut builder = ModelBuilder::new();
    let percent = builder.value_type("Percent", &[], Some(vt("Decimal")), None);
    let model = builder.linked();
    let provider = ValueTypeProvider::new(&model);
    let percent = atomic(&model, percent);

    assert!(provider.is_internal_value_representation(&percent, &InternalValue::Decimal(0.5)));
    assert!(provider.is_internal_value_representation(&percent, &InternalValue::Integer(1)));
    assert!(!provider.is_internal_value_representation(
        &percent,
        &InternalValue::Text("50%".to_string())
    ));
}

#[test]
fn test_generic_arguments_are_substituted_into_supertype() {
    let mut builder = ModelBuilder::new();
    let wrapped = builder.value_type(
        "Wrapped",
        &["T"],
        Some(collection_of(vt("T"))),
        None,
    );
    let model = builder.linked();
    let provider = ValueTypeProvider::new(&model);

    let wrapped_integers = ValueType::Atomic(AtomicTypeRef {
        id: wrapped,
        name: "Wrapped".to_string(),
        generic_arguments: vec![ValueType::INTEGER],
    });
    assert_eq!(wrapped_integers.to_string(), "Wrapped<Integer>");
    assert_eq!(
        provider.supertype(&wrapped_integers),
        Some(collection(ValueType::INTEGER))
    );
    assert!(provider.is_convertible(&wrapped_integers, &collection(ValueType::DECIMAL)));

    // unbound inside the definition itself
    assert_eq!(
        AtomicValueType::wrap(&model, wrapped).unwrap().supertype(),
        Some(collection(ValueType::Generic {
            name: "T".to_string()
        }))
    );
}

// ============================================================================
// Supertype Cycle Tests
// ============================================================================

#[test]
fn test_supertype_cycle_is_detected_and_terminates() {
    let mut builder = ModelBuilder::new();
    let a = builder.value_type("A", &[], Some(vt("B")), None);
    let b = builder.value_type("B", &[], Some(vt("A")), None);
    let c = builder.value_type("C", &[], Some(vt("A")), None);
    let model = builder.linked();
    let provider = ValueTypeProvider::new(&model);

    assert!(provider.has_supertype_cycle(a));
    assert!(provider.has_supertype_cycle(b));
    // C leads into the cycle without being part of it
    assert!(provider.has_supertype_cycle(c));

    let a_type = atomic(&model, a);
    assert_eq!(provider.terminal_type(&a_type), None);
    assert!(!provider.is_convertible(&a_type, &ValueType::TEXT));
    assert!(provider.is_convertible(&a_type, &atomic(&model, b)));
    assert!(!provider.is_allowed_as_runtime_parameter(&a_type));
}

#[test]
fn test_self_supertype_is_a_cycle() {
    let mut builder = ModelBuilder::new();
    let id = builder.value_type("Loop", &[], Some(vt("Loop")), None);
    let model = builder.linked();

    assert!(AtomicValueType::wrap(&model, id).unwrap().has_supertype_cycle());
}

#[test]
fn test_chain_ending_in_primitive_is_not_a_cycle() {
    let mut builder = ModelBuilder::new();
    builder.value_type("Base", &[], Some(vt("Integer")), None);
    let derived = builder.value_type("Derived", &[], Some(vt("Base")), None);
    let model = builder.linked();

    assert!(!ValueTypeProvider::new(&model).has_supertype_cycle(derived));
}

// ============================================================================
// Constraint Execution Tests
// ============================================================================

#[test]
fn test_validate_value_runs_constraints_of_supertypes() {
    let mut builder = ModelBuilder::new();
    let short = builder.typed_constraint(
        "Short",
        "LengthConstraint",
        vec![("maxLength", int(3).into())],
    );
    let lower = builder.expression_constraint(
        "Lowercase",
        vt("Text"),
        binary(
            BinaryOperator::Equal,
            value_keyword(),
            unary(crate::ast::UnaryOperator::Lowercase, value_keyword()),
        ),
    );
    builder.value_type("ShortText", &[], Some(vt("Text")), Some(constraints(&["Short"])));
    let code = builder.value_type(
        "Code",
        &[],
        Some(vt("ShortText")),
        Some(constraints(&["Lowercase"])),
    );
    let model = builder.linked();

    let registry = MetaInformationRegistry::with_builtins();
    let operators = OperatorRegistry::standard();
    let parameters = RuntimeParameterProvider::new();
    let context =
        EvaluationContext::new(&parameters, &operators, ValueTypeProvider::new(&model));
    let code = AtomicValueType::wrap(&model, code).unwrap();

    assert_eq!(code.all_constraint_ids(&context), vec![lower, short]);

    let check = |value: &str| {
        code.validate_value(&InternalValue::Text(value.to_string()), &context, &registry)
            .expect("constraints should evaluate")
    };
    assert!(check("abc").is_empty());
    assert_eq!(check("abcd"), vec![short]);
    assert_eq!(check("ABCD"), vec![lower, short]);
}

/// `[A, B, ...]` of constraint references
fn constraints(names: &[&str]) -> crate::ast::Expression {
    crate::test_helpers::collection(names.iter().map(|name| constraint_ref(name)).collect())
}
