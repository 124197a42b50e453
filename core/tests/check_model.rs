//! End-to-end checks of serialized models through the public API

use std::path::{Path, PathBuf};

use conduit_core::ast::{link::link_model, Model};
use conduit_core::cli::check_model_file;
use conduit_core::config::Config;
use conduit_core::expr::{OperatorRegistry, RuntimeParameterProvider};
use conduit_core::meta::MetaInformationRegistry;
use conduit_core::validation::{has_errors, validate_model, ValidationContext, ValidationOptions};
use conduit_core::{Diagnostic, Severity};
use maplit::hashmap;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn check(name: &str, parameters: RuntimeParameterProvider) -> Vec<Diagnostic> {
    let mut model = Model::from_path(fixture(name)).expect("fixture should load");
    let registry = MetaInformationRegistry::with_builtins();
    let operators = OperatorRegistry::standard();
    let options = ValidationOptions::default();

    let mut diagnostics = link_model(&mut model, &registry);
    let context = ValidationContext::new(&model, &registry, &operators, &parameters, &options);
    diagnostics.extend(validate_model(&context));
    diagnostics
}

fn messages(diagnostics: &[Diagnostic], rule_id: &str) -> Vec<String> {
    diagnostics
        .iter()
        .filter(|d| d.rule_id == rule_id)
        .map(|d| d.message.clone())
        .collect()
}

#[test]
fn test_valid_pipeline_has_no_errors_or_warnings() {
    let diagnostics = check("cars.json", RuntimeParameterProvider::new());

    assert!(!has_errors(&diagnostics), "{:?}", diagnostics);
    assert!(
        diagnostics.iter().all(|d| d.severity != Severity::Warning),
        "{:?}",
        diagnostics
    );
}

#[test]
fn test_supplied_runtime_parameter_is_validated() {
    let empty_url = RuntimeParameterProvider::from_map(hashmap! {
        "CARS_URL".to_string() => String::new(),
    });
    let diagnostics = check("cars.json", empty_url);

    let errors = messages(&diagnostics, "block-properties");
    assert_eq!(errors.len(), 1, "{:?}", diagnostics);

    let real_url = RuntimeParameterProvider::from_map(hashmap! {
        "CARS_URL".to_string() => "https://example.com/cars.csv".to_string(),
    });
    assert!(!has_errors(&check("cars.json", real_url)));
}

#[test]
fn test_broken_pipeline_reports_each_problem() {
    let diagnostics = check("broken.json", RuntimeParameterProvider::new());

    assert!(has_errors(&diagnostics));

    let unresolved = messages(&diagnostics, "unresolved-reference");
    assert_eq!(unresolved.len(), 1);
    assert!(unresolved[0].contains("\"Missing\""), "{}", unresolved[0]);

    let properties = messages(&diagnostics, "block-properties");
    assert!(
        properties.iter().any(|m| m.contains("\"url\"")),
        "{:?}",
        properties
    );

    // reported at both ends of the pipe
    assert_eq!(messages(&diagnostics, "pipe-compatibility").len(), 2);

    assert!(diagnostics
        .iter()
        .any(|d| d.severity == Severity::Info
            && d.message == "The expression can be simplified to 3"));
}

#[test]
fn test_diagnostics_serialize_with_lowercase_severity() {
    let diagnostics = check("broken.json", RuntimeParameterProvider::new());
    let json = serde_json::to_value(&diagnostics).unwrap();

    let first = &json[0];
    assert!(first["severity"].is_string());
    assert!(json
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d["severity"] == "error"));
}

#[test]
fn test_check_model_file_merges_parameters() {
    let config = Config::builder().skip_environment(true).build().unwrap();

    let diagnostics = check_model_file(
        &fixture("cars.json"),
        &config,
        vec![("CARS_URL".to_string(), String::new())],
    )
    .unwrap();
    assert!(has_errors(&diagnostics));

    let missing = check_model_file(Path::new("does-not-exist.json"), &config, vec![]);
    assert!(missing.is_err());
}
