mod common;

use common::{petstore_registry, write_spec, PETSTORE_YAML};
use http::Method;
use oasbridge::{Error, RawRequest, SpecRegistry};
use serde_json::json;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_one_shot_gate_blocks_early_readers() {
    let registry = Arc::new(SpecRegistry::new());

    // Readers that start before the spec is loaded must block, not race.
    let mut readers = Vec::new();
    for _ in 0..4 {
        let registry = Arc::clone(&registry);
        readers.push(thread::spawn(move || {
            registry.get_operation("list_pets").map(|op| op.path_pattern.clone())
        }));
    }

    thread::sleep(Duration::from_millis(50));
    assert!(registry.try_specification().is_none());

    let file = write_spec(PETSTORE_YAML, "yaml");
    registry.load(file.path()).expect("spec loads");

    for reader in readers {
        let path = reader.join().expect("reader thread").expect("operation resolves");
        assert_eq!(path, "/pets");
    }
}

#[test]
fn test_second_load_fails() {
    let (registry, file) = petstore_registry();
    let err = registry.load(file.path()).expect_err("second load must fail");
    assert!(matches!(err, Error::SpecLoad(_)));
    assert!(err.to_string().contains("already loaded"));
}

#[test]
fn test_failed_load_leaves_gate_closed() {
    let registry = SpecRegistry::new();
    let file = write_spec("openapi: [unclosed", "yaml");
    assert!(registry.load(file.path()).is_err());
    assert!(registry.try_specification().is_none());

    // A retry with a good spec succeeds.
    let good = write_spec(PETSTORE_YAML, "yaml");
    assert!(registry.load(good.path()).is_ok());
}

#[test]
fn test_unknown_operation() {
    let (registry, _file) = petstore_registry();
    let err = registry.get_operation("feed_pet").expect_err("unknown id");
    assert!(matches!(err, Error::UnknownOperation(id) if id == "feed_pet"));
}

#[test]
fn test_validate_request_decodes_parameters() {
    let (registry, _file) = petstore_registry();
    let op = registry.get_operation("list_pets").expect("operation");

    let request = RawRequest::new(Method::GET, "/pets")
        .query_param("limit", "2")
        .query_param("animal_type", "cat");
    let bound = registry.validate_request(&op, &request).expect("valid request");

    // values come back exactly as supplied, decoded to their schema types
    assert_eq!(bound.query_params.get("limit"), Some(&json!(2)));
    assert_eq!(bound.query_params.get("animal_type"), Some(&json!("cat")));
    assert!(bound.body.is_none());
}

#[test]
fn test_validate_request_parses_body() {
    let (registry, _file) = petstore_registry();
    let op = registry.get_operation("add_pet").expect("operation");

    let pet = json!({"name": "Rex", "animal_type": "dog"});
    let request = RawRequest::new(Method::POST, "/pets").body(pet.to_string());
    let bound = registry.validate_request(&op, &request).expect("valid request");
    assert_eq!(bound.body, Some(pet));
}

#[test]
fn test_missing_required_parameter_is_listed() {
    let (registry, _file) = petstore_registry();
    let op = registry.get_operation("get_pet").expect("operation");

    let request = RawRequest::new(Method::GET, "/pets/");
    let err = registry.validate_request(&op, &request).expect_err("must fail");
    let msg = err.to_string();
    assert!(msg.contains("pet_id"), "got: {msg}");
    assert!(msg.contains("path"), "got: {msg}");
}

#[test]
fn test_all_violations_reported_not_just_first() {
    let (registry, _file) = petstore_registry();
    let op = registry.get_operation("update_pet").expect("operation");

    // missing pet_id AND a body whose `name` has the wrong type
    let request = RawRequest::new(Method::PUT, "/pets/")
        .body(json!({"name": 42, "animal_type": "dog"}).to_string());
    let err = registry.validate_request(&op, &request).expect_err("must fail");
    match err {
        Error::Validation { violations } => {
            assert!(violations.len() >= 2, "violations: {violations:?}");
            assert!(violations.iter().any(|v| v.contains("pet_id")));
            assert!(violations.iter().any(|v| v.starts_with("body")));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn test_required_body_missing() {
    let (registry, _file) = petstore_registry();
    let op = registry.get_operation("add_pet").expect("operation");

    let request = RawRequest::new(Method::POST, "/pets");
    let err = registry.validate_request(&op, &request).expect_err("must fail");
    assert!(err.to_string().contains("body is required"));
}

#[test]
fn test_malformed_json_body() {
    let (registry, _file) = petstore_registry();
    let op = registry.get_operation("add_pet").expect("operation");

    let request = RawRequest::new(Method::POST, "/pets").body("{not json");
    let err = registry.validate_request(&op, &request).expect_err("must fail");
    assert!(err.to_string().contains("not valid JSON"));
}

#[test]
fn test_validate_response_reports_mismatch() {
    let (registry, _file) = petstore_registry();
    let op = registry.get_operation("get_pet").expect("operation");

    let good = json!({"name": "Rex", "animal_type": "dog"});
    assert!(registry.validate_response(&op, 200, &good).is_ok());

    let bad = json!({"id": "not-an-integer"});
    let err = registry.validate_response(&op, 200, &bad).expect_err("must fail");
    assert!(matches!(err, Error::Validation { .. }));
}
