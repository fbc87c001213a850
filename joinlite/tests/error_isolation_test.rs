//! Integration tests for error isolation, aggregation and raising
//!
//! Queries run against JSON entities through `DataResolver` (with the
//! `$error` failure marker) or a resolver that fails on every attribute named
//! `trigger-error`.

use joinlite::{
    path, raise_errors, DataResolver, ErrorDetail, ExecutionContext, ExecutionError,
    ExecutionOptions, ExecutionResult, Key, LocalErrors, NodeError, NodeFailure, Path,
    ProcessorError, Query, QueryExecutor, QueryNode, ResolveEnv, Resolved, Resolver,
    ResultValue, ERRORS_KEY, ERROR_SENTINEL,
};
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeSet;
use std::sync::Arc;

fn trigger_resolver(env: &ResolveEnv<'_>, node: &QueryNode) -> Result<Resolved, NodeError> {
    if node.attribute == "trigger-error" {
        return Err(NodeError::new("Error triggered"));
    }
    DataResolver::new().resolve(env, node)
}

fn message_only(_: &ExecutionContext, failure: &NodeFailure) -> Result<ErrorDetail, ProcessorError> {
    Ok(json!(failure.cause.message))
}

fn marker_context() -> ExecutionContext {
    ExecutionContext::new(Arc::new(
        DataResolver::new().with_failure_marker(DataResolver::FAILURE_MARKER),
    ))
}

fn trigger_context() -> ExecutionContext {
    ExecutionContext::new(Arc::new(trigger_resolver))
}

fn run(context: ExecutionContext, query: JsonValue, entity: JsonValue) -> Result<ExecutionResult, ExecutionError> {
    let query = Query::from_json(&query).expect("valid query");
    QueryExecutor::new(context).execute_with_entity(&query, &entity)
}

fn go_query() -> JsonValue {
    json!([{"go": [{"nest": ["trigger-error", "ok"]}, "trigger-error", "label"]}])
}

fn go_entity() -> JsonValue {
    json!({"go": {"nest": {"ok": true}, "label": "go"}})
}

fn people_entity() -> JsonValue {
    json!({
        "people": [
            {"name": "Alice", "age": 30},
            {"name": "Bob", "age": {"$error": "age is private"}},
            {"name": {"$error": "name lookup failed"}, "age": 35},
            {"name": "Dana", "age": 41}
        ]
    })
}

#[test]
fn test_single_failure_is_isolated() {
    let result = run(
        marker_context(),
        json!(["a", "b", "c"]),
        json!({"a": 1, "b": {"$error": "broken"}, "c": 3}),
    )
    .unwrap();

    assert_eq!(result.get("a"), Some(&ResultValue::Value(json!(1))));
    assert_eq!(result.get("b"), Some(&ResultValue::Error));
    assert_eq!(result.get("c"), Some(&ResultValue::Value(json!(3))));
    assert_eq!(result.sentinel_paths(), vec![path!["b"]]);
}

#[test]
fn test_every_failure_is_indexed() {
    let result = run(trigger_context(), go_query(), go_entity()).unwrap();

    let index = result.error_index().expect("errors recorded");
    let paths: Vec<&Path> = index.keys().collect();
    assert_eq!(
        paths,
        vec![&path!["go", "nest", "trigger-error"], &path!["go", "trigger-error"]]
    );
    assert_eq!(
        index.get(&path!["go", "trigger-error"]),
        Some(&json!("ResolverError: Error triggered"))
    );

    // Siblings of the failures keep their values
    assert_eq!(
        result.get_path(&path!["go", "nest", "ok"]),
        Some(&ResultValue::Value(json!(true)))
    );
    assert_eq!(
        result.get_path(&path!["go", "label"]),
        Some(&ResultValue::Value(json!("go")))
    );
}

#[test]
fn test_no_errors_means_no_errors_slot() {
    let result = run(marker_context(), json!(["a", {"j": ["b"]}]), json!({"a": 1, "j": {"b": 2}})).unwrap();

    assert!(result.errors().is_none());
    assert!(result.to_json().get(ERRORS_KEY).is_none());
}

#[test]
fn test_fail_fast_aborts_without_result() {
    let err = run(trigger_context().fail_fast(true), go_query(), go_entity()).unwrap_err();

    let first = err.aborted_by().expect("aborted");
    assert_eq!(first.path, path!["go", "nest", "trigger-error"]);
    assert_eq!(first.cause.message, "Error triggered");
}

#[test]
fn test_raise_errors_places_errors_beside_data() {
    let context = trigger_context().with_processor(Arc::new(message_only));
    let result = run(context, go_query(), go_entity()).unwrap();

    let expected_index: Vec<(Path, JsonValue)> = vec![
        (path!["go", "nest", "trigger-error"], json!("Error triggered")),
        (path!["go", "trigger-error"], json!("Error triggered")),
    ];
    let index: Vec<(Path, JsonValue)> = result
        .error_index()
        .unwrap()
        .iter()
        .map(|(p, d)| (p.clone(), d.clone()))
        .collect();
    assert_eq!(index, expected_index);

    let raised = raise_errors(result);
    assert!(raised.errors().is_none());

    let local: LocalErrors = [(Key::attr("trigger-error"), json!("Error triggered"))]
        .into_iter()
        .collect();
    assert_eq!(raised.map_at(&path!["go", "nest"]).unwrap().local_errors(), Some(&local));
    assert_eq!(raised.map_at(&path!["go"]).unwrap().local_errors(), Some(&local));

    let rendered = raised.to_json();
    assert_eq!(rendered["go"][ERRORS_KEY], json!({"trigger-error": "Error triggered"}));
    assert_eq!(rendered["go"]["nest"]["trigger-error"], json!(ERROR_SENTINEL));
}

#[test]
fn test_processor_override_changes_only_details() {
    let default = run(marker_context(), json!([{"people": ["name", "age"]}]), people_entity()).unwrap();
    let custom = run(
        marker_context().with_processor(Arc::new(message_only)),
        json!([{"people": ["name", "age"]}]),
        people_entity(),
    )
    .unwrap();

    let default_paths: Vec<&Path> = default.error_index().unwrap().keys().collect();
    let custom_paths: Vec<&Path> = custom.error_index().unwrap().keys().collect();
    assert_eq!(default_paths, custom_paths);
    assert_eq!(default.sentinel_paths(), custom.sentinel_paths());

    assert_eq!(
        custom.error_index().unwrap().get(&path!["people", 1usize, "age"]),
        Some(&json!("age is private"))
    );
    assert_ne!(default.error_index(), custom.error_index());
}

#[test]
fn test_raise_errors_twice_is_noop() {
    let result = run(trigger_context(), go_query(), go_entity()).unwrap();
    let once = raise_errors(result);
    assert_eq!(raise_errors(once.clone()), once);
}

#[test]
fn test_list_join_paths_carry_indices() {
    let result = run(marker_context(), json!([{"people": ["name", "age"]}]), people_entity()).unwrap();

    assert_eq!(
        result.sentinel_paths(),
        vec![path!["people", 1usize, "age"], path!["people", 2usize, "name"]]
    );
    assert_eq!(result.error_count(), 2);
    assert_eq!(
        result.get_path(&path!["people", 3usize, "name"]),
        Some(&ResultValue::Value(json!("Dana")))
    );
}

#[test]
fn test_parallel_matches_sequential() {
    let query = json!(["missing", {"people": ["name", "age"]}, {"go": ["label"]}]);
    let mut entity = people_entity();
    entity["go"] = json!({"label": "x"});

    let sequential = run(marker_context(), query.clone(), entity.clone()).unwrap();
    let parallel = run(marker_context().parallel(true), query, entity).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_parallel_fail_fast_reports_one_real_failure() {
    let err = run(
        marker_context().parallel(true).fail_fast(true),
        json!([{"people": ["name", "age"]}]),
        people_entity(),
    )
    .unwrap_err();

    let failing: BTreeSet<Path> = [path!["people", 1usize, "age"], path!["people", 2usize, "name"]]
        .into_iter()
        .collect();
    let first = err.aborted_by().expect("aborted");
    assert!(failing.contains(&first.path));
}

#[test]
fn test_processor_failure_is_fatal() {
    let failing = |_: &ExecutionContext, _: &NodeFailure| -> Result<ErrorDetail, ProcessorError> {
        Err(ProcessorError::from("processor bug"))
    };

    for parallel in [false, true] {
        let context = trigger_context()
            .with_processor(Arc::new(failing))
            .parallel(parallel);
        let err = run(context, go_query(), go_entity()).unwrap_err();
        assert!(err.is_processor_failure());
    }
}

#[test]
fn test_resolver_panic_is_isolated() {
    fn panicking(env: &ResolveEnv<'_>, node: &QueryNode) -> Result<Resolved, NodeError> {
        if node.attribute == "explode" {
            panic!("resolver exploded");
        }
        DataResolver::new().resolve(env, node)
    }

    let context = ExecutionContext::new(Arc::new(panicking));
    let result = run(context, json!(["explode", "a"]), json!({"a": 1})).unwrap();

    assert_eq!(result.get("explode"), Some(&ResultValue::Error));
    assert_eq!(result.get("a"), Some(&ResultValue::Value(json!(1))));
    assert_eq!(
        result.error_index().unwrap().get(&path!["explode"]),
        Some(&json!("panic: resolver exploded"))
    );
}

#[test]
fn test_join_on_scalar_is_a_node_failure() {
    let result = run(marker_context(), json!([{"a": ["b"]}, "c"]), json!({"a": 5, "c": 6})).unwrap();

    assert_eq!(result.get("a"), Some(&ResultValue::Error));
    let detail = result.error_index().unwrap().get(&path!["a"]).unwrap();
    assert!(detail.as_str().unwrap().starts_with("InvalidJoin:"));
}

#[test]
fn test_missing_attributes_are_not_found() {
    let result = run(marker_context(), json!(["a", {"j": ["b"]}]), json!({})).unwrap();

    assert_eq!(result.get("a"), Some(&ResultValue::NotFound));
    assert_eq!(result.get("j"), Some(&ResultValue::NotFound));
    assert!(result.errors().is_none());
}

#[test]
fn test_options_drive_context() {
    let options = ExecutionOptions {
        fail_fast: true,
        ..ExecutionOptions::default()
    };
    let err = run(
        marker_context().with_options(options),
        json!(["a"]),
        json!({"a": {"$error": "nope"}}),
    )
    .unwrap_err();
    assert!(matches!(err, ExecutionError::Aborted { .. }));
}

#[test]
fn test_execute_without_entity() {
    let query = Query::new(vec![QueryNode::leaf("trigger-error"), QueryNode::leaf("x")]).unwrap();
    let result = joinlite::execute(&query, &trigger_context()).unwrap();

    assert_eq!(result.get("x"), Some(&ResultValue::NotFound));
    assert_eq!(result.error_count(), 1);
}
