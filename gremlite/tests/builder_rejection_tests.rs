//! Traversals that must be rejected while they are built

#[path = "testutils/mod.rs"]
mod testutils;

use std::sync::Arc;

use gremlite::{
    DataType, ElementType, EngineError, Operand, SchemaError, SchemaRegistry, Traversal,
    TraversalSource, Value, P,
};
use testutils::test_fixture::household_schema;

fn source() -> TraversalSource {
    testutils::init_logging();
    TraversalSource::new(Arc::new(household_schema()))
}

fn type_error(traversal: Traversal) -> String {
    match traversal.build() {
        Err(EngineError::PipelineTypeError(message)) => message,
        other => panic!("expected a pipeline type error, got {:?}", other),
    }
}

#[test]
fn test_unknown_kinds_and_attributes() {
    let g = source();

    assert_eq!(
        g.from_kind("Drache").build().unwrap_err(),
        EngineError::SchemaMismatch(SchemaError::UnknownVertexKind("Drache".to_string()))
    );
    assert_eq!(
        g.from_kind("Person").out("Mag").build().unwrap_err(),
        EngineError::SchemaMismatch(SchemaError::UnknownEdgeKind("Mag".to_string()))
    );
    assert!(matches!(
        g.from_kind("Person").values("address").build(),
        Err(EngineError::SchemaMismatch(SchemaError::UnknownAttribute { .. }))
    ));
    assert!(matches!(
        g.from_kind("Person").has("farbe", P::eq("rot")).build(),
        Err(EngineError::SchemaMismatch(SchemaError::UnknownAttribute { .. }))
    ));

    // owned things have no common kind, so their attributes are unknown
    assert!(matches!(
        g.from_kind("Person").out("Besitzt").values("name").build(),
        Err(EngineError::SchemaMismatch(SchemaError::UnknownAttribute { .. }))
    ));
    assert!(g
        .from_kind("Person")
        .out("Besitzt")
        .of_kind("Haustier")
        .values("name")
        .build()
        .is_ok());
}

#[test]
fn test_first_error_is_kept() {
    let g = source();
    let traversal = g
        .from_kind("Drache")
        .values("name")
        .out("Kennt")
        .is(P::matches("("));
    assert!(traversal.error().is_some());
    assert_eq!(
        traversal.build().unwrap_err(),
        EngineError::SchemaMismatch(SchemaError::UnknownVertexKind("Drache".to_string()))
    );
}

#[test]
fn test_steps_against_incompatible_types() {
    let g = source();

    type_error(g.from_kind("Person").values("name").out("Kennt"));
    type_error(g.from_kind("Person").values("name").of_kind("Person"));
    type_error(g.from_kind("Person").count().values("name"));
    type_error(g.from_kind("Person").values("name").unfold());
    type_error(g.from_kind("Person").has("age", P::starts_with("3")));
    type_error(g.from_kind("Person").values("age").is(P::eq("drei")));
    type_error(g.from_kind("Person").values("name").is(P::contains("A")));
    type_error(g.from_kind("Haus").out("WohntIn"));
}

#[test]
fn test_impossible_narrowing() {
    let g = source();
    let message = type_error(g.from_kind("Person").of_kind("Haus"));
    assert!(message.contains("Haus"));

    // widening or re-narrowing within the hierarchy is fine
    assert!(g.from_kind("Haustier").of_kind("Hund").build().is_ok());
    assert!(g.from_kind("Person").of_kind("Knoten").build().is_ok());
}

#[test]
fn test_unbound_label() {
    let g = source();
    let message = type_error(
        g.from_kind("Person")
            .out("Kennt")
            .is(P::neq(Operand::label("start"))),
    );
    assert!(message.contains("start"));

    // labels bound before a fold are not visible after it
    type_error(
        g.from_kind("Person")
            .as_("p")
            .fold()
            .is(P::contains(Operand::label("p"))),
    );

    assert!(g
        .from_kind("Person")
        .as_("start")
        .out("Kennt")
        .is(P::neq(Operand::label("start")))
        .build()
        .is_ok());
}

#[test]
fn test_mixed_projection() {
    let g = source();
    let message = type_error(
        g.from_kind("Person")
            .project(|p| p.by("name", |t| t.values("name")).by_position(|t| t.count())),
    );
    assert!(message.contains("mix"));

    type_error(g.from_kind("Person").project(|p| p));
}

#[test]
fn test_invalid_regex() {
    let g = source();
    let message = type_error(g.from_kind("Person").has("name", P::matches("([a-z")));
    assert!(message.contains("([a-z"));
}

#[test]
fn test_sub_traversal_must_continue_from_input() {
    let g = source();
    let other = TraversalSource::new(Arc::clone(g.registry()));
    type_error(g.from_kind("Person").where_(move |_| other.from_kind("Person")));
}

#[test]
fn test_map_value_output_type() {
    let g = source();
    let lengths = g
        .from_kind("Person")
        .values("name")
        .map_value("len", DataType::Integer, |v| {
            Value::from(v.as_string().map(|s| s.len() as i64).unwrap_or(0))
        });
    assert_eq!(
        lengths.current_type(),
        &ElementType::Scalar(DataType::Integer)
    );
    assert!(lengths.is(P::gt(3)).build().is_ok());
}

#[test]
fn test_registry_is_shared_by_sources() {
    let registry: Arc<SchemaRegistry> = Arc::new(household_schema());
    let a = TraversalSource::new(Arc::clone(&registry));
    let b = TraversalSource::new(Arc::clone(&registry));
    assert!(Arc::ptr_eq(a.registry(), b.registry()));
}
