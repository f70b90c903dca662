//! Parameter binding (spec.md §4.6, §8 scenario 5), exercised end-to-end
//! from a parsed-and-emitted query through `ParameterValues`.

use oql_core::dialect::GenericDialect;
use oql_core::schema::{EntityDescriptor, PropertyDescriptor, StaticSchema};
use oql_core::{parse_and_emit, BindError, ParameterValues, SqlValue, StatementWriter};
use std::sync::Arc;

fn user_schema() -> StaticSchema {
    StaticSchema::new().with_entity(EntityDescriptor::new(
        "User",
        "users",
        vec![
            Arc::new(PropertyDescriptor::column("id", "id")),
            Arc::new(PropertyDescriptor::column("name", "name")),
        ],
    ))
}

#[derive(Default)]
struct RecordingWriter {
    seen: Vec<(usize, SqlValue)>,
}

impl StatementWriter for RecordingWriter {
    fn set_value(&mut self, index1based: usize, value: SqlValue) {
        self.seen.push((index1based, value));
    }
}

#[test]
fn concrete_scenario_five_index_assignment() {
    let schema = user_schema();
    let query =
        parse_and_emit("FROM User where id = :p1 or id = :p2", &schema, &GenericDialect::new()).unwrap();
    let mut values = ParameterValues::new(&query);
    values.set("p1", SqlValue::Integer(1)).unwrap();
    values.set("p2", SqlValue::Integer(2)).unwrap();
    values.check_all_bound().unwrap();
    assert_eq!(query.parameters.get("p1"), Some(&vec![1]));
    assert_eq!(query.parameters.get("p2"), Some(&vec![2]));
}

#[test]
fn apply_dispatches_to_every_positional_index_in_order() {
    let schema = user_schema();
    let query = parse_and_emit(
        "FROM User WHERE id = :id OR name = :id OR name = :other",
        &schema,
        &GenericDialect::new(),
    )
    .unwrap();
    let mut values = ParameterValues::new(&query);
    values.set("id", SqlValue::Integer(42)).unwrap();
    values.set("other", SqlValue::Text("ada".to_string())).unwrap();
    let mut writer = RecordingWriter::default();
    values.apply(&query, &mut writer).unwrap();
    writer.seen.sort_by_key(|(i, _)| *i);
    assert_eq!(
        writer.seen,
        vec![
            (1, SqlValue::Integer(42)),
            (2, SqlValue::Integer(42)),
            (3, SqlValue::Text("ada".to_string())),
        ]
    );
}

#[test]
fn binding_an_unknown_name_is_a_bind_error() {
    let schema = user_schema();
    let query = parse_and_emit("FROM User WHERE id = :id", &schema, &GenericDialect::new()).unwrap();
    let mut values = ParameterValues::new(&query);
    let err = values.set("nope", SqlValue::Integer(1)).unwrap_err();
    assert!(matches!(err, BindError::UnknownParameter { .. }));
}

#[test]
fn applying_with_an_unbound_name_fails_before_writing_anything() {
    let schema = user_schema();
    let query =
        parse_and_emit("FROM User WHERE id = :id AND name = :name", &schema, &GenericDialect::new()).unwrap();
    let mut values = ParameterValues::new(&query);
    values.set("id", SqlValue::Integer(1)).unwrap();
    let mut writer = RecordingWriter::default();
    let err = values.apply(&query, &mut writer).unwrap_err();
    assert!(matches!(err, BindError::UnboundParameters { .. }));
    assert!(writer.seen.is_empty());
}

#[test]
fn a_query_with_no_parameters_binds_trivially() {
    let schema = user_schema();
    let query = parse_and_emit("FROM User WHERE id = 1", &schema, &GenericDialect::new()).unwrap();
    let values = ParameterValues::new(&query);
    values.check_all_bound().unwrap();
}
