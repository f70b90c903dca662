//! SQL emission (spec.md §4.5, §8), exercised end-to-end through
//! `parse_and_emit` rather than the internal `emit` module directly.

use oql_core::dialect::{GenericDialect, MySqlDialect};
use oql_core::schema::{EntityDescriptor, PropertyDescriptor, StaticSchema};
use oql_core::parse_and_emit;
use std::sync::Arc;

fn user_schema() -> StaticSchema {
    StaticSchema::new().with_entity(EntityDescriptor::new(
        "User",
        "users",
        vec![
            Arc::new(PropertyDescriptor::column("id", "id")),
            Arc::new(PropertyDescriptor::column("name", "name")),
            Arc::new(PropertyDescriptor::column("flags", "flags")),
        ],
    ))
}

#[test]
fn concrete_scenario_three_matches_exactly() {
    let schema = user_schema();
    let query = parse_and_emit(
        "FROM User AS u WHERE id = :Id and u.name like '%test%'",
        &schema,
        &GenericDialect::new(),
    )
    .unwrap();
    assert_eq!(
        query.sql,
        "SELECT _t1.id, _t1.name, _t1.flags FROM users AS _t1 WHERE _t1.id = ? AND _t1.name LIKE '%test%'"
    );
    assert_eq!(query.parameters.get("Id"), Some(&vec![1]));
}

#[test]
fn whole_entity_projection_sets_entity_and_column_count() {
    let schema = user_schema();
    let query = parse_and_emit("FROM User", &schema, &GenericDialect::new()).unwrap();
    assert!(query.entity.is_some());
    assert_eq!(query.column_count, 3);
}

#[test]
fn field_projection_leaves_entity_unset() {
    let schema = user_schema();
    let query = parse_and_emit("SELECT id, name FROM User", &schema, &GenericDialect::new()).unwrap();
    assert!(query.entity.is_none());
    assert_eq!(query.column_count, 2);
}

#[test]
fn dialect_changes_identifier_quoting_but_not_placeholders() {
    let schema = user_schema();
    let generic = parse_and_emit("FROM User", &schema, &GenericDialect::new()).unwrap();
    let mysql = parse_and_emit("FROM User", &schema, &MySqlDialect::new()).unwrap();
    assert!(generic.sql.contains("_t1.id"));
    assert!(mysql.sql.contains("_t1.`id`"));
    assert_eq!(generic.column_count, mysql.column_count);
}

#[test]
fn between_and_or_parenthesize_per_precedence() {
    let schema = user_schema();
    let query = parse_and_emit(
        "FROM User WHERE (id = 1 OR id = 2) AND flags BETWEEN 1 AND 10",
        &schema,
        &GenericDialect::new(),
    )
    .unwrap();
    assert!(query.sql.contains("(_t1.id = 1 OR _t1.id = 2) AND _t1.flags BETWEEN 1 AND 10"));
}

#[test]
fn repeated_parameter_accumulates_every_positional_index() {
    let schema = user_schema();
    let query = parse_and_emit(
        "FROM User WHERE id = :p1 OR id = :p2 AND flags = :p1 AND name = :p1 OR name = :p3 AND flags = :p2",
        &schema,
        &GenericDialect::new(),
    )
    .unwrap();
    assert_eq!(query.parameters.get("p1"), Some(&vec![1, 3, 4]));
    assert_eq!(query.parameters.get("p2"), Some(&vec![2, 6]));
    assert_eq!(query.parameters.get("p3"), Some(&vec![5]));
}

#[test]
fn order_by_desc_is_appended_ascending_is_bare() {
    let schema = user_schema();
    let query = parse_and_emit("FROM User ORDER BY name, flags DESC", &schema, &GenericDialect::new()).unwrap();
    assert!(query.sql.ends_with("ORDER BY _t1.name, _t1.flags DESC"));
}

#[test]
fn raw_in_operator_without_list_shape_is_rejected_at_emission() {
    let schema = user_schema();
    assert!(parse_and_emit("FROM User WHERE id IS 1", &schema, &GenericDialect::new()).is_err());
}
