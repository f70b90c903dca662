//! Error reporting (spec.md §7): every error carries the offending
//! fragment of the source in the `near \`...\` in query \`...\`` format.

use oql_core::dialect::GenericDialect;
use oql_core::schema::{EntityDescriptor, PropertyDescriptor, StaticSchema};
use oql_core::{parse, parse_and_emit, OqlError};
use std::sync::Arc;

fn user_schema() -> StaticSchema {
    StaticSchema::new().with_entity(EntityDescriptor::new(
        "User",
        "users",
        vec![Arc::new(PropertyDescriptor::column("id", "id"))],
    ))
}

#[test]
fn lexical_error_reports_the_invalid_character() {
    let schema = user_schema();
    let err = parse("FROM User WHERE id = #1", &schema).unwrap_err();
    assert!(matches!(err, OqlError::Lexical(_)));
    let msg = err.to_string();
    assert!(msg.contains("in query `FROM User WHERE id = #1`"));
}

#[test]
fn syntax_error_reports_the_unknown_entity_fragment() {
    let schema = user_schema();
    let err = parse("FROM Ghost", &schema).unwrap_err();
    assert!(matches!(err, OqlError::Syntax(_)));
    let msg = err.to_string();
    assert!(msg.contains("unknown entity"));
    assert!(msg.contains("near `Ghost` in query `FROM Ghost`"));
}

#[test]
fn syntax_error_reports_unknown_property_fragment() {
    let schema = user_schema();
    let err = parse("FROM User WHERE nope = 1", &schema).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("unknown property `nope`"));
}

#[test]
fn missing_from_clause_is_a_syntax_error() {
    let schema = user_schema();
    assert!(matches!(parse("SELECT id", &schema), Err(OqlError::Syntax(_))));
}

#[test]
fn emission_error_for_a_raw_operator_is_a_syntax_error() {
    let schema = user_schema();
    let err = parse_and_emit("FROM User WHERE id IS 1", &schema, &GenericDialect::new()).unwrap_err();
    assert!(matches!(err, OqlError::Syntax(_)));
}

#[test]
fn unterminated_string_literal_is_lexical() {
    let schema = user_schema();
    let err = parse("FROM User WHERE id = 'abc", &schema).unwrap_err();
    assert!(matches!(err, OqlError::Lexical(_)));
}

#[test]
fn all_error_kinds_implement_std_error() {
    fn assert_error<E: std::error::Error>() {}
    assert_error::<OqlError>();
}
