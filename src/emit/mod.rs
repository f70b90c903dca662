//! The SQL emitter (spec.md §4.5): walks the resolved clause structures and
//! the WHERE AST, consulting the dialect for quoting, and assigns 1-based
//! positional parameter indices in strict left-to-right emission order.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::ast::ParsedQuery;
use crate::dialect::Dialect;
use crate::error::SyntaxError;
use crate::lexer::{Arity, OperatorKind, Token, TokenTag};
use crate::parser::ParsedStructure;

/// Emits SQL for an already-parsed structure against one dialect.
pub fn emit(structure: &ParsedStructure, dialect: &dyn Dialect, source: &str) -> Result<ParsedQuery, SyntaxError> {
    let sql_alias = &structure.from_item.sql_alias;
    let mut sql = String::from("SELECT ");

    let (entity, column_count) = emit_projection(structure, dialect, &mut sql, sql_alias)?;

    write!(sql, " FROM {} AS {sql_alias}", dialect.quote_identifier(&structure.from_item.entity.table_name))
        .expect("String writes never fail");

    let mut parameters: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut counter = 0usize;

    if let Some(root) = &structure.where_ast {
        let condition = emit_expr(root, 0, dialect, sql_alias, &mut parameters, &mut counter, source)?;
        write!(sql, " WHERE {condition}").expect("String writes never fail");
    }

    if !structure.order_by.is_empty() {
        sql.push_str(" ORDER BY ");
        let parts: Vec<String> = structure
            .order_by
            .iter()
            .map(|item| {
                let col = format!("{sql_alias}.{}", dialect.quote_identifier(&item.property.column_name));
                if item.ascending { col } else { format!("{col} DESC") }
            })
            .collect();
        sql.push_str(&parts.join(", "));
    }

    Ok(ParsedQuery { source: source.to_string(), sql, parameters, entity, column_count })
}

/// Collects every leaf (non-embedded) column of `entity`, recursing through
/// embedded composites in property-iteration order, depth-first. A
/// whole-entity projection expands to these columns (spec.md §4.5: "expands
/// to all properties of the entity") — an embedded property itself has no
/// `column_name` to emit, so its referenced entity's columns stand in for it.
fn flatten_columns(entity: &crate::schema::EntityDescriptor, out: &mut Vec<crate::schema::PropertyRef>) {
    for property in &entity.properties {
        if property.is_embedded {
            if let Some(referenced) = &property.referenced_entity {
                flatten_columns(referenced, out);
            }
        } else {
            out.push(property.clone());
        }
    }
}

fn emit_projection(
    structure: &ParsedStructure,
    dialect: &dyn Dialect,
    sql: &mut String,
    sql_alias: &str,
) -> Result<(Option<crate::schema::EntityRef>, usize), SyntaxError> {
    let whole_entity = structure.select_items.len() == 1 && structure.select_items[0].property.is_none();
    if whole_entity {
        let entity = structure.from_item.entity.clone();
        let mut columns = Vec::new();
        flatten_columns(&entity, &mut columns);
        let parts: Vec<String> = columns
            .iter()
            .map(|p| format!("{sql_alias}.{}", dialect.quote_identifier(&p.column_name)))
            .collect();
        sql.push_str(&parts.join(", "));
        let count = columns.len();
        return Ok((Some(entity), count));
    }

    let parts: Vec<String> = structure
        .select_items
        .iter()
        .map(|item| {
            let property = item.property.as_ref().expect("non-whole-entity select items always carry a property");
            format!("{sql_alias}.{}", dialect.quote_identifier(&property.column_name))
        })
        .collect();
    sql.push_str(&parts.join(", "));
    Ok((None, structure.select_items.len()))
}

#[allow(clippy::too_many_arguments)]
fn emit_expr(
    token: &Token,
    parent_precedence: u8,
    dialect: &dyn Dialect,
    sql_alias: &str,
    parameters: &mut BTreeMap<String, Vec<usize>>,
    counter: &mut usize,
    source: &str,
) -> Result<String, SyntaxError> {
    match token.tag {
        TokenTag::Field => {
            let property = token.property.as_ref().ok_or_else(|| {
                SyntaxError::new("field token missing a resolved property", token.span, source)
            })?;
            Ok(format!("{sql_alias}.{}", dialect.quote_identifier(&property.column_name)))
        }
        TokenTag::Number => Ok(token.text.clone()),
        TokenTag::String => Ok(dialect.quote_string(&token.text)),
        TokenTag::Parameter => {
            *counter += 1;
            parameters.entry(token.text.clone()).or_default().push(*counter);
            Ok("?".to_string())
        }
        TokenTag::OpExpr => emit_opexpr(token, parent_precedence, dialect, sql_alias, parameters, counter, source),
        other => Err(SyntaxError::new(format!("unexpected token tag {other:?} reached emission"), token.span, source)),
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_opexpr(
    token: &Token,
    parent_precedence: u8,
    dialect: &dyn Dialect,
    sql_alias: &str,
    parameters: &mut BTreeMap<String, Vec<usize>>,
    counter: &mut usize,
    source: &str,
) -> Result<String, SyntaxError> {
    let op = token.operator.ok_or_else(|| SyntaxError::new("OpExpr missing an operator", token.span, source))?;
    if matches!(op, OperatorKind::In | OperatorKind::Is) {
        return Err(SyntaxError::new(format!("raw {} operator cannot be emitted", op.sql_text()), token.span, source));
    }

    let this_precedence = op.precedence();
    let mut child = |t: &Token| emit_expr(t, this_precedence, dialect, sql_alias, parameters, counter, source);

    let inner = match op.arity() {
        Arity::UnaryPrefix => format!("{} {}", op.sql_text(), child(&token.children[0])?),
        Arity::UnaryPostfix => format!("{} {}", child(&token.children[0])?, op.sql_text()),
        Arity::Between => format!(
            "{} BETWEEN {} AND {}",
            child(&token.children[0])?,
            child(&token.children[1])?,
            child(&token.children[2])?
        ),
        Arity::Binary => format!("{} {} {}", child(&token.children[0])?, op.sql_text(), child(&token.children[1])?),
    };

    if this_precedence < parent_precedence {
        Ok(format!("({inner})"))
    } else {
        Ok(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;
    use crate::parser::parse;
    use crate::schema::{EntityDescriptor, PropertyDescriptor, StaticSchema};
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
    fn whole_entity_projection_matches_scenario_3() {
        let schema = user_schema();
        let src = "FROM User AS u WHERE id = :Id AND u.name like '%test%'";
        let structure = parse(src, &schema).unwrap();
        let query = emit(&structure, &GenericDialect::new(), src).unwrap();
        assert_eq!(
            query.sql,
            "SELECT _t1.id, _t1.name, _t1.flags FROM users AS _t1 WHERE _t1.id = ? AND _t1.name LIKE '%test%'"
        );
        assert_eq!(query.parameters.get("Id"), Some(&vec![1]));
    }

    #[test]
    fn whole_entity_projection_flattens_embedded_properties() {
        let country = Arc::new(EntityDescriptor::new(
            "Country",
            "countries",
            vec![Arc::new(PropertyDescriptor::column("code", "country_code"))],
        ));
        let address = Arc::new(EntityDescriptor::new(
            "Address",
            "addresses",
            vec![
                Arc::new(PropertyDescriptor::column("city", "city")),
                Arc::new(PropertyDescriptor::embedded("country", country)),
            ],
        ));
        let schema = StaticSchema::new().with_entity(EntityDescriptor::new(
            "User",
            "users",
            vec![
                Arc::new(PropertyDescriptor::column("id", "id")),
                Arc::new(PropertyDescriptor::embedded("address", address)),
            ],
        ));
        let src = "FROM User";
        let structure = parse(src, &schema).unwrap();
        let query = emit(&structure, &GenericDialect::new(), src).unwrap();
        assert_eq!(query.sql, "SELECT _t1.id, _t1.city, _t1.country_code FROM users AS _t1");
        assert_eq!(query.column_count, 3);
    }

    #[test]
    fn parameter_index_law_holds_across_whole_map() {
        let schema = user_schema();
        let src = "FROM User where id = :p1 or id = :p2 AND flags = :p1 AND name = :p1 OR name = :p3 AND flags = :p2";
        let structure = parse(src, &schema).unwrap();
        let query = emit(&structure, &GenericDialect::new(), src).unwrap();
        let mut all_indices: Vec<usize> = query.parameters.values().flatten().copied().collect();
        all_indices.sort_unstable();
        let expected: Vec<usize> = (1..=all_indices.len()).collect();
        assert_eq!(all_indices, expected);
    }

    #[test]
    fn needs_braces_only_when_precedence_demands_it() {
        let schema = user_schema();
        let src = "FROM User WHERE (id = 1 OR id = 2) AND flags = 3";
        let structure = parse(src, &schema).unwrap();
        let query = emit(&structure, &GenericDialect::new(), src).unwrap();
        assert!(query.sql.contains("(_t1.id = 1 OR _t1.id = 2) AND _t1.flags = 3"));
    }

    #[test]
    fn raw_is_without_null_fails_at_emission() {
        // `id IS 1` parses structurally (binary Is) but must be rejected here.
        let schema = user_schema();
        let src = "FROM User WHERE id IS 1";
        let structure = parse(src, &schema).unwrap();
        assert!(emit(&structure, &GenericDialect::new(), src).is_err());
    }
}
