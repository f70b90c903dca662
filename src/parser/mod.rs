//! Parsing: clause splitting, From/Select/OrderBy interpretation, and the
//! WHERE expression parser (spec.md §4.2-§4.4).

mod clause_items;
mod clauses;
mod expression;

use tracing::warn;

use crate::ast::{FromItem, OrderByItem, SelectItem};
use crate::error::OqlError;
use crate::lexer::{tokenize, Token};
use crate::schema::Schema;

/// Everything the SQL emitter needs, already resolved against the schema.
#[derive(Debug, Clone)]
pub struct ParsedStructure {
    pub from_item: FromItem,
    pub select_items: Vec<SelectItem>,
    pub order_by: Vec<OrderByItem>,
    pub where_ast: Option<Token>,
}

/// Parses `source` against `schema`, producing a fully resolved structure
/// ready for [`crate::emit::emit`].
pub fn parse(source: &str, schema: &dyn Schema) -> Result<ParsedStructure, OqlError> {
    let _span = tracing::debug_span!("oql_parse", len = source.len()).entered();

    let mut tokens = tokenize(source).map_err(|e| {
        warn!(%e, "lexical error");
        e
    })?;
    let ranges = clauses::split(&tokens, source).map_err(|e| {
        warn!(%e, "clause splitting failed");
        e
    })?;

    let from_item = clause_items::parse_from(&mut tokens, ranges.from.clone(), schema, source)?;

    let select_items =
        clause_items::parse_select(&tokens, ranges.select.clone(), &from_item, source).map_err(|e| {
            warn!(%e, "select clause invalid");
            e
        })?;

    let order_by = match ranges.order_by.clone() {
        Some(range) => {
            clause_items::parse_order_by(&tokens, range, &from_item, source).map_err(|e| {
                warn!(%e, "order by clause invalid");
                e
            })?
        }
        None => Vec::new(),
    };

    let where_ast = match ranges.where_.clone() {
        Some(range) => Some(expression::parse_where(&tokens[range], &from_item, source).map_err(|e| {
            warn!(%e, "where clause invalid");
            e
        })?),
        None => None,
    };

    Ok(ParsedStructure { from_item, select_items, order_by, where_ast })
}
