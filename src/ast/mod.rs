//! The semantic structures built on top of the token tree (spec.md §3).

use std::collections::BTreeMap;

use crate::schema::{EntityRef, PropertyRef};

/// Index into the parser's `Vec<FromItem>` arena.
///
/// Spec.md §9 calls out the D source's raw-pointer cycle between tokens and
/// `FromItem`s; this index is the systems-language fix — tokens carry an
/// `Option<FromItemIdx>` rather than a pointer, and the arena is owned
/// exclusively by the parser for the duration of one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FromItemIdx(pub usize);

/// One entity occurrence in the FROM clause.
///
/// Created once by the From parser and immutable thereafter; every `Field`,
/// `Entity`, `Alias`, `SelectItem`, and `OrderByItem` in the parse refers
/// back to it by index.
#[derive(Debug, Clone)]
pub struct FromItem {
    /// The entity name exactly as written in the OQL source.
    pub entity_name: String,
    pub entity: EntityRef,
    /// The user-supplied alias, if any (`AS alias` or a bare alias).
    pub user_alias: Option<String>,
    /// The synthesized SQL alias (`_t1`, `_t2`, ...), assigned in FROM order.
    pub sql_alias: String,
}

/// One projected item in the SELECT clause.
///
/// `property: None` means "project all columns of `from_item`" — spec.md
/// §4.3 forbids mixing this with any other item in the same query.
#[derive(Debug, Clone)]
pub struct SelectItem {
    pub from_item: FromItemIdx,
    pub property: Option<PropertyRef>,
}

/// One item in the ORDER BY clause.
#[derive(Debug, Clone)]
pub struct OrderByItem {
    pub from_item: FromItemIdx,
    pub property: PropertyRef,
    pub ascending: bool,
}

/// The fully emitted result of a parse (spec.md §3).
///
/// Self-contained: holds no reference back to the parser or its token
/// arena, so it can be shared freely across threads for read-only use
/// (spec.md §5).
#[derive(Debug, Clone)]
pub struct ParsedQuery {
    pub source: String,
    pub sql: String,
    /// Parameter name → the 1-based positional indices where it occurs,
    /// in first-occurrence order. The parameter-index law (spec.md §8)
    /// holds across this whole map: concatenating every list in ascending-
    /// index order yields `[1, 2, ..., n]`.
    pub parameters: BTreeMap<String, Vec<usize>>,
    /// Set only when the query used a whole-entity projection.
    pub entity: Option<EntityRef>,
    pub column_count: usize,
}

impl ParsedQuery {
    /// Total number of `?` placeholders in `sql`.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.parameters.values().map(Vec::len).sum()
    }
}
