//! Parser and SQL translator for a Hibernate-style object query language.
//!
//! `oql-core` turns an entity/property-vocabulary query string into a
//! dialect-specific SQL string plus a positional parameter plan, resolving
//! entity and property names against a caller-supplied [`schema::Schema`].
//! It does not talk to a database, an ORM's metadata registry, or a
//! connection pool — those are external collaborators (see `schema`,
//! `dialect`, and `bind` for the traits this core depends on).
//!
//! ```
//! use oql_core::dialect::GenericDialect;
//! use oql_core::schema::{EntityDescriptor, PropertyDescriptor, StaticSchema};
//! use std::sync::Arc;
//!
//! let schema = StaticSchema::new().with_entity(EntityDescriptor::new(
//!     "User",
//!     "users",
//!     vec![Arc::new(PropertyDescriptor::column("name", "name"))],
//! ));
//! let query = oql_core::parse_and_emit(
//!     "FROM User AS u WHERE u.name = :name",
//!     &schema,
//!     &GenericDialect::new(),
//! ).unwrap();
//! assert_eq!(query.sql, "SELECT _t1.name FROM users AS _t1 WHERE _t1.name = ?");
//! ```

#![forbid(unsafe_code)]

pub mod ast;
pub mod bind;
pub mod dialect;
pub mod emit;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod schema;

pub use ast::{FromItem, FromItemIdx, OrderByItem, ParsedQuery, SelectItem};
pub use bind::{ParameterValues, SqlValue, StatementWriter};
pub use dialect::{Dialect, GenericDialect, MySqlDialect};
pub use error::{BindError, LexicalError, OqlError, SyntaxError};
pub use parser::{parse, ParsedStructure};
pub use schema::{EntityDescriptor, EntityRef, PropertyDescriptor, PropertyRef, Schema, StaticSchema};

/// Convenience wrapper around [`parser::parse`] followed by [`emit::emit`].
///
/// Most callers want both steps together; splitting them only matters if
/// you need the intermediate [`ParsedStructure`] (e.g. to inspect the
/// resolved entity before committing to a dialect).
pub fn parse_and_emit(source: &str, schema: &dyn Schema, dialect: &dyn Dialect) -> Result<ParsedQuery, OqlError> {
    let structure = parse(source, schema)?;
    let query = emit::emit(&structure, dialect, source)?;
    Ok(query)
}
