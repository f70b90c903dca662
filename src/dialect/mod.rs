//! SQL dialect collaborator (spec.md §6): identifier quoting and string
//! escaping vary by target database, but the core treats a dialect as a
//! pure, thread-safe value that holds quoting rules only (spec.md §5).

mod generic;
mod mysql;

pub use generic::GenericDialect;
pub use mysql::MySqlDialect;

/// Quoting and escaping rules for one target SQL dialect.
pub trait Dialect {
    /// Wraps an identifier (table or column name) when the dialect
    /// requires it, e.g. to protect reserved words or mixed case.
    fn quote_identifier(&self, name: &str) -> String;

    /// Wraps a string literal in single quotes, escaping embedded quotes,
    /// newlines, and backslashes per the dialect's rules. Example contract
    /// (spec.md §6): `quote_string("a'b")` is `'a\'b'`.
    fn quote_string(&self, s: &str) -> String;
}
