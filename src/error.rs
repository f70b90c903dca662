//! Error types for the OQL core.
//!
//! Three fatal, non-recoverable kinds (spec.md §7): lexical errors for
//! malformed tokens, syntax errors for structural violations, and bind
//! errors for parameter-application problems. Every error renders with the
//! offending fragment of the source, matching spec.md's required format:
//! `` near `...rest of source...` in query `...full source...` ``.

use thiserror::Error;

use crate::lexer::Span;

fn near_fragment(query: &str, pos: usize) -> String {
    let pos = pos.min(query.len());
    let rest = &query[pos..];
    format!("near `{rest}` in query `{query}`")
}

/// Failure during tokenization.
///
/// The source string is named `query` rather than `source` because
/// `#[derive(thiserror::Error)]` treats a field literally named `source` as
/// `#[source]` and requires it to implement `std::error::Error` — a plain
/// `String` does not.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("lexical error: {reason} {}", near_fragment(.query, .span.start))]
pub struct LexicalError {
    pub reason: String,
    pub span: Span,
    pub query: String,
}

/// Failure while splitting clauses, resolving entities/properties, or
/// folding the WHERE expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("syntax error: {reason} {}", near_fragment(.query, .span.start))]
pub struct SyntaxError {
    pub reason: String,
    pub span: Span,
    pub query: String,
}

/// Failure while applying parameter values to a statement writer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("unknown parameter `{name}`: not present in `{query}`")]
    UnknownParameter { name: String, query: String },
    #[error("unbound parameters remain: {}", .names.join(", "))]
    UnboundParameters { names: Vec<String> },
}

/// The union of everything a caller of this crate can get back.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OqlError {
    #[error(transparent)]
    Lexical(#[from] LexicalError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Bind(#[from] BindError),
}

impl SyntaxError {
    #[must_use]
    pub fn new(reason: impl Into<String>, span: Span, query: impl Into<String>) -> Self {
        Self { reason: reason.into(), span, query: query.into() }
    }
}

impl LexicalError {
    #[must_use]
    pub fn new(reason: impl Into<String>, span: Span, query: impl Into<String>) -> Self {
        Self { reason: reason.into(), span, query: query.into() }
    }
}
