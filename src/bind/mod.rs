//! Parameter binding (spec.md §4.6): applies caller-supplied values to the
//! positional placeholders a [`crate::ast::ParsedQuery`] recorded during
//! emission.

use std::collections::{BTreeMap, BTreeSet};

use crate::ast::ParsedQuery;
use crate::error::BindError;

/// A value bindable to one `?` placeholder.
///
/// Deliberately small — this core does not own a database driver (§1), so
/// it only needs enough variants to round-trip through whatever
/// [`StatementWriter`] the caller's driver adapter implements.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Receives bound values at their assigned positional index.
///
/// The external collaborator a database driver adapter implements; this
/// core never talks to a connection itself (§1 Non-goals: connection
/// management, result-set hydration).
pub trait StatementWriter {
    fn set_value(&mut self, index1based: usize, value: SqlValue);
}

/// Accumulates parameter values for one [`ParsedQuery`] before binding.
///
/// Tracks which of the query's named parameters remain unbound so
/// [`Self::apply`] can fail loudly rather than silently leaving a
/// placeholder unset.
#[derive(Debug, Clone)]
pub struct ParameterValues {
    source: String,
    known: BTreeSet<String>,
    values: BTreeMap<String, SqlValue>,
}

impl ParameterValues {
    /// Starts a fresh, fully-unbound set for `query`.
    #[must_use]
    pub fn new(query: &ParsedQuery) -> Self {
        Self {
            source: query.source.clone(),
            known: query.parameters.keys().cloned().collect(),
            values: BTreeMap::new(),
        }
    }

    /// Binds `name` to `value`. Fails if `name` was never referenced by the
    /// query this set was created for.
    pub fn set(&mut self, name: &str, value: SqlValue) -> Result<(), BindError> {
        if !self.known.contains(name) {
            return Err(BindError::UnknownParameter { name: name.to_string(), query: self.source.clone() });
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Lists the query's parameter names that still have no bound value.
    #[must_use]
    pub fn unbound_names(&self) -> Vec<String> {
        self.known.iter().filter(|name| !self.values.contains_key(*name)).cloned().collect()
    }

    /// Fails with [`BindError::UnboundParameters`] if any named parameter
    /// has not been [`Self::set`].
    pub fn check_all_bound(&self) -> Result<(), BindError> {
        let missing = self.unbound_names();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(BindError::UnboundParameters { names: missing })
        }
    }

    /// Binds every value into `writer` at its query-assigned positional
    /// index(es), after confirming nothing is left unbound.
    pub fn apply(&self, query: &ParsedQuery, writer: &mut dyn StatementWriter) -> Result<(), BindError> {
        self.check_all_bound()?;
        for (name, indices) in &query.parameters {
            let value = self.values.get(name).expect("check_all_bound just confirmed every name is bound");
            for &index in indices {
                writer.set_value(index, value.clone());
            }
        }
        Ok(())
    }
}
