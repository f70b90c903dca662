//! The ORM-metadata collaborator contract (spec.md §6).
//!
//! This core never stores entity or table layout itself — it resolves OQL
//! entity and property names against whatever implements [`Schema`]. A
//! small in-memory implementation, [`StaticSchema`], is provided for tests
//! and for callers happy to describe entities as plain Rust data.

use std::sync::Arc;

/// Shared handle to a resolved entity. Cheap to clone; embedded properties
/// recurse through further `EntityRef`s, so cloning never deep-copies.
pub type EntityRef = Arc<EntityDescriptor>;

/// Shared handle to a resolved property, cloned alongside its owning entity.
pub type PropertyRef = Arc<PropertyDescriptor>;

/// Looks up entities by the name written in OQL source.
///
/// This is the one collaborator the core depends on for FROM-clause
/// resolution; annotation scanning, connection management, and result-set
/// hydration are all out of scope (spec.md §1) and live entirely on the
/// caller's side of this trait.
pub trait Schema {
    /// Resolves an entity by its OQL name. Matching is exact (case-
    /// sensitive); spec.md does not ask for entity-name case folding, only
    /// keyword case folding.
    fn find_entity(&self, name: &str) -> Option<EntityRef>;
}

/// Table/column metadata for one entity, as handed back by [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    pub name: String,
    pub table_name: String,
    pub properties: Vec<PropertyRef>,
}

impl EntityDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, table_name: impl Into<String>, properties: Vec<PropertyRef>) -> Self {
        Self { name: name.into(), table_name: table_name.into(), properties }
    }

    #[must_use]
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn property_at(&self, i: usize) -> Option<&PropertyRef> {
        self.properties.get(i)
    }

    #[must_use]
    pub fn find_property(&self, name: &str) -> Option<&PropertyRef> {
        self.properties.iter().find(|p| p.property_name == name)
    }
}

/// A single column (or embedded composite) of an [`EntityDescriptor`].
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub property_name: String,
    pub column_name: String,
    pub is_embedded: bool,
    /// Only meaningful when `is_embedded` is true (spec.md §6).
    pub referenced_entity: Option<EntityRef>,
}

impl PropertyDescriptor {
    #[must_use]
    pub fn column(property_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            column_name: column_name.into(),
            is_embedded: false,
            referenced_entity: None,
        }
    }

    #[must_use]
    pub fn embedded(property_name: impl Into<String>, referenced_entity: EntityRef) -> Self {
        Self {
            property_name: property_name.into(),
            column_name: String::new(),
            is_embedded: true,
            referenced_entity: Some(referenced_entity),
        }
    }
}

/// An in-memory [`Schema`] backed by a plain `Vec`, for tests and simple
/// callers who don't want to implement the trait themselves.
#[derive(Debug, Default, Clone)]
pub struct StaticSchema {
    entities: Vec<EntityRef>,
}

impl StaticSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entity(mut self, entity: EntityDescriptor) -> Self {
        self.entities.push(Arc::new(entity));
        self
    }
}

impl Schema for StaticSchema {
    fn find_entity(&self, name: &str) -> Option<EntityRef> {
        self.entities.iter().find(|e| e.name == name).cloned()
    }
}
