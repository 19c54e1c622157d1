//! Static description of a filterable entity table
//!
//! Clause builders never interpolate caller-supplied identifiers: relation
//! names, is-missing fields and sort keys are all resolved against an
//! [`EntityDef`] first.

use crate::error::{CatalogError, Result};

/// How an entity row points at a related entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationLink {
    /// Foreign key column on the entity table itself
    Column(&'static str),
    /// Many-to-many join table
    JoinTable {
        table: &'static str,
        /// Column referencing the entity's id
        owner_column: &'static str,
        /// Column referencing the related id
        target_column: &'static str,
    },
}

/// A relation that multi-value criteria may target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub name: &'static str,
    pub link: RelationLink,
    /// LEFT JOIN that exposes `key` in the query body
    pub join: &'static str,
    /// Related id column, valid once `join` is part of the body
    pub key: &'static str,
}

/// A derived "is missing" condition with its own join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingField {
    pub name: &'static str,
    pub join: &'static str,
    /// Column that is NULL when the field is missing
    pub column: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDef {
    /// The SQL table name, also used to qualify columns
    pub table: &'static str,
    /// Human-readable name used in errors
    pub entity_name: &'static str,
    /// Every column of the table
    pub columns: &'static [&'static str],
    /// Text columns matched by free-text search
    pub search_columns: &'static [&'static str],
    /// Columns accepted as sort keys
    pub sortable: &'static [&'static str],
    /// Sort key used when none (or an unknown one) is given
    pub default_sort: &'static str,
    /// Sort keys that use natural ordering
    pub natural_sort: &'static [&'static str],
    pub relations: &'static [Relation],
    pub missing_fields: &'static [MissingField],
}

impl EntityDef {
    /// Look up a relation by name; unknown names are a configuration error
    pub fn relation(&self, name: &str) -> Result<&Relation> {
        self.relations
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| {
                CatalogError::configuration(format!(
                    "unknown relation `{name}` for {}",
                    self.entity_name
                ))
            })
    }

    pub fn missing_field(&self, name: &str) -> Option<&MissingField> {
        self.missing_fields.iter().find(|f| f.name == name)
    }

    /// The static column name matching `name`, if it is a column of this table
    pub fn column(&self, name: &str) -> Option<&'static str> {
        self.columns.iter().copied().find(|c| *c == name)
    }

    /// `<table>.<column>`
    pub fn qualified(&self, column: &str) -> String {
        format!("{}.{}", self.table, column)
    }
}
