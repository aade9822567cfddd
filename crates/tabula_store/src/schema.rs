//! Table schema definitions.

use serde::{Deserialize, Serialize};

/// Definition of a single (non-key) column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Whether NULL values are rejected.
    pub not_null: bool,
    /// Whether values must be unique across rows.
    pub unique: bool,
}

impl ColumnDef {
    /// Creates a nullable, non-unique column definition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            not_null: false,
            unique: false,
        }
    }

    /// Marks the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Marks the column as UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Schema for one table.
///
/// Every table has an integer primary key (named `id` unless overridden)
/// that is auto-assigned on insert, starting at 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Primary key column name.
    pub primary_key: String,
    /// Non-key columns.
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Creates a schema with the default `id` primary key and no columns.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: "id".to_string(),
            columns: Vec::new(),
        }
    }

    /// Overrides the primary key column name.
    #[must_use]
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key = name.into();
        self
    }

    /// Adds a column definition.
    #[must_use]
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Looks up a column definition by name.
    #[must_use]
    pub fn column_def(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Checks whether `name` is the primary key or a defined column.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.primary_key == name || self.column_def(name).is_some()
    }
}
