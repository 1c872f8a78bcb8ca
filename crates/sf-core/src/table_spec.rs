//! Declarative table definitions.
//!
//! A [`TableSpec`] is the target structure a live table is evolved towards.
//! It is declared once by the calling application (usually through the YAML
//! config) and never derived from the database.

use crate::column_name::ColumnName;
use crate::error::{CoreError, CoreResult};
use crate::sql_utils::is_integer_type;
use crate::table_name::TableName;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Foreign key target of a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForeignKeyRef {
    /// Referenced table
    pub table: TableName,

    /// Referenced column
    pub column: ColumnName,

    /// Action on parent delete (`CASCADE`, `SET NULL`, ...). `None` means the
    /// store's default (`NO ACTION`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
}

impl ForeignKeyRef {
    /// Create a reference with the store's default delete action
    pub fn new(table: &str, column: &str) -> Self {
        Self {
            table: TableName::new(table),
            column: ColumnName::new(column),
            on_delete: None,
        }
    }
}

/// Declared column of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name
    pub name: ColumnName,

    /// Declared SQL type
    #[serde(rename = "type")]
    pub data_type: String,

    /// Whether NULL values are allowed
    #[serde(default = "default_nullable")]
    pub nullable: bool,

    /// Default value as a SQL expression (e.g. `'Programada'`, `0`, `CURRENT_TIMESTAMP`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Auto-incrementing integer primary key
    #[serde(default)]
    pub primary_key: bool,

    /// Single-column uniqueness constraint
    #[serde(default)]
    pub unique: bool,

    /// Foreign key target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<ForeignKeyRef>,
}

fn default_nullable() -> bool {
    true
}

impl ColumnSpec {
    /// Create a nullable column with no constraints
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: ColumnName::new(name),
            data_type: data_type.to_string(),
            nullable: true,
            default: None,
            primary_key: false,
            unique: false,
            references: None,
        }
    }

    /// Create an integer primary key column
    pub fn primary_key(name: &str) -> Self {
        Self {
            primary_key: true,
            nullable: false,
            ..Self::new(name, "INTEGER")
        }
    }

    /// Mark the column `NOT NULL`
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Set the default expression
    pub fn with_default(mut self, expr: &str) -> Self {
        self.default = Some(expr.to_string());
        self
    }

    /// Mark the column `UNIQUE`
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Add a foreign key to `table(column)`
    pub fn references(mut self, table: &str, column: &str) -> Self {
        self.references = Some(ForeignKeyRef::new(table, column));
        self
    }
}

/// Declared structure of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Table name
    pub name: TableName,

    /// Ordered column definitions
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    /// Create a spec from a name and ordered columns
    pub fn new(name: &str, columns: Vec<ColumnSpec>) -> Self {
        Self {
            name: TableName::new(name),
            columns,
        }
    }

    /// Find a column by name (case-insensitive)
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name.matches(name))
    }

    /// Whether the table declares a column with this name
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// The primary key column, if any
    pub fn primary_key(&self) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Tables this table references through foreign keys, excluding itself
    pub fn referenced_tables(&self) -> Vec<&TableName> {
        let mut seen = HashSet::new();
        self.columns
            .iter()
            .filter_map(|c| c.references.as_ref())
            .map(|fk| &fk.table)
            .filter(|t| !t.matches(&self.name))
            .filter(|t| seen.insert(*t))
            .collect()
    }

    /// Check the structural invariants of the definition
    pub fn validate(&self) -> CoreResult<()> {
        if self.columns.is_empty() {
            return Err(self.invalid("at least one column is required"));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.to_ascii_lowercase()) {
                return Err(CoreError::DuplicateColumn {
                    table: self.name.to_string(),
                    column: column.name.to_string(),
                });
            }
            if column.data_type.trim().is_empty() {
                return Err(self.invalid(&format!("column '{}' has no type", column.name)));
            }
        }

        let pk_columns: Vec<&ColumnSpec> =
            self.columns.iter().filter(|c| c.primary_key).collect();
        if pk_columns.len() > 1 {
            return Err(self.invalid("at most one primary key column is allowed"));
        }
        if let Some(pk) = pk_columns.first() {
            if !is_integer_type(&pk.data_type) {
                return Err(self.invalid(&format!(
                    "primary key '{}' must be an integer column, found '{}'",
                    pk.name, pk.data_type
                )));
            }
            if pk.references.is_some() {
                return Err(self.invalid(&format!(
                    "primary key '{}' cannot reference another table",
                    pk.name
                )));
            }
        }

        Ok(())
    }

    fn invalid(&self, message: &str) -> CoreError {
        CoreError::SpecInvalid {
            table: self.name.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "table_spec_test.rs"]
mod tests;
