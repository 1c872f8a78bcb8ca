//! Introspected structure of a physical table.
//!
//! A [`LiveSchema`] is produced by a store's inspector and consumed by the
//! planner. It is ephemeral: read fresh before every migration decision,
//! never cached, since the table may have changed by hand in between.

use serde::Serialize;
use std::collections::HashMap;

/// Foreign key as reported by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveForeignKey {
    /// Referenced table
    pub table: String,

    /// Referenced column; `None` when the store reports an implicit
    /// reference to the parent's primary key
    pub column: Option<String>,

    /// Delete action as reported (`NO ACTION`, `CASCADE`, ...)
    pub on_delete: Option<String>,
}

/// One column as it physically exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveColumn {
    pub name: String,
    pub data_type: String,
    pub not_null: bool,
    pub default: Option<String>,
    pub primary_key: bool,
    pub unique: bool,
    pub references: Option<LiveForeignKey>,
}

impl LiveColumn {
    /// A nullable column with no constraints
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            not_null: false,
            default: None,
            primary_key: false,
            unique: false,
            references: None,
        }
    }
}

/// Column set currently present in a physical table
#[derive(Debug, Clone, Serialize)]
pub struct LiveSchema {
    /// Table name as requested
    pub table: String,

    /// Whether the table exists at all
    pub exists: bool,

    /// Columns in physical order
    pub columns: Vec<LiveColumn>,

    /// Whether nullability, defaults, uniqueness and foreign keys were
    /// reported faithfully. When false only names and types can be compared.
    pub constraints_known: bool,

    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl LiveSchema {
    /// Schema of an existing table
    pub fn new(table: &str, columns: Vec<LiveColumn>, constraints_known: bool) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.to_ascii_lowercase(), i))
            .collect();
        Self {
            table: table.to_string(),
            exists: true,
            columns,
            constraints_known,
            index,
        }
    }

    /// Schema of a table that does not exist
    pub fn absent(table: &str) -> Self {
        Self {
            table: table.to_string(),
            exists: false,
            columns: Vec::new(),
            constraints_known: true,
            index: HashMap::new(),
        }
    }

    /// Look up a column by name (case-insensitive)
    pub fn column(&self, name: &str) -> Option<&LiveColumn> {
        self.index
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.columns[i])
    }

    /// Whether a column with this name exists
    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_ascii_lowercase())
    }

    /// Column names in physical order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// `(name, declared type)` pairs in physical order
    pub fn name_type_pairs(&self) -> Vec<(&str, &str)> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.data_type.as_str()))
            .collect()
    }
}
