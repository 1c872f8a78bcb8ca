//! Configuration types and parsing for schemaforge.yml

use crate::dag::TableDag;
use crate::error::{CoreError, CoreResult};
use crate::options::{DeclaredTable, EvolveOptions};
use crate::table_name::TableName;
use crate::table_spec::{ColumnSpec, TableSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "schemaforge.yml";

/// Main configuration from schemaforge.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Store to evolve
    pub database: DatabaseConfig,

    /// Options applied to every table unless overridden
    #[serde(default)]
    pub defaults: EvolveDefaults,

    /// Declared tables
    pub tables: Vec<TableConfig>,
}

/// Storage backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// SQLite file
    #[default]
    Sqlite,
    /// DuckDB file
    DuckDb,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Sqlite => write!(f, "sqlite"),
            Backend::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Backend type
    #[serde(default)]
    pub backend: Backend,

    /// Database file path, relative to the config file's directory
    pub path: String,

    /// Create the file when it does not exist. When false a missing file is
    /// reported as unavailable storage.
    #[serde(default)]
    pub create_if_missing: bool,
}

/// Default per-table options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvolveDefaults {
    #[serde(default)]
    pub allow_drop: bool,

    #[serde(default = "default_true")]
    pub in_place_additions: bool,

    #[serde(default = "default_true")]
    pub shadow_rebuild: bool,

    #[serde(default)]
    pub require_existing: bool,
}

impl Default for EvolveDefaults {
    fn default() -> Self {
        Self {
            allow_drop: false,
            in_place_additions: true,
            shadow_rebuild: true,
            require_existing: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// One declared table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    pub name: TableName,

    /// The table must already exist; it is never created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_drop: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_place_additions: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_rebuild: Option<bool>,

    pub columns: Vec<ColumnConfig>,
}

/// One declared column plus its migration hints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnConfig {
    #[serde(flatten)]
    pub spec: ColumnSpec,

    /// Former names of the column
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub renamed_from: Vec<String>,

    /// Expression populating the column when it is renamed in or added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::parse(&content)?;
        log::debug!(
            "Loaded config '{}' with {} table(s) from {}",
            config.name,
            config.tables.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn parse(content: &str) -> CoreResult<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }
        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }
        if self.tables.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "At least one table must be declared".to_string(),
            });
        }

        for table in &self.tables {
            for column in &table.columns {
                if column.renamed_from.iter().any(|n| n.trim().is_empty()) {
                    return Err(CoreError::SpecInvalid {
                        table: table.name.to_string(),
                        message: format!("column '{}' has an empty former name", column.spec.name),
                    });
                }
                if column.fallback.as_deref().is_some_and(|f| f.trim().is_empty()) {
                    return Err(CoreError::SpecInvalid {
                        table: table.name.to_string(),
                        message: format!("column '{}' has an empty fallback", column.spec.name),
                    });
                }
            }
        }

        let specs: Vec<TableSpec> = self.tables.iter().map(TableConfig::spec).collect();
        for spec in &specs {
            spec.validate()?;
        }
        TableDag::build(&specs)?;

        Ok(())
    }

    /// Absolute database path, resolving a relative path against `config_dir`
    pub fn database_path(&self, config_dir: &Path) -> PathBuf {
        let path = Path::new(&self.database.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            config_dir.join(path)
        }
    }

    /// Look up a declared table (case-insensitive)
    pub fn table(&self, name: &str) -> Option<&TableConfig> {
        self.tables.iter().find(|t| t.name.matches(name))
    }

    /// Table specs with their effective options, in declaration order
    pub fn declared_tables(&self) -> Vec<DeclaredTable> {
        self.tables
            .iter()
            .map(|t| DeclaredTable::new(t.spec(), t.options(&self.defaults)))
            .collect()
    }
}

impl TableConfig {
    /// The declared structure of this table
    pub fn spec(&self) -> TableSpec {
        TableSpec {
            name: self.name.clone(),
            columns: self.columns.iter().map(|c| c.spec.clone()).collect(),
        }
    }

    /// Effective options: table overrides on top of `defaults`
    pub fn options(&self, defaults: &EvolveDefaults) -> EvolveOptions {
        let mut aliases = BTreeMap::new();
        let mut fallbacks = BTreeMap::new();
        for column in &self.columns {
            if !column.renamed_from.is_empty() {
                aliases.insert(column.spec.name.to_string(), column.renamed_from.clone());
            }
            if let Some(expr) = &column.fallback {
                fallbacks.insert(column.spec.name.to_string(), expr.clone());
            }
        }
        EvolveOptions {
            allow_drop: self.allow_drop.unwrap_or(defaults.allow_drop),
            aliases,
            fallbacks,
            require_existing: self.required.unwrap_or(defaults.require_existing),
            in_place_additions: self
                .in_place_additions
                .unwrap_or(defaults.in_place_additions),
            shadow_rebuild: self.shadow_rebuild.unwrap_or(defaults.shadow_rebuild),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
