//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use sf_core::{Backend, Config, DeclaredTable, TableDag, TableSpec};
use sf_db::{DuckDbStore, SchemaStore, SqliteStore};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that the store is closed before the process ends.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Empty: the command already reported what went wrong.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Loaded configuration and the directory it was read from
pub(crate) struct Project {
    pub(crate) config: Config,
    pub(crate) root: PathBuf,
}

impl Project {
    /// Database file to open: the `--database` override, else the configured path
    pub(crate) fn database_path(&self, global: &GlobalArgs) -> PathBuf {
        match &global.database {
            Some(path) => PathBuf::from(path),
            None => self.config.database_path(&self.root),
        }
    }
}

/// Load and validate the configuration named by `--config`
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let path = Path::new(&global.config);
    let config = Config::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    let root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    log::debug!(
        "Loaded '{}' with {} table(s) from {}",
        config.name,
        config.tables.len(),
        path.display()
    );
    Ok(Project { config, root })
}

/// Open the configured store
pub(crate) fn open_store(project: &Project, global: &GlobalArgs) -> Result<Box<dyn SchemaStore>> {
    let path = project.database_path(global);
    let create = project.config.database.create_if_missing;
    let backend = project.config.database.backend;

    let store: Box<dyn SchemaStore> = match backend {
        Backend::Sqlite => Box::new(
            SqliteStore::open(&path, create)
                .with_context(|| format!("Failed to open {} database {}", backend, path.display()))?,
        ),
        Backend::DuckDb => Box::new(
            DuckDbStore::open(&path, create)
                .with_context(|| format!("Failed to open {} database {}", backend, path.display()))?,
        ),
    };
    log::debug!("Opened {} database {}", backend, path.display());
    Ok(store)
}

/// Split a comma-separated list, dropping blanks
pub(crate) fn parse_list(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Declared tables in dependency order, narrowed to `selection` when given.
///
/// Each selection item is a table name, optionally prefixed with `+` to add
/// its parents or suffixed with `+` to add its children.
pub(crate) fn select_tables(config: &Config, selection: Option<&str>) -> Result<Vec<DeclaredTable>> {
    let declared = config.declared_tables();
    let specs: Vec<TableSpec> = declared.iter().map(|t| t.spec.clone()).collect();
    let dag = TableDag::build(&specs)?;

    let order = match selection {
        None => dag.topological_order()?,
        Some(list) => {
            let mut wanted = HashSet::new();
            for item in parse_list(list) {
                for name in dag.select(item)? {
                    wanted.insert(name.to_ascii_lowercase());
                }
            }
            dag.topological_order()?
                .into_iter()
                .filter(|t| wanted.contains(&t.to_ascii_lowercase()))
                .collect()
        }
    };

    Ok(order
        .iter()
        .filter_map(|name| declared.iter().find(|t| t.spec.name.matches(name)).cloned())
        .collect())
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
