//! Per-table evolution options.

use crate::table_spec::TableSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller-supplied policy for evolving one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolveOptions {
    /// Drop live columns the declaration does not mention. Off by default: unknown
    /// columns are preserved through any rebuild.
    #[serde(default)]
    pub allow_drop: bool,

    /// Former names of a column, keyed by the declared (new) name
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,

    /// SQL expressions used to populate a column that is renamed in or added,
    /// evaluated against the original table's rows
    #[serde(default)]
    pub fallbacks: BTreeMap<String, String>,

    /// Treat an absent table as a failure instead of creating it
    #[serde(default)]
    pub require_existing: bool,

    /// Use `ALTER TABLE ADD COLUMN` when a plan only adds eligible columns
    #[serde(default = "default_true")]
    pub in_place_additions: bool,

    /// Permit the shadow-table rebuild strategy
    #[serde(default = "default_true")]
    pub shadow_rebuild: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EvolveOptions {
    fn default() -> Self {
        Self {
            allow_drop: false,
            aliases: BTreeMap::new(),
            fallbacks: BTreeMap::new(),
            require_existing: false,
            in_place_additions: true,
            shadow_rebuild: true,
        }
    }
}

impl EvolveOptions {
    /// Declare that `new_name` used to be called `old_name`
    pub fn with_alias(mut self, new_name: &str, old_name: &str) -> Self {
        self.aliases
            .entry(new_name.to_string())
            .or_default()
            .push(old_name.to_string());
        self
    }

    /// Populate `column` from `expression` when it is renamed in or added
    pub fn with_fallback(mut self, column: &str, expression: &str) -> Self {
        self.fallbacks
            .insert(column.to_string(), expression.to_string());
        self
    }

    /// Allow dropping columns absent from the declaration
    pub fn allowing_drop(mut self) -> Self {
        self.allow_drop = true;
        self
    }

    /// Fail when the table does not exist
    pub fn requiring_existing(mut self) -> Self {
        self.require_existing = true;
        self
    }

    /// Former names declared for `column` (case-insensitive key lookup)
    pub fn aliases_for(&self, column: &str) -> &[String] {
        self.aliases
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(column))
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    /// Fallback expression declared for `column` (case-insensitive key lookup)
    pub fn fallback_for(&self, column: &str) -> Option<&str> {
        self.fallbacks
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(column))
            .map(|(_, v)| v.as_str())
    }
}

/// A table declaration together with the options used to evolve it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredTable {
    pub spec: TableSpec,
    pub options: EvolveOptions,
}

impl DeclaredTable {
    pub fn new(spec: TableSpec, options: EvolveOptions) -> Self {
        Self { spec, options }
    }
}
