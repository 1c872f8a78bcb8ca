//! Per-table results

use crate::error::{ErrorKind, EvolveError};
use serde::Serialize;
use sf_core::plan::{MigrationStep, Strategy};
use std::fmt;

/// Final state of one table after a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Unchanged,
    Created,
    Modified,
    Failed,
    Skipped,
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableStatus::Unchanged => write!(f, "unchanged"),
            TableStatus::Created => write!(f, "created"),
            TableStatus::Modified => write!(f, "modified"),
            TableStatus::Failed => write!(f, "failed"),
            TableStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// What [`evolve`](crate::executor::evolve) did to a table
#[derive(Debug, Clone, Serialize)]
pub struct EvolveOutcome {
    pub table: String,
    pub status: TableStatus,
    pub strategy: Strategy,
    pub steps_applied: Vec<MigrationStep>,

    /// Live columns kept although the declaration does not mention them
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preserved_columns: Vec<String>,
}

impl EvolveOutcome {
    /// One-line description for logs and text output
    pub fn summary_line(&self) -> String {
        match (self.status, self.strategy) {
            (TableStatus::Created, _) => "created".to_string(),
            (TableStatus::Modified, Strategy::InPlace) => {
                let added: Vec<String> = self
                    .steps_applied
                    .iter()
                    .filter_map(|s| match s {
                        MigrationStep::AddColumn { name, .. } => Some(name.to_string()),
                        _ => None,
                    })
                    .collect();
                format!("columns added: [{}]", added.join(", "))
            }
            (TableStatus::Modified, _) => {
                let changes: Vec<String> =
                    self.steps_applied.iter().map(MigrationStep::describe).collect();
                format!("rebuilt with changes: [{}]", changes.join(", "))
            }
            (status, _) => status.to_string(),
        }
    }
}

/// Structured result of one table in a run
#[derive(Debug, Clone, Serialize)]
pub struct TableResult {
    pub table: String,
    pub status: TableStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,

    pub steps_applied: Vec<MigrationStep>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preserved_columns: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,

    /// Parent table whose failure prevented this one from running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<String>,
}

impl TableResult {
    /// Result of a table that was evolved
    pub fn from_outcome(outcome: EvolveOutcome) -> Self {
        Self {
            table: outcome.table,
            status: outcome.status,
            strategy: Some(outcome.strategy),
            steps_applied: outcome.steps_applied,
            preserved_columns: outcome.preserved_columns,
            error: None,
            error_kind: None,
            blocked_by: None,
        }
    }

    /// Result of a table whose migration failed
    pub fn failed(table: &str, err: &EvolveError) -> Self {
        Self {
            table: table.to_string(),
            status: TableStatus::Failed,
            strategy: None,
            steps_applied: Vec::new(),
            preserved_columns: Vec::new(),
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
            blocked_by: None,
        }
    }

    /// Result of a table not attempted because a parent did not succeed
    pub fn skipped(table: &str, parent: &str, reason: &str) -> Self {
        Self {
            table: table.to_string(),
            status: TableStatus::Skipped,
            strategy: None,
            steps_applied: Vec::new(),
            preserved_columns: Vec::new(),
            error: Some(reason.to_string()),
            error_kind: None,
            blocked_by: Some(parent.to_string()),
        }
    }

    /// Whether dependents of this table may run
    pub fn succeeded(&self) -> bool {
        !matches!(self.status, TableStatus::Failed | TableStatus::Skipped)
    }

    /// One-line description for logs and text output
    pub fn summary_line(&self) -> String {
        match self.status {
            TableStatus::Failed => format!(
                "failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            ),
            TableStatus::Skipped => format!(
                "skipped: {}",
                self.error.as_deref().unwrap_or("parent did not succeed")
            ),
            status => EvolveOutcome {
                table: self.table.clone(),
                status,
                strategy: self.strategy.unwrap_or(Strategy::Unchanged),
                steps_applied: self.steps_applied.clone(),
                preserved_columns: Vec::new(),
            }
            .summary_line(),
        }
    }
}
