//! Run report for a batch of tables

use crate::outcome::{TableResult, TableStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Counts of table results by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub unchanged: usize,
    pub created: usize,
    pub modified: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    /// Total number of tables
    pub fn total(&self) -> usize {
        self.unchanged + self.created + self.modified + self.failed + self.skipped
    }
}

/// Outcome of one orchestrated run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Short unique identifier for this run
    pub run_id: String,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Results in execution order
    pub results: Vec<TableResult>,

    pub summary: RunSummary,
}

impl RunReport {
    /// Start a new, empty report
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string()[..8].to_string(),
            started_at: Utc::now(),
            finished_at: None,
            results: Vec::new(),
            summary: RunSummary::default(),
        }
    }

    /// Record a table result
    pub fn push(&mut self, result: TableResult) {
        match result.status {
            TableStatus::Unchanged => self.summary.unchanged += 1,
            TableStatus::Created => self.summary.created += 1,
            TableStatus::Modified => self.summary.modified += 1,
            TableStatus::Failed => self.summary.failed += 1,
            TableStatus::Skipped => self.summary.skipped += 1,
        }
        self.results.push(result);
    }

    /// Mark the run finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Result for a table (case-insensitive)
    pub fn result(&self, table: &str) -> Option<&TableResult> {
        self.results
            .iter()
            .find(|r| r.table.eq_ignore_ascii_case(table))
    }

    /// Whether any table failed
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }

    /// Process exit status: nonzero iff a table failed
    pub fn exit_code(&self) -> i32 {
        if self.has_failures() {
            1
        } else {
            0
        }
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
