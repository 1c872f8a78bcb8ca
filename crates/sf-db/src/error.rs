//! Error types for sf-db

use rusqlite::ErrorCode;
use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Store unreachable, unopenable or locked (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table not found: {0}")]
    TableNotFound(String),

    /// Constraint or foreign-key violation (D004)
    #[error("[D004] Integrity violation: {0}")]
    IntegrityViolation(String),

    /// Not implemented (D005)
    #[error("[D005] Feature not implemented for {backend}: {feature}")]
    NotImplemented { backend: String, feature: String },

    /// BEGIN/COMMIT failure (D006)
    #[error("[D006] Transaction failed: {0}")]
    TransactionError(String),

    /// Internal error (D007)
    #[error("[D007] Internal database error: {0}")]
    Internal(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Whether the store itself is unavailable, as opposed to one statement failing
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DbError::ConnectionError(_))
    }

    /// Attach the failing statement to execution errors
    pub fn with_statement(self, sql: &str) -> Self {
        match self {
            DbError::ExecutionError(msg) => DbError::ExecutionError(format!("{msg}: {sql}")),
            DbError::IntegrityViolation(msg) => {
                DbError::IntegrityViolation(format!("{msg}: {sql}"))
            }
            other => other,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        let msg = err.to_string();
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => DbError::IntegrityViolation(msg),
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::SystemIoFailure
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked,
            ) => DbError::ConnectionError(msg),
            _ if msg.starts_with("no such table") => DbError::TableNotFound(msg),
            _ => DbError::ExecutionError(msg),
        }
    }
}

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants, so errors are
        // classified by their message prefix.
        let msg = err.to_string();
        if msg.contains("Constraint Error") {
            DbError::IntegrityViolation(msg)
        } else if msg.contains("IO Error") || msg.contains("Could not set lock") {
            DbError::ConnectionError(msg)
        } else if msg.contains("Table with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not exist"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
