//! Error types for sf-migrate

use serde::Serialize;
use sf_core::CoreError;
use sf_db::DbError;
use thiserror::Error;

/// Errors raised while evolving a table
#[derive(Error, Debug)]
pub enum EvolveError {
    /// M001: Table absent and creation not allowed
    #[error("[M001] Required table '{table}' does not exist")]
    TargetMissing { table: String },

    /// M002: Store unreachable; aborts the whole run
    #[error("[M002] Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    /// M003: The migration would break a constraint or a foreign key
    #[error("[M003] Integrity violation in '{table}': {message}")]
    IntegrityViolation { table: String, message: String },

    /// M004: The plan needs a strategy the options or store do not permit
    #[error("[M004] Unsupported change to '{table}': {message}")]
    UnsupportedStep { table: String, message: String },

    /// M005: A statement failed
    #[error("[M005] Migration of '{table}' failed: {source}")]
    Execution {
        table: String,
        #[source]
        source: DbError,
    },

    /// M006: Invalid declaration or dependency graph
    #[error("[M006] {0}")]
    Plan(#[from] CoreError),
}

/// Result type alias for EvolveError
pub type EvolveResult<T> = Result<T, EvolveError>;

/// Serializable error category reported per table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TargetMissing,
    StorageUnavailable,
    IntegrityViolation,
    UnsupportedStep,
    Execution,
    Plan,
}

impl EvolveError {
    /// Classify a store error raised while working on `table`
    pub fn from_db(table: &str, err: DbError) -> Self {
        match err {
            DbError::ConnectionError(message) => EvolveError::StorageUnavailable { message },
            DbError::IntegrityViolation(message) => EvolveError::IntegrityViolation {
                table: table.to_string(),
                message,
            },
            source => EvolveError::Execution {
                table: table.to_string(),
                source,
            },
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvolveError::TargetMissing { .. } => ErrorKind::TargetMissing,
            EvolveError::StorageUnavailable { .. } => ErrorKind::StorageUnavailable,
            EvolveError::IntegrityViolation { .. } => ErrorKind::IntegrityViolation,
            EvolveError::UnsupportedStep { .. } => ErrorKind::UnsupportedStep,
            EvolveError::Execution { .. } => ErrorKind::Execution,
            EvolveError::Plan(_) => ErrorKind::Plan,
        }
    }

    /// Whether the whole run must stop
    pub fn is_fatal(&self) -> bool {
        matches!(self, EvolveError::StorageUnavailable { .. })
    }
}
