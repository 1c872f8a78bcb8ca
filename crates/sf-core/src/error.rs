//! Error types for sf-core

use thiserror::Error;

/// Core error type for Schemaforge
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Table definition violates a structural rule
    #[error("[E004] Invalid spec for table '{table}': {message}")]
    SpecInvalid { table: String, message: String },

    /// E005: Same table declared twice
    #[error("[E005] Duplicate table: {name}")]
    DuplicateTable { name: String },

    /// E006: Same column declared twice in one table
    #[error("[E006] Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// E007: Circular foreign-key dependency between declared tables
    #[error("[E007] Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// E008: Table selected but never declared
    #[error("[E008] Table not declared: {name}")]
    UnknownTable { name: String },

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context
    #[error("[E016] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E015: YAML parse error
    #[error("[E015] Schema parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
