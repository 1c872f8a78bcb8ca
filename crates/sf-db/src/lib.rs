//! sf-db - Storage layer for Schemaforge
//!
//! This crate provides the `SchemaStore` trait (the schema inspector and the
//! statement surface the executor drives), dialect-aware DDL rendering, and
//! implementations for SQLite and DuckDB.

pub mod ddl;
pub mod duckdb;
pub mod error;
pub mod sqlite;
pub mod traits;
pub mod transaction;

pub use ddl::{sequence_name, shadow_name, SqlDialect, SHADOW_PREFIX};
pub use duckdb::DuckDbStore;
pub use error::{DbError, DbResult};
pub use sqlite::SqliteStore;
pub use traits::{ForeignKeyViolation, IndexDefinition, SchemaStore};
pub use transaction::with_transaction;
