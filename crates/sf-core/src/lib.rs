//! sf-core - Core library for Schemaforge
//!
//! This crate provides the declarative table model, introspected live
//! schemas, the delta planner, the foreign-key dependency DAG and
//! configuration parsing used across all Schemaforge components.

pub mod column_name;
pub mod config;
pub mod dag;
pub mod error;
pub mod live;
mod newtype_string;
pub mod options;
pub mod plan;
pub mod sql_utils;
pub mod table_name;
pub mod table_spec;

pub use column_name::ColumnName;
pub use config::{Backend, Config, DatabaseConfig};
pub use dag::TableDag;
pub use error::{CoreError, CoreResult};
pub use live::{LiveColumn, LiveForeignKey, LiveSchema};
pub use options::{DeclaredTable, EvolveOptions};
pub use plan::{plan_table, CopyEntry, CopyMapping, CopySource, MigrationPlan, MigrationStep, Strategy};
pub use table_name::TableName;
pub use table_spec::{ColumnSpec, ForeignKeyRef, TableSpec};
