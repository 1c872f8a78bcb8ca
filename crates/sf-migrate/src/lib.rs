//! sf-migrate - Migration executor and orchestrator for Schemaforge
//!
//! [`evolve`] brings a single table to its declaration; [`evolve_all`] runs
//! a set of declared tables in foreign-key dependency order and collects a
//! [`RunReport`].

pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod outcome;
pub mod report;

pub use error::{ErrorKind, EvolveError, EvolveResult};
pub use executor::{evolve, plan_only, PlannedTable};
pub use orchestrator::evolve_all;
pub use outcome::{EvolveOutcome, TableResult, TableStatus};
pub use report::{RunReport, RunSummary};
