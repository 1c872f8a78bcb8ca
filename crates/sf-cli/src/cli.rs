//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Schemaforge - bring live tables to their declared structure without losing data
#[derive(Parser, Debug)]
#[command(name = "sf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output (logs every statement)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the table declarations
    #[arg(short, long, global = true, default_value = "schemaforge.yml")]
    pub config: String,

    /// Override the database file from the config
    #[arg(short, long, global = true, env = "SF_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bring every declared table to spec, parents first
    Evolve(EvolveArgs),

    /// Show the steps and statements a run would apply, without applying them
    Plan(PlanArgs),

    /// List tables, or show one table's live structure
    Inspect(InspectArgs),

    /// Report rows whose foreign keys point at missing parents
    Check(CheckArgs),
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

/// Arguments for the evolve command
#[derive(Args, Debug)]
pub struct EvolveArgs {
    /// Tables to evolve (comma-separated; `+table` adds parents, `table+` adds children)
    #[arg(short, long)]
    pub tables: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Tables to plan (comma-separated; `+table` adds parents, `table+` adds children)
    #[arg(short, long)]
    pub tables: Option<String>,

    /// Print the SQL statements of each plan
    #[arg(long)]
    pub sql: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Table to show; lists all tables when omitted
    pub table: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Tables to check (comma-separated, default: every table in the database)
    #[arg(short, long)]
    pub tables: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
