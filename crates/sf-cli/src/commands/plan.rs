//! Plan command implementation (dry run)

use anyhow::{Context, Result};
use serde::Serialize;
use sf_core::plan::{MigrationStep, Strategy};
use sf_migrate::{plan_only, ErrorKind};

use crate::cli::{GlobalArgs, OutputFormat, PlanArgs};
use crate::commands::common::{self, ExitCode};

/// Planned work for one table
#[derive(Debug, Serialize)]
struct TablePlan {
    table: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    strategy: Option<Strategy>,

    steps: Vec<MigrationStep>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    preserved_columns: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    statements: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<ErrorKind>,
}

/// Execute the plan command
pub(crate) fn execute(args: &PlanArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;
    let tables = common::select_tables(&project.config, args.tables.as_deref())?;
    let store = common::open_store(&project, global)?;

    let mut plans = Vec::with_capacity(tables.len());
    for declared in &tables {
        let table = declared.spec.name.to_string();
        let entry = match plan_only(store.as_ref(), &declared.spec, &declared.options) {
            Ok(planned) => TablePlan {
                table,
                strategy: Some(planned.plan.strategy),
                steps: planned.plan.steps,
                preserved_columns: planned.plan.preserved_columns,
                statements: if args.sql || args.output == OutputFormat::Json {
                    planned.statements
                } else {
                    Vec::new()
                },
                error: None,
                error_kind: None,
            },
            Err(e) if e.is_fatal() => return Err(e).context("Planning aborted"),
            Err(e) => TablePlan {
                table,
                strategy: None,
                steps: Vec::new(),
                preserved_columns: Vec::new(),
                statements: Vec::new(),
                error: Some(e.to_string()),
                error_kind: Some(e.kind()),
            },
        };
        plans.push(entry);
    }

    match args.output {
        OutputFormat::Text => print_text(&plans),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&plans).context("Failed to serialize plans")?;
            println!("{}", json);
        }
    }

    if plans.iter().any(|p| p.error.is_some()) {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn print_text(plans: &[TablePlan]) {
    let mut pending = 0;
    for plan in plans {
        match (&plan.error, plan.strategy) {
            (Some(error), _) => println!("{}: error: {}", plan.table, error),
            (None, Some(Strategy::Unchanged)) | (None, None) => {
                println!("{}: unchanged", plan.table)
            }
            (None, Some(strategy)) => {
                pending += 1;
                println!("{}: {}", plan.table, strategy);
                for step in &plan.steps {
                    println!("  - {}", step);
                }
                if !plan.preserved_columns.is_empty() {
                    println!("  preserved: {}", plan.preserved_columns.join(", "));
                }
                for sql in &plan.statements {
                    println!();
                    println!("{};", sql);
                }
            }
        }
    }
    println!();
    println!("{} of {} table(s) need changes", pending, plans.len());
}
