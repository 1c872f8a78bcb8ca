//! Check command implementation

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::{CheckArgs, GlobalArgs, OutputFormat};
use crate::commands::common::{self, ExitCode};

/// Foreign-key integrity of one table
#[derive(Debug, Serialize)]
struct TableCheck {
    table: String,
    violations: Vec<Violation>,
}

#[derive(Debug, Serialize)]
struct Violation {
    #[serde(skip_serializing_if = "Option::is_none")]
    rowid: Option<i64>,
    parent: String,
}

/// Execute the check command
pub(crate) fn execute(args: &CheckArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;
    let store = common::open_store(&project, global)?;

    let live_tables = store.list_tables().context("Failed to list tables")?;
    let tables: Vec<String> = match args.tables.as_deref() {
        None => live_tables,
        Some(list) => {
            let mut out = Vec::new();
            for name in common::parse_list(list) {
                match live_tables.iter().find(|t| t.eq_ignore_ascii_case(name)) {
                    Some(t) => out.push(t.clone()),
                    None => anyhow::bail!("Table '{}' does not exist", name),
                }
            }
            out
        }
    };

    let mut checks = Vec::with_capacity(tables.len());
    for table in tables {
        let violations = store
            .foreign_key_violations(&table)
            .with_context(|| format!("Failed to check foreign keys of '{}'", table))?
            .into_iter()
            .map(|v| Violation {
                rowid: v.rowid,
                parent: v.parent,
            })
            .collect();
        checks.push(TableCheck { table, violations });
    }

    match args.output {
        OutputFormat::Text => print_text(&checks),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&checks).context("Failed to serialize")?;
            println!("{}", json);
        }
    }

    if checks.iter().any(|c| !c.violations.is_empty()) {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn print_text(checks: &[TableCheck]) {
    for check in checks {
        if check.violations.is_empty() {
            println!("{}: ok", check.table);
            continue;
        }
        println!(
            "{}: {} row(s) reference missing parents",
            check.table,
            check.violations.len()
        );
        for v in &check.violations {
            match v.rowid {
                Some(rowid) => println!("  rowid {} -> {}", rowid, v.parent),
                None => println!("  (no rowid) -> {}", v.parent),
            }
        }
    }

    let failing = checks.iter().filter(|c| !c.violations.is_empty()).count();
    println!();
    if failing == 0 {
        println!("{} table(s) checked, no violations", checks.len());
    } else {
        println!("{} of {} table(s) have violations", failing, checks.len());
    }
}
