//! Evolve command implementation

use anyhow::{Context, Result};
use sf_migrate::{evolve_all, RunReport};

use crate::cli::{EvolveArgs, GlobalArgs, OutputFormat};
use crate::commands::common::{self, ExitCode};

/// Execute the evolve command
pub(crate) fn execute(args: &EvolveArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;
    let tables = common::select_tables(&project.config, args.tables.as_deref())?;
    let store = common::open_store(&project, global)?;

    let report = evolve_all(store.as_ref(), &tables).context("Run aborted")?;

    match args.output {
        OutputFormat::Text => print_text(&report),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{}", json);
        }
    }

    if report.has_failures() {
        return Err(ExitCode(report.exit_code()).into());
    }
    Ok(())
}

fn print_text(report: &RunReport) {
    let name_width = report
        .results
        .iter()
        .map(|r| r.table.len())
        .max()
        .unwrap_or(5)
        .max(5);

    println!("Run {}", report.run_id);
    println!();
    for result in &report.results {
        println!(
            "  {:<name_width$}  {}",
            result.table,
            result.summary_line(),
            name_width = name_width
        );
    }
    println!();

    let s = &report.summary;
    println!(
        "{} table(s): {} unchanged, {} created, {} modified, {} failed, {} skipped",
        s.total(),
        s.unchanged,
        s.created,
        s.modified,
        s.failed,
        s.skipped
    );
}
