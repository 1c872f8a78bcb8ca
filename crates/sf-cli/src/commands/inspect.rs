//! Inspect command implementation

use anyhow::{Context, Result};
use sf_core::LiveSchema;

use crate::cli::{GlobalArgs, InspectArgs, OutputFormat};
use crate::commands::common::{self, ExitCode};

/// Execute the inspect command
pub(crate) fn execute(args: &InspectArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;
    let store = common::open_store(&project, global)?;

    let Some(table) = &args.table else {
        let tables = store.list_tables().context("Failed to list tables")?;
        match args.output {
            OutputFormat::Text => {
                for t in &tables {
                    println!("{}", t);
                }
                println!();
                println!("{} table(s)", tables.len());
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tables)?),
        }
        return Ok(());
    };

    let live = store
        .inspect(table)
        .with_context(|| format!("Failed to inspect table '{}'", table))?;
    if !live.exists {
        eprintln!("Table '{}' does not exist", table);
        return Err(ExitCode(1).into());
    }

    match args.output {
        OutputFormat::Text => print_text(&live),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&live)?),
    }
    Ok(())
}

fn print_text(live: &LiveSchema) {
    let name_width = live
        .columns
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(4)
        .max(4);
    let type_width = live
        .columns
        .iter()
        .map(|c| c.data_type.len())
        .max()
        .unwrap_or(4)
        .max(4);

    println!("{}", live.table);
    println!();
    println!(
        "{:<name_width$}  {:<type_width$}  {:<8}  {:<4}  DEFAULT",
        "NAME",
        "TYPE",
        "NULL",
        "KEY",
        name_width = name_width,
        type_width = type_width
    );
    println!(
        "{:-<name_width$}  {:-<type_width$}  {:-<8}  {:-<4}  {}",
        "",
        "",
        "",
        "",
        "-".repeat(20),
        name_width = name_width,
        type_width = type_width
    );

    for col in &live.columns {
        let key = match (col.primary_key, &col.references) {
            (true, _) => "PK",
            (false, Some(_)) => "FK",
            (false, None) if col.unique => "UQ",
            _ => "",
        };
        let null = if col.not_null { "NOT NULL" } else { "" };
        println!(
            "{:<name_width$}  {:<type_width$}  {:<8}  {:<4}  {}",
            col.name,
            col.data_type,
            null,
            key,
            col.default.as_deref().unwrap_or("-"),
            name_width = name_width,
            type_width = type_width
        );
    }

    let fks: Vec<_> = live
        .columns
        .iter()
        .filter_map(|c| c.references.as_ref().map(|fk| (&c.name, fk)))
        .collect();
    if !fks.is_empty() {
        println!();
        println!("Foreign keys:");
        for (column, fk) in fks {
            let target = fk.column.as_deref().unwrap_or("<primary key>");
            match fk.on_delete.as_deref() {
                Some(action) if !action.eq_ignore_ascii_case("NO ACTION") => println!(
                    "  {} -> {}({}) ON DELETE {}",
                    column, fk.table, target, action
                ),
                _ => println!("  {} -> {}({})", column, fk.table, target),
            }
        }
    }

    if !live.constraints_known {
        println!();
        println!("(constraints are not reported by this store)");
    }
}
