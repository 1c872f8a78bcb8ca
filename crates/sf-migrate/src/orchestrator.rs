//! Migration orchestrator

use crate::error::EvolveResult;
use crate::executor::evolve;
use crate::outcome::{TableResult, TableStatus};
use crate::report::RunReport;
use sf_core::dag::TableDag;
use sf_core::options::DeclaredTable;
use sf_core::table_spec::TableSpec;
use sf_db::SchemaStore;

/// Evolve every declared table, parents before children.
///
/// Tables run one at a time in foreign-key dependency order. A failure is
/// logged and recorded, and every table depending on the failed one
/// (directly or transitively) is skipped. Only an unavailable store stops
/// the run, since no later table could succeed either.
pub fn evolve_all<S: SchemaStore + ?Sized>(
    store: &S,
    tables: &[DeclaredTable],
) -> EvolveResult<RunReport> {
    let specs: Vec<TableSpec> = tables.iter().map(|t| t.spec.clone()).collect();
    let dag = TableDag::build(&specs)?;
    let order = dag.topological_order()?;

    let mut report = RunReport::new();
    log::info!(
        "Run {}: evolving {} table(s) on {}",
        report.run_id,
        order.len(),
        store.db_type()
    );

    for name in &order {
        let Some(declared) = tables.iter().find(|t| t.spec.name.matches(name)) else {
            continue;
        };

        if let Some(result) = blocked(&dag, &report, name) {
            log::warn!("{}: {}", name, result.summary_line());
            report.push(result);
            continue;
        }

        let result = match evolve(store, &declared.spec, &declared.options) {
            Ok(outcome) => TableResult::from_outcome(outcome),
            Err(e) if e.is_fatal() => {
                log::error!("{name}: {e}");
                return Err(e);
            }
            Err(e) => TableResult::failed(name, &e),
        };

        match result.status {
            TableStatus::Failed => log::warn!("{}: {}", name, result.summary_line()),
            _ => log::info!("{}: {}", name, result.summary_line()),
        }
        report.push(result);
    }

    report.finish();
    log::info!(
        "Run {} finished: {} unchanged, {} created, {} modified, {} failed, {} skipped",
        report.run_id,
        report.summary.unchanged,
        report.summary.created,
        report.summary.modified,
        report.summary.failed,
        report.summary.skipped
    );
    Ok(report)
}

/// Skip result for `table` when one of its parents did not succeed.
///
/// Parents always run first, and a skipped parent counts as not succeeded,
/// so checking direct parents covers the transitive case.
fn blocked(dag: &TableDag, report: &RunReport, table: &str) -> Option<TableResult> {
    dag.dependencies(table).iter().find_map(|parent| {
        let parent_result = report.result(parent)?;
        let reason = match parent_result.status {
            TableStatus::Failed => format!("parent '{parent}' failed"),
            TableStatus::Skipped => format!("parent '{parent}' was skipped"),
            _ => return None,
        };
        Some(TableResult::skipped(table, parent, &reason))
    })
}
