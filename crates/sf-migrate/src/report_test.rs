use super::*;
use crate::error::{ErrorKind, EvolveError};
use crate::outcome::EvolveOutcome;
use sf_core::column_name::ColumnName;
use sf_core::plan::{MigrationStep, Strategy};

fn outcome(table: &str, status: TableStatus, strategy: Strategy) -> EvolveOutcome {
    EvolveOutcome {
        table: table.to_string(),
        status,
        strategy,
        steps_applied: Vec::new(),
        preserved_columns: Vec::new(),
    }
}

#[test]
fn test_new_report_is_empty() {
    let report = RunReport::new();
    assert_eq!(report.run_id.len(), 8);
    assert_eq!(report.summary.total(), 0);
    assert_eq!(report.exit_code(), 0);
    assert!(report.finished_at.is_none());
}

#[test]
fn test_counts_by_status() {
    let mut report = RunReport::new();
    report.push(TableResult::from_outcome(outcome(
        "pacientes",
        TableStatus::Unchanged,
        Strategy::Unchanged,
    )));
    report.push(TableResult::from_outcome(outcome(
        "receta",
        TableStatus::Created,
        Strategy::Create,
    )));
    report.push(TableResult::failed(
        "consultas",
        &EvolveError::TargetMissing {
            table: "consultas".to_string(),
        },
    ));
    report.push(TableResult::skipped(
        "receta_items",
        "consultas",
        "parent 'consultas' failed",
    ));
    report.finish();

    assert_eq!(report.summary.unchanged, 1);
    assert_eq!(report.summary.created, 1);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.skipped, 1);
    assert_eq!(report.summary.total(), 4);
    assert!(report.has_failures());
    assert_eq!(report.exit_code(), 1);
    assert!(report.finished_at.is_some());

    let failed = report.result("CONSULTAS").unwrap();
    assert_eq!(failed.error_kind, Some(ErrorKind::TargetMissing));
    assert!(!failed.succeeded());
}

#[test]
fn test_skipped_alone_does_not_fail_run() {
    let mut report = RunReport::new();
    report.push(TableResult::skipped("a", "b", "parent 'b' was skipped"));
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn test_summary_lines() {
    let mut added = outcome("examenes", TableStatus::Modified, Strategy::InPlace);
    added.steps_applied = vec![
        MigrationStep::AddColumn {
            name: ColumnName::new("Codigo_Cita"),
            data_type: "INTEGER".to_string(),
            default: None,
        },
        MigrationStep::AddColumn {
            name: ColumnName::new("Estado"),
            data_type: "TEXT".to_string(),
            default: Some("'Pendiente'".to_string()),
        },
    ];
    assert_eq!(added.summary_line(), "columns added: [Codigo_Cita, Estado]");

    let mut rebuilt = outcome("consultas", TableStatus::Modified, Strategy::ShadowRebuild);
    rebuilt.steps_applied = vec![MigrationStep::RenameColumn {
        from: "Fecha_Consulta".to_string(),
        to: ColumnName::new("Fecha_de_Consulta"),
    }];
    assert_eq!(
        rebuilt.summary_line(),
        "rebuilt with changes: [rename Fecha_Consulta -> Fecha_de_Consulta]"
    );
    assert_eq!(
        TableResult::from_outcome(rebuilt).summary_line(),
        "rebuilt with changes: [rename Fecha_Consulta -> Fecha_de_Consulta]"
    );

    assert_eq!(
        outcome("pacientes", TableStatus::Unchanged, Strategy::Unchanged).summary_line(),
        "unchanged"
    );
    assert_eq!(
        TableResult::skipped("receta", "consultas", "parent 'consultas' failed").summary_line(),
        "skipped: parent 'consultas' failed"
    );
}

#[test]
fn test_report_serializes() {
    let mut report = RunReport::new();
    report.push(TableResult::failed(
        "consultas",
        &EvolveError::UnsupportedStep {
            table: "consultas".to_string(),
            message: "shadow rebuild disabled".to_string(),
        },
    ));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["summary"]["failed"], 1);
    assert_eq!(json["results"][0]["status"], "failed");
    assert_eq!(json["results"][0]["error_kind"], "unsupported_step");
    assert!(json["results"][0].get("blocked_by").is_none());
}
