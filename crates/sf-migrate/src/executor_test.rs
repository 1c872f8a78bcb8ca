use super::*;
use sf_core::table_spec::ColumnSpec;
use sf_db::SqliteStore;

fn examenes_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .execute_batch(
            r#"
            CREATE TABLE examenes (
                Codigo INTEGER PRIMARY KEY AUTOINCREMENT,
                Tipo TEXT NOT NULL,
                Fecha_Solicitud DATETIME
            );
            INSERT INTO examenes (Tipo, Fecha_Solicitud) VALUES ('Sangre', '2024-01-10');
            "#,
        )
        .unwrap();
    store
}

fn examenes_spec(extra: Vec<ColumnSpec>) -> TableSpec {
    let mut columns = vec![
        ColumnSpec::primary_key("Codigo"),
        ColumnSpec::new("Tipo", "TEXT").not_null(),
        ColumnSpec::new("Fecha_Solicitud", "DATETIME"),
    ];
    columns.extend(extra);
    TableSpec::new("examenes", columns)
}

#[test]
fn test_plan_only_unchanged() {
    let store = examenes_store();
    let planned = plan_only(&store, &examenes_spec(vec![]), &EvolveOptions::default()).unwrap();
    assert_eq!(planned.plan.strategy, Strategy::Unchanged);
    assert!(planned.statements.is_empty());
}

#[test]
fn test_plan_only_create() {
    let store = SqliteStore::open_in_memory().unwrap();
    let planned = plan_only(&store, &examenes_spec(vec![]), &EvolveOptions::default()).unwrap();
    assert_eq!(planned.plan.strategy, Strategy::Create);
    assert_eq!(planned.statements.len(), 1);
    assert!(planned.statements[0].starts_with("CREATE TABLE \"examenes\""));
    assert!(!store.table_exists("examenes").unwrap());
}

#[test]
fn test_plan_only_in_place() {
    let store = examenes_store();
    let spec = examenes_spec(vec![
        ColumnSpec::new("Estado", "TEXT").with_default("'Pendiente'"),
        ColumnSpec::new("Resultado", "TEXT"),
    ]);
    let planned = plan_only(&store, &spec, &EvolveOptions::default()).unwrap();
    assert_eq!(planned.plan.strategy, Strategy::InPlace);
    assert_eq!(
        planned.statements,
        vec![
            "ALTER TABLE \"examenes\" ADD COLUMN \"Estado\" TEXT DEFAULT 'Pendiente'".to_string(),
            "ALTER TABLE \"examenes\" ADD COLUMN \"Resultado\" TEXT".to_string(),
        ]
    );
    assert!(!store.inspect("examenes").unwrap().has_column("Estado"));
}

#[test]
fn test_plan_only_shadow_rebuild_statements() {
    let store = examenes_store();
    let mut spec = examenes_spec(vec![]);
    spec.columns[2] = ColumnSpec::new("Fecha_Examen", "DATETIME");
    let options = EvolveOptions::default().with_alias("Fecha_Examen", "Fecha_Solicitud");

    let planned = plan_only(&store, &spec, &options).unwrap();
    assert_eq!(planned.plan.strategy, Strategy::ShadowRebuild);

    let statements = &planned.statements;
    assert_eq!(statements.len(), 5);
    assert_eq!(statements[0], "DROP TABLE IF EXISTS \"_sf_shadow_examenes\"");
    assert!(statements[1].starts_with("CREATE TABLE \"_sf_shadow_examenes\""));
    assert_eq!(
        statements[2],
        "INSERT INTO \"_sf_shadow_examenes\" (\"Codigo\", \"Tipo\", \"Fecha_Examen\") \
         SELECT \"Codigo\", \"Tipo\", \"Fecha_Solicitud\" FROM \"examenes\""
    );
    assert_eq!(statements[3], "DROP TABLE \"examenes\"");
    assert_eq!(
        statements[4],
        "ALTER TABLE \"_sf_shadow_examenes\" RENAME TO \"examenes\""
    );
}

#[test]
fn test_in_place_disabled_falls_back_to_rebuild() {
    let store = examenes_store();
    let spec = examenes_spec(vec![ColumnSpec::new("Resultado", "TEXT")]);
    let options = EvolveOptions {
        in_place_additions: false,
        ..EvolveOptions::default()
    };
    let planned = plan_only(&store, &spec, &options).unwrap();
    assert_eq!(planned.plan.strategy, Strategy::ShadowRebuild);
}

#[test]
fn test_plan_only_target_missing() {
    let store = SqliteStore::open_in_memory().unwrap();
    let options = EvolveOptions::default().requiring_existing();
    let err = plan_only(&store, &examenes_spec(vec![]), &options).unwrap_err();
    assert!(matches!(err, EvolveError::TargetMissing { ref table } if table == "examenes"));
}

#[test]
fn test_plan_only_rebuild_disabled() {
    let store = examenes_store();
    let spec = examenes_spec(vec![ColumnSpec::new("Codigo_Cita", "INTEGER").unique()]);
    let options = EvolveOptions {
        shadow_rebuild: false,
        ..EvolveOptions::default()
    };
    let err = plan_only(&store, &spec, &options).unwrap_err();
    assert!(matches!(err, EvolveError::UnsupportedStep { .. }));
    assert!(err.to_string().contains("add Codigo_Cita INTEGER"));
}

#[test]
fn test_invalid_spec_rejected_before_inspecting() {
    let store = examenes_store();
    let spec = TableSpec::new(
        "examenes",
        vec![
            ColumnSpec::new("Tipo", "TEXT"),
            ColumnSpec::new("tipo", "TEXT"),
        ],
    );
    let err = evolve(&store, &spec, &EvolveOptions::default()).unwrap_err();
    assert!(matches!(err, EvolveError::Plan(_)));
}

#[test]
fn test_copy_statement_omitted_when_nothing_copied() {
    let plan = MigrationPlan {
        table: sf_core::TableName::new("vacia"),
        strategy: Strategy::ShadowRebuild,
        steps: Vec::new(),
        copy_mapping: Default::default(),
        target_columns: vec![ColumnSpec::new("Nota", "TEXT")],
        preserved_columns: Vec::new(),
    };
    let statements = RebuildStatements::render(SqlDialect::Sqlite, "vacia", &plan).into_vec();
    assert_eq!(statements.len(), 4);
    assert!(statements.iter().all(|s| !s.starts_with("INSERT")));
}
