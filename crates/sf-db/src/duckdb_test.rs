use super::*;

fn store_with_doctor() -> DuckDbStore {
    let store = DuckDbStore::open_in_memory().unwrap();
    store
        .execute_batch(
            "CREATE TABLE doctor (Codigo INTEGER PRIMARY KEY, Nombre TEXT NOT NULL, Especialidad VARCHAR);",
        )
        .unwrap();
    store
}

#[test]
fn test_db_type() {
    let store = DuckDbStore::open_in_memory().unwrap();
    assert_eq!(store.db_type(), "duckdb");
    assert_eq!(store.dialect(), SqlDialect::DuckDb);
    assert!(!store.foreign_keys_enabled().unwrap());
}

#[test]
fn test_inspect_table() {
    let store = store_with_doctor();
    let live = store.inspect("Doctor").unwrap();

    assert!(live.exists);
    assert!(!live.constraints_known);
    assert_eq!(live.table, "doctor");
    assert_eq!(live.column_names(), vec!["Codigo", "Nombre", "Especialidad"]);
    assert!(live.column("Codigo").unwrap().primary_key);
    assert!(live.column("Nombre").unwrap().not_null);
    assert_eq!(live.column("Especialidad").unwrap().data_type, "VARCHAR");
}

#[test]
fn test_inspect_absent_table() {
    let store = store_with_doctor();
    let live = store.inspect("receta").unwrap();
    assert!(!live.exists);
    assert!(!store.table_exists("receta").unwrap());
    assert!(store.table_exists("DOCTOR").unwrap());
}

#[test]
fn test_list_tables() {
    let store = store_with_doctor();
    store.execute_batch("CREATE TABLE citas (Codigo INTEGER); CREATE VIEW v AS SELECT 1 AS x;")
        .unwrap();
    assert_eq!(store.list_tables().unwrap(), vec!["citas", "doctor"]);
}

#[test]
fn test_query_count() {
    let store = DuckDbStore::open_in_memory().unwrap();
    store
        .execute_batch("CREATE TABLE nums AS SELECT * FROM range(10) t(n)")
        .unwrap();
    assert_eq!(store.query_count("SELECT * FROM nums").unwrap(), 10);
}

#[test]
fn test_not_null_violation_is_integrity() {
    let store = store_with_doctor();
    let err = store
        .execute("INSERT INTO doctor (Codigo) VALUES (1)")
        .unwrap_err();
    assert!(matches!(err, DbError::IntegrityViolation(_)));
}

#[test]
fn test_add_column_in_place() {
    let store = store_with_doctor();
    store
        .execute("INSERT INTO doctor VALUES (1, 'Ana', 'Pediatria')")
        .unwrap();
    let col = sf_core::table_spec::ColumnSpec::new("Telefono", "TEXT").with_default("'N/A'");
    store
        .execute(&store.dialect().add_column("doctor", &col))
        .unwrap();

    let live = store.inspect("doctor").unwrap();
    assert!(live.has_column("Telefono"));
    assert_eq!(
        store
            .query_count("SELECT * FROM doctor WHERE Telefono = 'N/A'")
            .unwrap(),
        1
    );
}

#[test]
fn test_open_missing_file_without_create() {
    let dir = tempfile::tempdir().unwrap();
    let err = DuckDbStore::open(&dir.path().join("missing.duckdb"), false)
        .err()
        .unwrap();
    assert!(err.is_unavailable());
}
