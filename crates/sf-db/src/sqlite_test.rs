use super::*;

fn clinic() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .execute_batch(
            r#"
            CREATE TABLE pacientes (
                Codigo INTEGER PRIMARY KEY AUTOINCREMENT,
                Cedula TEXT NOT NULL UNIQUE,
                Nombre TEXT NOT NULL
            );
            CREATE TABLE citas (
                Codigo INTEGER PRIMARY KEY AUTOINCREMENT,
                Codigo_Paciente INTEGER REFERENCES pacientes(Codigo) ON DELETE CASCADE,
                Fecha DATETIME DEFAULT CURRENT_TIMESTAMP,
                Estado TEXT DEFAULT 'Programada'
            );
            CREATE INDEX idx_citas_fecha ON citas (Fecha);
            "#,
        )
        .unwrap();
    store
}

#[test]
fn test_pragmas_applied() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert!(store.foreign_keys_enabled().unwrap());
    let timeout: i64 = store
        .conn()
        .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
        .unwrap();
    assert_eq!(timeout, 5000);
}

#[test]
fn test_inspect_absent_table() {
    let store = clinic();
    let live = store.inspect("consultas").unwrap();
    assert!(!live.exists);
    assert!(live.columns.is_empty());
    assert!(!store.table_exists("consultas").unwrap());
}

#[test]
fn test_inspect_columns_and_constraints() {
    let store = clinic();
    let live = store.inspect("pacientes").unwrap();

    assert!(live.exists);
    assert!(live.constraints_known);
    assert_eq!(live.column_names(), vec!["Codigo", "Cedula", "Nombre"]);

    let codigo = live.column("codigo").unwrap();
    assert!(codigo.primary_key);
    assert_eq!(codigo.data_type, "INTEGER");

    let cedula = live.column("Cedula").unwrap();
    assert!(cedula.not_null);
    assert!(cedula.unique);
    assert!(!live.column("Nombre").unwrap().unique);
}

#[test]
fn test_inspect_defaults_and_foreign_keys() {
    let store = clinic();
    let live = store.inspect("CITAS").unwrap();
    assert_eq!(live.table, "citas");

    let fk = live
        .column("Codigo_Paciente")
        .unwrap()
        .references
        .clone()
        .unwrap();
    assert_eq!(fk.table, "pacientes");
    assert_eq!(fk.column.as_deref(), Some("Codigo"));
    assert_eq!(fk.on_delete.as_deref(), Some("CASCADE"));

    assert_eq!(
        live.column("Estado").unwrap().default.as_deref(),
        Some("'Programada'")
    );
    assert_eq!(
        live.column("Fecha").unwrap().default.as_deref(),
        Some("CURRENT_TIMESTAMP")
    );
    assert!(live.column("Fecha").unwrap().references.is_none());
}

#[test]
fn test_list_tables_excludes_internal() {
    let store = clinic();
    assert_eq!(store.list_tables().unwrap(), vec!["citas", "pacientes"]);
}

#[test]
fn test_referencing_tables() {
    let store = clinic();
    assert_eq!(store.referencing_tables("pacientes").unwrap(), vec!["citas"]);
    assert!(store.referencing_tables("citas").unwrap().is_empty());
}

#[test]
fn test_foreign_key_violations() {
    let store = clinic();
    store.set_foreign_keys(false).unwrap();
    store
        .execute("INSERT INTO citas (Codigo_Paciente) VALUES (42)")
        .unwrap();
    store.set_foreign_keys(true).unwrap();

    let violations = store.foreign_key_violations("citas").unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].table, "citas");
    assert_eq!(violations[0].parent, "pacientes");
    assert_eq!(violations[0].rowid, Some(1));
    assert!(store.foreign_key_violations("pacientes").unwrap().is_empty());
}

#[test]
fn test_indexes() {
    let store = clinic();
    let indexes = store.indexes("citas").unwrap();
    assert_eq!(indexes.len(), 1);
    assert_eq!(indexes[0].name, "idx_citas_fecha");
    assert_eq!(indexes[0].columns, vec!["Fecha"]);
    assert!(indexes[0].sql.starts_with("CREATE INDEX"));
    assert!(!indexes[0].unique);
    assert!(indexes[0].plain);
    // Implicit UNIQUE indexes are not reported
    assert!(store.indexes("pacientes").unwrap().is_empty());
}

#[test]
fn test_index_shapes() {
    let store = clinic();
    store
        .execute_batch(
            "CREATE UNIQUE INDEX idx_citas_unica ON citas (Codigo_Paciente, Fecha);
             CREATE INDEX idx_citas_lower ON citas (lower(Fecha));
             CREATE INDEX idx_citas_con_fecha ON citas (Fecha) WHERE Fecha IS NOT NULL;",
        )
        .unwrap();

    let indexes = store.indexes("citas").unwrap();
    let find = |name: &str| indexes.iter().find(|i| i.name == name).unwrap();

    let unica = find("idx_citas_unica");
    assert!(unica.unique && unica.plain);
    assert_eq!(unica.columns, vec!["Codigo_Paciente", "Fecha"]);
    assert!(!find("idx_citas_lower").plain);
    assert!(!find("idx_citas_con_fecha").plain);
}

#[test]
fn test_query_count() {
    let store = clinic();
    store
        .execute_batch(
            "INSERT INTO pacientes (Cedula, Nombre) VALUES ('1', 'Ana'), ('2', 'Luis');",
        )
        .unwrap();
    assert_eq!(store.query_count("SELECT * FROM pacientes").unwrap(), 2);
}

#[test]
fn test_execute_error_carries_statement() {
    let store = clinic();
    let err = store
        .execute("INSERT INTO pacientes (Cedula) VALUES ('1')")
        .unwrap_err();
    assert!(matches!(err, DbError::IntegrityViolation(_)));
    assert!(err.to_string().contains("INSERT INTO pacientes"));
}

#[test]
fn test_open_missing_file_without_create() {
    let dir = tempfile::tempdir().unwrap();
    let err = SqliteStore::open(&dir.path().join("missing.db"), false)
        .err()
        .unwrap();
    assert!(err.is_unavailable());
}

#[test]
fn test_open_creates_when_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nuevo.db");
    let store = SqliteStore::open(&path, true).unwrap();
    store.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();
    drop(store);

    let reopened = SqliteStore::open(&path, false).unwrap();
    assert!(reopened.table_exists("t").unwrap());
}

#[test]
fn test_open_non_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");
    std::fs::write(&path, "this is not a database file, just some plain text content").unwrap();
    let err = SqliteStore::open(&path, false).err().unwrap();
    assert!(err.is_unavailable());
}
