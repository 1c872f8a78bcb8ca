use super::*;

#[test]
fn test_sqlite_constraint_is_integrity() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, n TEXT NOT NULL)")
        .unwrap();
    let err: DbError = conn
        .execute("INSERT INTO t (n) VALUES (NULL)", [])
        .unwrap_err()
        .into();
    assert!(matches!(err, DbError::IntegrityViolation(_)));
    assert!(err.to_string().starts_with("[D004]"));
}

#[test]
fn test_sqlite_missing_table() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let err: DbError = conn
        .execute("INSERT INTO nope VALUES (1)", [])
        .unwrap_err()
        .into();
    assert!(matches!(err, DbError::TableNotFound(_)));
}

#[test]
fn test_sqlite_syntax_error_is_execution() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let err: DbError = conn.execute_batch("CREATE TABEL x (a)").unwrap_err().into();
    assert!(matches!(err, DbError::ExecutionError(_)));
    assert!(!err.is_unavailable());
}

#[test]
fn test_duckdb_constraint_is_integrity() {
    let conn = duckdb::Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY)")
        .unwrap();
    conn.execute_batch("INSERT INTO t VALUES (1)").unwrap();
    let err: DbError = conn
        .execute_batch("INSERT INTO t VALUES (1)")
        .unwrap_err()
        .into();
    assert!(matches!(err, DbError::IntegrityViolation(_)));
}

#[test]
fn test_with_statement_appends_sql() {
    let err = DbError::ExecutionError("boom".to_string()).with_statement("SELECT 1");
    assert_eq!(err.to_string(), "[D002] SQL execution failed: boom: SELECT 1");

    let unavailable = DbError::ConnectionError("locked".to_string()).with_statement("SELECT 1");
    assert!(unavailable.is_unavailable());
    assert_eq!(
        unavailable.to_string(),
        "[D001] Database connection failed: locked"
    );
}
