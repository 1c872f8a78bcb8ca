//! DuckDB store

use crate::ddl::SqlDialect;
use crate::error::{DbError, DbResult};
use crate::traits::SchemaStore;
use duckdb::Connection;
use sf_core::live::{LiveColumn, LiveSchema};
use sf_core::sql_utils::escape_sql_string;
use std::path::Path;

/// DuckDB store over a single connection.
///
/// `PRAGMA table_info` does not report defaults, uniqueness or foreign keys
/// in a form comparable with a declaration, so schemas from this store carry
/// `constraints_known = false` and only names and types are planned.
pub struct DuckDbStore {
    conn: Connection,
}

impl DuckDbStore {
    /// Open a database file
    pub fn open(path: &Path, create_if_missing: bool) -> DbResult<Self> {
        if !create_if_missing && !path.exists() {
            return Err(DbError::ConnectionError(format!(
                "database file not found: {}",
                path.display()
            )));
        }
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        log::debug!("Opened DuckDB database {}", path.display());
        Ok(Self { conn })
    }

    /// Create a new in-memory DuckDB connection
    pub fn open_in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn resolve_name(&self, table: &str) -> DbResult<Option<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'main' AND table_type = 'BASE TABLE' \
             AND lower(table_name) = lower(?)",
        )?;
        let mut rows = stmt.query_map(duckdb::params![table], |row| row.get::<_, String>(0))?;
        let first = rows.next().transpose()?;
        Ok(first)
    }
}

impl SchemaStore for DuckDbStore {
    fn db_type(&self) -> &'static str {
        "duckdb"
    }

    fn dialect(&self) -> SqlDialect {
        SqlDialect::DuckDb
    }

    /// Key sequences are named after the table they were created for, so a
    /// swapped-in shadow would keep drawing from the shadow's sequence.
    /// Only creation and in-place additions are applied.
    fn supports_shadow_rebuild(&self) -> bool {
        false
    }

    fn list_tables(&self) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'main' AND table_type = 'BASE TABLE' ORDER BY table_name",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }

    fn table_exists(&self, table: &str) -> DbResult<bool> {
        Ok(self.resolve_name(table)?.is_some())
    }

    fn inspect(&self, table: &str) -> DbResult<LiveSchema> {
        let Some(name) = self.resolve_name(table)? else {
            return Ok(LiveSchema::absent(table));
        };

        let sql = format!(
            "SELECT name, type, \"notnull\", pk FROM pragma_table_info('{}') ORDER BY cid",
            escape_sql_string(&name)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(LiveColumn {
                not_null: row.get(2)?,
                primary_key: row.get(3)?,
                ..LiveColumn::new(&row.get::<_, String>(0)?, &row.get::<_, String>(1)?)
            })
        })?;
        let columns = rows.collect::<Result<Vec<_>, _>>()?;

        Ok(LiveSchema::new(&name, columns, false))
    }

    fn execute(&self, sql: &str) -> DbResult<usize> {
        self.conn
            .execute(sql, [])
            .map_err(|e| DbError::from(e).with_statement(sql))
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| DbError::from(e).with_statement(sql))
    }

    fn query_count(&self, sql: &str) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
                row.get(0)
            })?;
        Ok(count as usize)
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
