//! SQLite store

use crate::ddl::SqlDialect;
use crate::error::{DbError, DbResult};
use crate::traits::{ForeignKeyViolation, IndexDefinition, SchemaStore};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use sf_core::live::{LiveColumn, LiveForeignKey, LiveSchema};
use sf_core::sql_utils::quote_ident;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// SQLite store over a single connection
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file.
    ///
    /// Without `create_if_missing` the file must already exist and be a
    /// SQLite database; anything else is reported as
    /// [`DbError::ConnectionError`].
    pub fn open(path: &Path, create_if_missing: bool) -> DbResult<Self> {
        if !create_if_missing && !path.exists() {
            return Err(DbError::ConnectionError(format!(
                "database file not found: {}",
                path.display()
            )));
        }

        let flags = if create_if_missing {
            OpenFlags::default()
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
        };
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;

        let store = Self::from_connection(conn)?;
        // Opening is lazy; the first read is what detects a non-database file.
        store
            .conn
            .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
                row.get::<_, i64>(0)
            })
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        log::debug!("Opened SQLite database {}", path.display());
        Ok(store)
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> DbResult<Self> {
        apply_pragmas(&conn)?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Stored name of a table, matched case-insensitively
    fn resolve_name(&self, table: &str) -> DbResult<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
                [table],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn foreign_keys_by_column(&self, table: &str) -> DbResult<HashMap<String, LiveForeignKey>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT "from", "table", "to", on_delete FROM pragma_foreign_key_list(?1) ORDER BY id, seq"#,
        )?;
        let rows = stmt.query_map([table], |row| {
            Ok((
                row.get::<_, String>(0)?,
                LiveForeignKey {
                    table: row.get(1)?,
                    column: row.get(2)?,
                    on_delete: row.get(3)?,
                },
            ))
        })?;

        let mut out = HashMap::new();
        for row in rows {
            let (from, fk) = row?;
            out.entry(from.to_ascii_lowercase()).or_insert(fk);
        }
        Ok(out)
    }

    fn unique_columns(&self, table: &str) -> DbResult<HashSet<String>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT ii.name
               FROM pragma_index_list(?1) AS il, pragma_index_info(il.name) AS ii
               WHERE il."unique" = 1 AND il.origin = 'u'
               GROUP BY il.name
               HAVING COUNT(*) = 1"#,
        )?;
        let rows = stmt.query_map([table], |row| row.get::<_, Option<String>>(0))?;
        let mut out = HashSet::new();
        for row in rows {
            if let Some(name) = row? {
                out.insert(name.to_ascii_lowercase());
            }
        }
        Ok(out)
    }
}

/// Pragmas applied to every connection
fn apply_pragmas(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )?;
    Ok(())
}

impl SchemaStore for SqliteStore {
    fn db_type(&self) -> &'static str {
        "sqlite"
    }

    fn dialect(&self) -> SqlDialect {
        SqlDialect::Sqlite
    }

    fn list_tables(&self) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
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

        let mut foreign_keys = self.foreign_keys_by_column(&name)?;
        let unique = self.unique_columns(&name)?;

        let mut stmt = self.conn.prepare(
            r#"SELECT name, type, "notnull", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid"#,
        )?;
        let rows = stmt.query_map([&name], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut columns = Vec::new();
        for row in rows {
            let (col_name, data_type, not_null, default, pk) = row?;
            let key = col_name.to_ascii_lowercase();
            columns.push(LiveColumn {
                unique: unique.contains(&key),
                references: foreign_keys.remove(&key),
                not_null: not_null != 0,
                default,
                primary_key: pk > 0,
                data_type,
                name: col_name,
            });
        }

        Ok(LiveSchema::new(&name, columns, true))
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

    fn foreign_keys_enabled(&self) -> DbResult<bool> {
        let enabled: i64 = self
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
        Ok(enabled != 0)
    }

    fn set_foreign_keys(&self, enabled: bool) -> DbResult<()> {
        let value = if enabled { "ON" } else { "OFF" };
        self.conn
            .execute_batch(&format!("PRAGMA foreign_keys = {value}"))?;
        Ok(())
    }

    fn set_legacy_alter_table(&self, enabled: bool) -> DbResult<()> {
        let value = if enabled { "ON" } else { "OFF" };
        self.conn
            .execute_batch(&format!("PRAGMA legacy_alter_table = {value}"))?;
        Ok(())
    }

    fn foreign_key_violations(&self, table: &str) -> DbResult<Vec<ForeignKeyViolation>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA foreign_key_check({})", quote_ident(table)))?;
        let rows = stmt.query_map([], |row| {
            Ok(ForeignKeyViolation {
                table: row.get(0)?,
                rowid: row.get(1)?,
                parent: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn referencing_tables(&self, table: &str) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT m.name
               FROM sqlite_master AS m, pragma_foreign_key_list(m.name) AS fk
               WHERE m.type = 'table'
                 AND fk."table" = ?1 COLLATE NOCASE
                 AND m.name <> ?1 COLLATE NOCASE
               GROUP BY m.name
               ORDER BY m.name"#,
        )?;
        let rows = stmt.query_map([table], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }

    fn indexes(&self, table: &str) -> DbResult<Vec<IndexDefinition>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT m.name, m.sql, il."unique", il.partial
               FROM pragma_index_list(?1) AS il
               JOIN sqlite_master AS m ON m.type = 'index' AND m.name = il.name
               WHERE il.origin = 'c' AND m.sql IS NOT NULL
               ORDER BY m.name"#,
        )?;
        let rows = stmt.query_map([table], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, bool>(3)?,
            ))
        })?;
        let indexes = rows.collect::<Result<Vec<_>, _>>()?;

        let mut info = self
            .conn
            .prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")?;
        let mut out = Vec::with_capacity(indexes.len());
        for (name, sql, unique, partial) in indexes {
            let parts = info
                .query_map([&name], |row| row.get::<_, Option<String>>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            let plain = !partial && parts.iter().all(Option::is_some);
            out.push(IndexDefinition {
                name,
                sql,
                columns: parts.into_iter().flatten().collect(),
                unique,
                plain,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "sqlite_test.rs"]
mod tests;
