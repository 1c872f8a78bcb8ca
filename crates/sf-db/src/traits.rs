//! Store trait definition

use crate::ddl::SqlDialect;
use crate::error::DbResult;
use sf_core::live::LiveSchema;

/// One row reported by a foreign-key check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyViolation {
    /// Table holding the dangling reference
    pub table: String,
    /// Row id of the offending row, when the table has one
    pub rowid: Option<i64>,
    /// Referenced table the row points into
    pub parent: String,
}

/// A secondary index as declared in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    pub name: String,
    /// Statement that recreates the index
    pub sql: String,
    /// Indexed columns
    pub columns: Vec<String>,
    pub unique: bool,
    /// Every key part is a named column and there is no `WHERE` clause, so
    /// the index can be re-rendered from its parts
    pub plain: bool,
}

/// Storage abstraction used by the executor.
///
/// Operations are synchronous and borrow the store immutably; the backends
/// hold a single connection and are driven from one thread. Foreign-key
/// related operations default to no-ops for stores that do not enforce them.
pub trait SchemaStore {
    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;

    /// SQL flavour used to render DDL
    fn dialect(&self) -> SqlDialect;

    /// User tables in name order
    fn list_tables(&self) -> DbResult<Vec<String>>;

    /// Whether a table exists (case-insensitive)
    fn table_exists(&self, table: &str) -> DbResult<bool>;

    /// Introspect a table. An absent table is reported through
    /// [`LiveSchema::exists`], not as an error.
    fn inspect(&self, table: &str) -> DbResult<LiveSchema>;

    /// Execute one statement, returns affected rows
    fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple statements
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Number of rows returned by a query
    fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Whether `ALTER TABLE ADD COLUMN` is available
    fn supports_add_column(&self) -> bool {
        true
    }

    /// Whether a table can be rebuilt through a shadow copy and swapped in
    fn supports_shadow_rebuild(&self) -> bool {
        true
    }

    /// Whether foreign keys are currently enforced
    fn foreign_keys_enabled(&self) -> DbResult<bool> {
        Ok(false)
    }

    /// Switch foreign-key enforcement. Must be called outside a transaction.
    fn set_foreign_keys(&self, _enabled: bool) -> DbResult<()> {
        Ok(())
    }

    /// Switch whether renaming a table leaves references to it untouched
    fn set_legacy_alter_table(&self, _enabled: bool) -> DbResult<()> {
        Ok(())
    }

    /// Rows of `table` whose foreign keys point at missing parents
    fn foreign_key_violations(&self, _table: &str) -> DbResult<Vec<ForeignKeyViolation>> {
        Ok(Vec::new())
    }

    /// Tables other than `table` declaring a foreign key to it
    fn referencing_tables(&self, _table: &str) -> DbResult<Vec<String>> {
        Ok(Vec::new())
    }

    /// Secondary indexes declared on `table`
    fn indexes(&self, _table: &str) -> DbResult<Vec<IndexDefinition>> {
        Ok(Vec::new())
    }
}
