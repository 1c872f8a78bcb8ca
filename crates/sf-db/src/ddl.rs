//! Dialect-aware DDL rendering.
//!
//! Every statement the executor runs is rendered here from a [`ColumnSpec`]
//! list or a [`CopyMapping`], with identifiers quoted through
//! [`quote_ident`]. Default and fallback expressions are SQL text supplied by
//! the table declaration and are emitted verbatim.

use sf_core::plan::{CopyMapping, CopySource};
use sf_core::sql_utils::{escape_sql_string, is_constant_literal, is_integer_type, quote_ident};
use sf_core::table_spec::ColumnSpec;

/// Prefix of the temporary table used by a shadow rebuild
pub const SHADOW_PREFIX: &str = "_sf_shadow_";

/// Name of the shadow table for `table`
pub fn shadow_name(table: &str) -> String {
    format!("{SHADOW_PREFIX}{table}")
}

/// Name of the sequence feeding a DuckDB primary key
pub fn sequence_name(table: &str, column: &str) -> String {
    format!("{table}_{column}_seq")
}

/// SQL flavour of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    Sqlite,
    DuckDb,
}

impl SqlDialect {
    /// Full column definition for `CREATE TABLE`.
    ///
    /// On SQLite an integer primary key of any width is written as
    /// `INTEGER PRIMARY KEY AUTOINCREMENT`, the only form that aliases the
    /// rowid and numbers new rows.
    pub fn column_definition(&self, col: &ColumnSpec) -> String {
        let rowid_alias =
            *self == SqlDialect::Sqlite && col.primary_key && is_integer_type(&col.data_type);
        let data_type = if rowid_alias { "INTEGER" } else { col.data_type.as_str() };
        let mut def = format!("{} {}", quote_ident(&col.name), data_type);

        if col.primary_key {
            def.push_str(" PRIMARY KEY");
            if rowid_alias {
                def.push_str(" AUTOINCREMENT");
            }
        } else {
            if !col.nullable {
                def.push_str(" NOT NULL");
            }
            if col.unique {
                def.push_str(" UNIQUE");
            }
        }

        if let Some(default) = &col.default {
            def.push_str(" DEFAULT ");
            def.push_str(&render_default(default));
        }

        if let Some(fk) = &col.references {
            def.push_str(&format!(
                " REFERENCES {}({})",
                quote_ident(&fk.table),
                quote_ident(&fk.column)
            ));
            if let (SqlDialect::Sqlite, Some(action)) = (self, &fk.on_delete) {
                def.push_str(&format!(" ON DELETE {action}"));
            }
        }

        def
    }

    /// `CREATE TABLE` with the full structure.
    ///
    /// DuckDB has no auto-numbering key, so its integer primary key draws
    /// from a sequence created in the same batch.
    pub fn create_table(&self, table: &str, columns: &[ColumnSpec]) -> String {
        let mut sequences = Vec::new();
        let defs: Vec<String> = columns
            .iter()
            .map(|c| {
                let needs_sequence = *self == SqlDialect::DuckDb
                    && c.primary_key
                    && c.default.is_none()
                    && is_integer_type(&c.data_type);
                if !needs_sequence {
                    return format!("    {}", self.column_definition(c));
                }
                let seq = sequence_name(table, &c.name);
                let col = ColumnSpec {
                    default: Some(format!("nextval('{}')", escape_sql_string(&seq))),
                    ..c.clone()
                };
                sequences.push(format!("CREATE SEQUENCE IF NOT EXISTS {};\n", quote_ident(&seq)));
                format!("    {}", self.column_definition(&col))
            })
            .collect();
        format!(
            "{}CREATE TABLE {} (\n{}\n)",
            sequences.concat(),
            quote_ident(table),
            defs.join(",\n")
        )
    }

    /// `ALTER TABLE ... ADD COLUMN`
    ///
    /// DuckDB cannot add a column together with constraints, so only the type
    /// and default are rendered for it; see [`add_column_statements`].
    ///
    /// [`add_column_statements`]: Self::add_column_statements
    pub fn add_column(&self, table: &str, col: &ColumnSpec) -> String {
        let def = match self {
            SqlDialect::Sqlite => self.column_definition(col),
            SqlDialect::DuckDb => {
                let mut def = format!("{} {}", quote_ident(&col.name), col.data_type);
                if let Some(default) = &col.default {
                    def.push_str(" DEFAULT ");
                    def.push_str(&render_default(default));
                }
                def
            }
        };
        format!("ALTER TABLE {} ADD COLUMN {}", quote_ident(table), def)
    }

    /// Every statement adding `col` in place.
    ///
    /// On DuckDB a `NOT NULL` column is tightened after the addition, once the
    /// default has filled existing rows. A foreign key cannot be added there
    /// at all and is reported.
    pub fn add_column_statements(&self, table: &str, col: &ColumnSpec) -> Vec<String> {
        let mut out = vec![self.add_column(table, col)];
        if *self == SqlDialect::DuckDb {
            if !col.nullable {
                out.push(format!(
                    "ALTER TABLE {} ALTER COLUMN {} SET NOT NULL",
                    quote_ident(table),
                    quote_ident(&col.name)
                ));
            }
            if let Some(fk) = &col.references {
                log::warn!(
                    "{table}: duckdb cannot add a foreign key to an existing table, '{}' will not reference '{}'",
                    col.name,
                    fk.table
                );
            }
        }
        out
    }

    /// `INSERT INTO target (...) SELECT ... FROM source`, or `None` when no
    /// column is copied
    pub fn copy_rows(&self, target: &str, source: &str, mapping: &CopyMapping) -> Option<String> {
        let mut targets = Vec::new();
        let mut exprs = Vec::new();
        for entry in mapping.copied() {
            let expr = match &entry.source {
                CopySource::Column(name) | CopySource::Renamed(name) => quote_ident(name),
                CopySource::Fallback(expr) => expr.clone(),
                CopySource::Default => continue,
            };
            targets.push(quote_ident(&entry.target));
            exprs.push(expr);
        }
        if targets.is_empty() {
            return None;
        }
        Some(format!(
            "INSERT INTO {} ({}) SELECT {} FROM {}",
            quote_ident(target),
            targets.join(", "),
            exprs.join(", "),
            quote_ident(source)
        ))
    }

    /// `CREATE [UNIQUE] INDEX` over plain columns
    pub fn create_index(&self, name: &str, table: &str, columns: &[String], unique: bool) -> String {
        let cols: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
        format!(
            "CREATE {}INDEX {} ON {} ({})",
            if unique { "UNIQUE " } else { "" },
            quote_ident(name),
            quote_ident(table),
            cols.join(", ")
        )
    }

    /// `DROP TABLE`
    pub fn drop_table(&self, table: &str, if_exists: bool) -> String {
        if if_exists {
            format!("DROP TABLE IF EXISTS {}", quote_ident(table))
        } else {
            format!("DROP TABLE {}", quote_ident(table))
        }
    }

    /// `ALTER TABLE ... RENAME TO`
    pub fn rename_table(&self, from: &str, to: &str) -> String {
        format!("ALTER TABLE {} RENAME TO {}", quote_ident(from), quote_ident(to))
    }
}

/// Constant literals are emitted bare, anything else parenthesized so that
/// expressions such as `datetime('now')` are accepted as defaults.
pub fn render_default(expr: &str) -> String {
    let e = expr.trim();
    if is_constant_literal(e) {
        e.to_string()
    } else {
        format!("({e})")
    }
}

#[cfg(test)]
#[path = "ddl_test.rs"]
mod tests;
