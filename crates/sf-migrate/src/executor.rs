//! Migration executor.
//!
//! Brings one table to its declaration: inspect, plan, then apply the plan
//! with the strategy it selected. Every strategy runs inside one store
//! transaction, so a failure at any point leaves the original table exactly
//! as it was.
//!
//! A shadow rebuild works on a temporary table named after
//! [`shadow_name`]. A leftover shadow from an aborted run is dropped first;
//! that is the only destructive statement issued against a table that is not
//! the target itself.

use crate::error::{EvolveError, EvolveResult};
use crate::outcome::{EvolveOutcome, TableStatus};
use serde::Serialize;
use sf_core::live::LiveSchema;
use sf_core::options::EvolveOptions;
use sf_core::plan::{plan_table, MigrationPlan, MigrationStep, Strategy};
use sf_core::table_spec::{ColumnSpec, TableSpec};
use sf_db::{shadow_name, with_transaction, DbError, IndexDefinition, SchemaStore, SqlDialect};

/// A plan together with the statements that would realize it
#[derive(Debug, Clone, Serialize)]
pub struct PlannedTable {
    pub plan: MigrationPlan,

    /// Statements in execution order. A shadow rebuild additionally recreates
    /// the table's secondary indexes after the swap.
    pub statements: Vec<String>,
}

/// Statements of a shadow rebuild, kept apart so the executor can run its
/// checks between them
struct RebuildStatements {
    drop_stale: String,
    create_shadow: String,
    copy: Option<String>,
    drop_original: String,
    rename: String,
}

impl RebuildStatements {
    fn render(dialect: SqlDialect, table: &str, plan: &MigrationPlan) -> Self {
        let shadow = shadow_name(table);
        Self {
            drop_stale: dialect.drop_table(&shadow, true),
            create_shadow: dialect.create_table(&shadow, &plan.target_columns),
            copy: dialect.copy_rows(&shadow, table, &plan.copy_mapping),
            drop_original: dialect.drop_table(table, false),
            rename: dialect.rename_table(&shadow, table),
        }
    }

    fn into_vec(self) -> Vec<String> {
        let mut out = vec![self.drop_stale, self.create_shadow];
        out.extend(self.copy);
        out.push(self.drop_original);
        out.push(self.rename);
        out
    }
}

/// Failure inside a transaction body, before it is tied to a table
enum Failure {
    Db(DbError),
    Evolve(EvolveError),
}

impl From<DbError> for Failure {
    fn from(err: DbError) -> Self {
        Failure::Db(err)
    }
}

impl Failure {
    fn into_evolve(self, table: &str) -> EvolveError {
        match self {
            Failure::Db(e) => EvolveError::from_db(table, e),
            Failure::Evolve(e) => e,
        }
    }
}

/// Inspect and plan a table, applying the store's capabilities and the
/// caller's options to the chosen strategy.
fn prepare<S: SchemaStore + ?Sized>(
    store: &S,
    spec: &TableSpec,
    options: &EvolveOptions,
) -> EvolveResult<(LiveSchema, MigrationPlan)> {
    spec.validate()?;

    let live = store
        .inspect(&spec.name)
        .map_err(|e| EvolveError::from_db(&spec.name, e))?;
    let mut plan = plan_table(&live, spec, options)?;

    if plan.strategy == Strategy::InPlace && !store.supports_add_column() {
        log::debug!(
            "{}: {} cannot add columns in place, rebuilding instead",
            spec.name,
            store.db_type()
        );
        plan.strategy = Strategy::ShadowRebuild;
    }

    match plan.strategy {
        Strategy::Create if options.require_existing => Err(EvolveError::TargetMissing {
            table: spec.name.to_string(),
        }),
        Strategy::ShadowRebuild if !options.shadow_rebuild => Err(EvolveError::UnsupportedStep {
            table: spec.name.to_string(),
            message: format!(
                "shadow rebuild is disabled but the plan needs one: [{}]",
                plan.describe_steps().join(", ")
            ),
        }),
        Strategy::ShadowRebuild if !store.supports_shadow_rebuild() => {
            Err(EvolveError::UnsupportedStep {
                table: spec.name.to_string(),
                message: format!(
                    "{} cannot rebuild tables but the plan needs it: [{}]",
                    store.db_type(),
                    plan.describe_steps().join(", ")
                ),
            })
        }
        _ => Ok((live, plan)),
    }
}

/// Physical name to address: the stored one when the table exists
fn physical_name<'a>(live: &'a LiveSchema, spec: &'a TableSpec) -> &'a str {
    if live.exists {
        live.table.as_str()
    } else {
        spec.name.as_str()
    }
}

fn added_column_specs(plan: &MigrationPlan) -> Vec<&ColumnSpec> {
    plan.added_columns()
        .into_iter()
        .filter_map(|name| plan.target_column(name))
        .collect()
}

/// Statements realizing an already prepared plan
fn render_statements(dialect: SqlDialect, table: &str, plan: &MigrationPlan) -> Vec<String> {
    match plan.strategy {
        Strategy::Unchanged => Vec::new(),
        Strategy::Create => vec![dialect.create_table(table, &plan.target_columns)],
        Strategy::InPlace => added_column_specs(plan)
            .into_iter()
            .flat_map(|col| dialect.add_column_statements(table, col))
            .collect(),
        Strategy::ShadowRebuild => RebuildStatements::render(dialect, table, plan).into_vec(),
    }
}

/// Compute what [`evolve`] would do without changing anything.
pub fn plan_only<S: SchemaStore + ?Sized>(
    store: &S,
    spec: &TableSpec,
    options: &EvolveOptions,
) -> EvolveResult<PlannedTable> {
    let (live, plan) = prepare(store, spec, options)?;
    let statements = render_statements(store.dialect(), physical_name(&live, spec), &plan);
    Ok(PlannedTable { plan, statements })
}

/// Bring one table to its declaration.
///
/// A table already matching its declaration is left alone. An absent table is created unless
/// `options.require_existing` is set. Additions that qualify run as
/// `ALTER TABLE ADD COLUMN`; everything else goes through a shadow rebuild.
///
/// # Errors
///
/// Store errors are classified per [`EvolveError::from_db`]. A rebuild that
/// would leave more dangling foreign keys than before, in the table or in
/// tables referencing it, fails with [`EvolveError::IntegrityViolation`].
pub fn evolve<S: SchemaStore + ?Sized>(
    store: &S,
    spec: &TableSpec,
    options: &EvolveOptions,
) -> EvolveResult<EvolveOutcome> {
    let (live, plan) = prepare(store, spec, options)?;
    let table = physical_name(&live, spec).to_string();
    let dialect = store.dialect();

    log::debug!(
        "{}: strategy {} with {} step(s)",
        table,
        plan.strategy,
        plan.steps.len()
    );

    let status = match plan.strategy {
        Strategy::Unchanged => TableStatus::Unchanged,
        Strategy::Create => {
            let sql = dialect.create_table(&table, &plan.target_columns);
            with_transaction(store, |s| run(s, &table, &sql))
                .map_err(|f: Failure| f.into_evolve(&table))?;
            TableStatus::Created
        }
        Strategy::InPlace => {
            let statements = render_statements(dialect, &table, &plan);
            with_transaction(store, |s| {
                for sql in &statements {
                    run(s, &table, sql)?;
                }
                Ok(())
            })
            .map_err(|f: Failure| f.into_evolve(&table))?;
            TableStatus::Modified
        }
        Strategy::ShadowRebuild => {
            shadow_rebuild(store, &table, &plan)?;
            TableStatus::Modified
        }
    };

    Ok(EvolveOutcome {
        table,
        status,
        strategy: plan.strategy,
        steps_applied: plan.steps,
        preserved_columns: plan.preserved_columns,
    })
}

fn run<S: SchemaStore + ?Sized>(store: &S, table: &str, sql: &str) -> Result<(), Failure> {
    log::debug!("{table}: {sql}");
    store.execute_batch(sql)?;
    Ok(())
}

/// Foreign-key enforcement cannot change inside a transaction, so it is
/// switched off around the whole rebuild and restored afterwards.
fn shadow_rebuild<S: SchemaStore + ?Sized>(
    store: &S,
    table: &str,
    plan: &MigrationPlan,
) -> EvolveResult<()> {
    let db_err = |e| EvolveError::from_db(table, e);

    let fk_was_on = store.foreign_keys_enabled().map_err(db_err)?;
    if fk_was_on {
        store.set_foreign_keys(false).map_err(db_err)?;
    }

    let result = with_transaction(store, |s| rebuild_in_transaction(s, table, plan))
        .map_err(|f: Failure| f.into_evolve(table));

    if fk_was_on {
        if let Err(e) = store.set_foreign_keys(true) {
            if result.is_ok() {
                return Err(db_err(e));
            }
            log::warn!("{table}: could not re-enable foreign keys: {e}");
        }
    }
    result
}

fn rebuild_in_transaction<S: SchemaStore + ?Sized>(
    s: &S,
    table: &str,
    plan: &MigrationPlan,
) -> Result<(), Failure> {
    let shadow = shadow_name(table);
    let statements = RebuildStatements::render(s.dialect(), table, plan);

    let indexes = s.indexes(table)?;
    let baseline = s.foreign_key_violations(table)?.len();
    let children = s.referencing_tables(table)?;
    let mut child_baseline = Vec::with_capacity(children.len());
    for child in &children {
        child_baseline.push(violations_into(s, child, table)?);
    }

    run(s, table, &statements.drop_stale)?;
    run(s, table, &statements.create_shadow)?;
    if let Some(copy) = &statements.copy {
        run(s, table, copy)?;
    }

    let shadow_violations = s.foreign_key_violations(&shadow)?.len();
    if shadow_violations > baseline {
        return Err(Failure::Evolve(EvolveError::IntegrityViolation {
            table: table.to_string(),
            message: format!(
                "rebuilt table has {shadow_violations} dangling foreign key(s), original had {baseline}"
            ),
        }));
    }

    s.set_legacy_alter_table(true)?;
    let swapped = run(s, table, &statements.drop_original)
        .and_then(|_| run(s, table, &statements.rename));
    let restored = s.set_legacy_alter_table(false);
    swapped?;
    restored?;

    for index in &indexes {
        match recreate_index(s.dialect(), table, index, plan) {
            Ok(sql) => run(s, table, &sql)?,
            Err(reason) => log::warn!("{table}: index '{}' not recreated, {reason}", index.name),
        }
    }

    for (child, before) in children.iter().zip(child_baseline) {
        let after = violations_into(s, child, table)?;
        if after > before {
            return Err(Failure::Evolve(EvolveError::IntegrityViolation {
                table: table.to_string(),
                message: format!(
                    "'{child}' would have {after} row(s) referencing missing parents, had {before}"
                ),
            }));
        }
    }

    Ok(())
}

/// Statement recreating `index` on the rebuilt table.
///
/// Columns follow the plan's renames. An index untouched by them is
/// recreated from its original statement.
fn recreate_index(
    dialect: SqlDialect,
    table: &str,
    index: &IndexDefinition,
    plan: &MigrationPlan,
) -> Result<String, &'static str> {
    let mut columns = Vec::with_capacity(index.columns.len());
    let mut renamed = false;
    for column in &index.columns {
        let target = plan
            .steps
            .iter()
            .find_map(|step| match step {
                MigrationStep::RenameColumn { from, to } if from.eq_ignore_ascii_case(column) => {
                    Some(to.as_str())
                }
                _ => None,
            });
        renamed |= target.is_some();
        let name = target.unwrap_or(column.as_str());
        if !plan.target_columns.iter().any(|t| t.name.matches(name)) {
            return Err("its columns no longer exist");
        }
        columns.push(name.to_string());
    }

    if index.plain {
        if renamed {
            return Ok(dialect.create_index(&index.name, table, &columns, index.unique));
        }
        return Ok(index.sql.clone());
    }

    // Expressions and WHERE clauses are opaque; any mention of a former
    // column name would no longer resolve.
    let sql = index.sql.to_ascii_lowercase();
    let mentions_renamed = plan.steps.iter().any(|step| {
        matches!(step, MigrationStep::RenameColumn { from, .. } if sql.contains(&from.to_ascii_lowercase()))
    });
    if renamed || mentions_renamed {
        Err("it refers to a renamed column through an expression or a WHERE clause")
    } else {
        Ok(index.sql.clone())
    }
}

/// Dangling references from `child` into `parent`
fn violations_into<S: SchemaStore + ?Sized>(
    s: &S,
    child: &str,
    parent: &str,
) -> Result<usize, DbError> {
    Ok(s.foreign_key_violations(child)?
        .iter()
        .filter(|v| v.parent.eq_ignore_ascii_case(parent))
        .count())
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
