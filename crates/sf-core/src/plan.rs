//! Delta planner.
//!
//! Compares a [`LiveSchema`] against a [`TableSpec`] and produces the ordered
//! list of steps, the per-column copy mapping and the strategy that realize
//! the difference. Planning is pure: the same inputs always give the same
//! plan, and a table already at spec gives an empty one.

use crate::column_name::ColumnName;
use crate::error::{CoreError, CoreResult};
use crate::live::{LiveColumn, LiveForeignKey, LiveSchema};
use crate::options::EvolveOptions;
use crate::sql_utils::{canonical_type, defaults_equivalent, is_constant_literal, is_integer_type};
use crate::table_name::TableName;
use crate::table_spec::{ColumnSpec, ForeignKeyRef, TableSpec};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// One atomic structural change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum MigrationStep {
    /// The table does not exist and is created from the declaration
    CreateTable,

    /// Add a column absent from the live table
    AddColumn {
        name: ColumnName,
        data_type: String,
        default: Option<String>,
    },

    /// A live column is carried over under its declared name
    RenameColumn { from: String, to: ColumnName },

    /// Declared type family differs from the live one
    RetypeColumn {
        name: ColumnName,
        from_type: String,
        to_type: String,
    },

    /// Nullability, default, key, uniqueness or foreign key differs
    AlterConstraints { name: ColumnName, detail: String },

    /// Remove a live column absent from the declaration
    DropColumn { name: String },
}

impl MigrationStep {
    /// Whether the step can only be realized by rebuilding the table
    pub fn requires_rebuild(&self) -> bool {
        !matches!(
            self,
            MigrationStep::CreateTable | MigrationStep::AddColumn { .. }
        )
    }

    /// Short human-readable description used in reports
    pub fn describe(&self) -> String {
        match self {
            MigrationStep::CreateTable => "create table".to_string(),
            MigrationStep::AddColumn {
                name,
                data_type,
                default,
            } => match default {
                Some(d) => format!("add {} {} DEFAULT {}", name, data_type, d),
                None => format!("add {} {}", name, data_type),
            },
            MigrationStep::RenameColumn { from, to } => format!("rename {} -> {}", from, to),
            MigrationStep::RetypeColumn {
                name,
                from_type,
                to_type,
            } => format!("retype {} {} -> {}", name, from_type, to_type),
            MigrationStep::AlterConstraints { name, detail } => {
                format!("constraints {} ({})", name, detail)
            }
            MigrationStep::DropColumn { name } => format!("drop {}", name),
        }
    }
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Where the values of one target column come from during a rebuild
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CopySource {
    /// Live column with the same name
    Column(String),
    /// Live column with a former name
    Renamed(String),
    /// Caller-supplied SQL expression over the original row
    Fallback(String),
    /// Not copied; the declared default (or NULL) applies
    Default,
}

/// Target column paired with its source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyEntry {
    pub target: ColumnName,
    pub source: CopySource,
}

/// Column-by-column mapping from the original table to the rebuilt one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyMapping {
    pub entries: Vec<CopyEntry>,
}

impl CopyMapping {
    /// Source chosen for a target column
    pub fn source_for(&self, target: &str) -> Option<&CopySource> {
        self.entries
            .iter()
            .find(|e| e.target.matches(target))
            .map(|e| &e.source)
    }

    /// Entries that are copied, i.e. everything except [`CopySource::Default`]
    pub fn copied(&self) -> impl Iterator<Item = &CopyEntry> {
        self.entries
            .iter()
            .filter(|e| !matches!(e.source, CopySource::Default))
    }

    /// Whether no column is copied at all
    pub fn is_empty(&self) -> bool {
        self.copied().next().is_none()
    }
}

/// How a plan is realized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Nothing to do
    Unchanged,
    /// Create the absent table
    Create,
    /// `ALTER TABLE ADD COLUMN` for each added column
    InPlace,
    /// Build a shadow table, copy, swap
    ShadowRebuild,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::Unchanged => "unchanged",
            Strategy::Create => "create",
            Strategy::InPlace => "in_place",
            Strategy::ShadowRebuild => "shadow_rebuild",
        };
        f.write_str(s)
    }
}

/// Ordered delta between a live table and its declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationPlan {
    pub table: TableName,
    pub strategy: Strategy,
    pub steps: Vec<MigrationStep>,
    pub copy_mapping: CopyMapping,

    /// Full structure after the migration: declared columns followed by
    /// preserved live columns
    pub target_columns: Vec<ColumnSpec>,

    /// Live columns the declaration does not mention, kept because dropping was not
    /// allowed
    pub preserved_columns: Vec<String>,
}

impl MigrationPlan {
    /// Whether the plan has nothing to apply
    pub fn is_unchanged(&self) -> bool {
        self.strategy == Strategy::Unchanged
    }

    /// Whether any step needs a shadow rebuild
    pub fn requires_rebuild(&self) -> bool {
        self.steps.iter().any(MigrationStep::requires_rebuild)
    }

    /// Names of columns added by the plan
    pub fn added_columns(&self) -> Vec<&ColumnName> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                MigrationStep::AddColumn { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Target column definition by name
    pub fn target_column(&self, name: &str) -> Option<&ColumnSpec> {
        self.target_columns.iter().find(|c| c.name.matches(name))
    }

    /// Step descriptions in order
    pub fn describe_steps(&self) -> Vec<String> {
        self.steps.iter().map(MigrationStep::describe).collect()
    }
}

#[derive(Clone, Copy)]
enum Matched<'a> {
    Same(&'a LiveColumn),
    Renamed(&'a LiveColumn),
}

impl<'a> Matched<'a> {
    fn live(self) -> &'a LiveColumn {
        match self {
            Matched::Same(l) | Matched::Renamed(l) => l,
        }
    }
}

/// Compute the plan that brings `live` to `spec`.
///
/// Steps are emitted renames first, then additions, retypes, constraint
/// changes and drops. A step whose precondition already holds is never
/// emitted, so planning a table that is at spec yields [`Strategy::Unchanged`].
pub fn plan_table(
    live: &LiveSchema,
    spec: &TableSpec,
    options: &EvolveOptions,
) -> CoreResult<MigrationPlan> {
    if !live.exists {
        return Ok(MigrationPlan {
            table: spec.name.clone(),
            strategy: Strategy::Create,
            steps: vec![MigrationStep::CreateTable],
            copy_mapping: CopyMapping::default(),
            target_columns: spec.columns.clone(),
            preserved_columns: Vec::new(),
        });
    }

    let mut consumed: HashSet<String> = HashSet::new();
    let mut matched: Vec<Option<Matched<'_>>> = spec
        .columns
        .iter()
        .map(|col| {
            live.column(&col.name).map(|l| {
                consumed.insert(l.name.to_ascii_lowercase());
                Matched::Same(l)
            })
        })
        .collect();

    let mut steps = Vec::new();

    // 1. renames through declared aliases
    for (slot, col) in matched.iter_mut().zip(&spec.columns) {
        if slot.is_some() {
            continue;
        }
        for old in options.aliases_for(&col.name) {
            if spec.has_column(old) {
                continue;
            }
            let Some(l) = live.column(old) else {
                continue;
            };
            if !consumed.insert(l.name.to_ascii_lowercase()) {
                continue;
            }
            steps.push(MigrationStep::RenameColumn {
                from: l.name.clone(),
                to: col.name.clone(),
            });
            *slot = Some(Matched::Renamed(l));
            break;
        }
    }

    // 2. additions
    for (slot, col) in matched.iter().zip(&spec.columns) {
        if slot.is_none() {
            steps.push(MigrationStep::AddColumn {
                name: col.name.clone(),
                data_type: col.data_type.clone(),
                default: col.default.clone(),
            });
        }
    }

    // 3. retypes
    for (slot, col) in matched.iter().zip(&spec.columns) {
        let Some(m) = slot else { continue };
        let l = m.live();
        if !same_type(col, l) {
            steps.push(MigrationStep::RetypeColumn {
                name: col.name.clone(),
                from_type: l.data_type.clone(),
                to_type: col.data_type.clone(),
            });
        }
    }

    // 4. constraints, only where the store reports them
    if live.constraints_known {
        for (slot, col) in matched.iter().zip(&spec.columns) {
            let Some(Matched::Same(l)) = slot else {
                continue;
            };
            let differences = constraint_differences(col, l);
            if !differences.is_empty() {
                steps.push(MigrationStep::AlterConstraints {
                    name: col.name.clone(),
                    detail: differences.join(", "),
                });
            }
        }
    }

    // 5. drops, or preservation
    let mut preserved = Vec::new();
    for l in &live.columns {
        if consumed.contains(&l.name.to_ascii_lowercase()) {
            continue;
        }
        if options.allow_drop {
            steps.push(MigrationStep::DropColumn {
                name: l.name.clone(),
            });
        } else {
            preserved.push(l);
        }
    }

    // 6. copy mapping
    let mut entries: Vec<CopyEntry> = matched
        .iter()
        .zip(&spec.columns)
        .map(|(slot, col)| {
            let fallback = options.fallback_for(&col.name);
            let source = match (slot, fallback) {
                (Some(Matched::Same(l)), _) => CopySource::Column(l.name.clone()),
                (Some(Matched::Renamed(_)), Some(expr)) | (None, Some(expr)) => {
                    CopySource::Fallback(expr.to_string())
                }
                (Some(Matched::Renamed(l)), None) => CopySource::Renamed(l.name.clone()),
                (None, None) => CopySource::Default,
            };
            CopyEntry {
                target: col.name.clone(),
                source,
            }
        })
        .collect();

    let mut target_columns = spec.columns.clone();
    let spec_has_pk = spec.primary_key().is_some();
    for l in &preserved {
        let column = preserved_column(spec, l, spec_has_pk)?;
        entries.push(CopyEntry {
            target: column.name.clone(),
            source: CopySource::Column(l.name.clone()),
        });
        target_columns.push(column);
    }

    // 7. strategy
    let strategy = if steps.is_empty() {
        Strategy::Unchanged
    } else if options.in_place_additions
        && steps.iter().all(|step| match step {
            MigrationStep::AddColumn { name, .. } => spec
                .column(name)
                .is_some_and(|col| in_place_eligible(col, options)),
            _ => false,
        })
    {
        Strategy::InPlace
    } else {
        Strategy::ShadowRebuild
    };

    Ok(MigrationPlan {
        table: spec.name.clone(),
        strategy,
        steps,
        copy_mapping: CopyMapping { entries },
        target_columns,
        preserved_columns: preserved.iter().map(|l| l.name.clone()).collect(),
    })
}

/// Whether a column can be added with `ALTER TABLE ADD COLUMN`.
///
/// Existing rows receive the default (or NULL), so a NOT NULL column needs a
/// default. Keys, uniqueness and non-constant defaults cannot be added in
/// place, and a fallback expression needs the copy step of a rebuild.
pub fn in_place_eligible(col: &ColumnSpec, options: &EvolveOptions) -> bool {
    if col.primary_key || col.unique || options.fallback_for(&col.name).is_some() {
        return false;
    }
    let default_ok = col.default.as_deref().map_or(true, is_constant_literal);
    let nulls_ok = col.nullable || col.default.is_some();
    let fk_ok = col.references.is_none() || defaults_equivalent(col.default.as_deref(), None);
    default_ok && nulls_ok && fk_ok
}

fn constraint_differences(col: &ColumnSpec, live: &LiveColumn) -> Vec<&'static str> {
    let mut out = Vec::new();
    if col.primary_key != live.primary_key {
        out.push("primary key");
    }
    // SQLite reports an INTEGER PRIMARY KEY as nullable and without a unique
    // index; the key itself implies both.
    if !col.primary_key {
        if col.nullable == live.not_null {
            out.push(if col.nullable { "nullable" } else { "not null" });
        }
        if col.unique != live.unique {
            out.push("unique");
        }
    }
    if !defaults_equivalent(col.default.as_deref(), live.default.as_deref()) {
        out.push("default");
    }
    if !foreign_keys_match(col.references.as_ref(), live.references.as_ref()) {
        out.push("foreign key");
    }
    out
}

fn foreign_keys_match(spec: Option<&ForeignKeyRef>, live: Option<&LiveForeignKey>) -> bool {
    match (spec, live) {
        (None, None) => true,
        (Some(s), Some(l)) => {
            s.table.matches(&l.table)
                && l.column.as_deref().map_or(true, |c| s.column.matches(c))
                && delete_action(s.on_delete.as_deref()) == delete_action(l.on_delete.as_deref())
        }
        _ => false,
    }
}

fn delete_action(action: Option<&str>) -> String {
    match action {
        Some(a) if !a.trim().is_empty() => a
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase(),
        _ => "NO ACTION".to_string(),
    }
}

/// Declared and live types agree. SQLite stores an integer primary key as the
/// rowid alias `INTEGER` whatever integer width was declared.
fn same_type(col: &ColumnSpec, live: &LiveColumn) -> bool {
    if col.primary_key
        && live.primary_key
        && is_integer_type(&col.data_type)
        && is_integer_type(&live.data_type)
    {
        return true;
    }
    canonical_type(&col.data_type) == canonical_type(&live.data_type)
}

/// Definition used to carry a preserved live column through a rebuild
fn preserved_column(
    spec: &TableSpec,
    live: &LiveColumn,
    spec_has_pk: bool,
) -> CoreResult<ColumnSpec> {
    let name = ColumnName::try_new(live.name.clone()).ok_or_else(|| CoreError::SpecInvalid {
        table: spec.name.to_string(),
        message: "live table has a column with an empty name".to_string(),
    })?;
    let primary_key = live.primary_key && !spec_has_pk && is_integer_type(&live.data_type);
    let references = live.references.as_ref().and_then(|fk| {
        let table = TableName::try_new(fk.table.clone())?;
        let column = ColumnName::try_new(fk.column.clone()?)?;
        Some(ForeignKeyRef {
            table,
            column,
            on_delete: fk.on_delete.clone(),
        })
    });
    Ok(ColumnSpec {
        name,
        data_type: live.data_type.clone(),
        nullable: !live.not_null && !primary_key,
        default: live.default.clone(),
        primary_key,
        unique: live.unique && !primary_key,
        references: references.filter(|_| !primary_key),
    })
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
