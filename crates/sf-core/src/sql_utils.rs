//! SQL identifier quoting and declared-type utilities
//!
//! Provides safe quoting for identifiers when building DDL dynamically, plus
//! the comparisons the planner needs to decide whether a live column already
//! matches its declaration (types, defaults, literals).

/// Quote a SQL identifier to prevent injection.
///
/// Wraps the identifier in double quotes and escapes any embedded double quotes
/// by doubling them, following the SQL standard.
///
/// # Examples
/// ```
/// use sf_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("pacientes"), r#""pacientes""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Escape a SQL string literal value by doubling single quotes.
///
/// This is for use inside single-quoted SQL string literals, not identifiers.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Fold a declared column type into its canonical form.
///
/// Stores normalize declared types differently (DuckDB reports `VARCHAR` for
/// `TEXT` and `TIMESTAMP` for `DATETIME`; SQLite echoes whatever was written),
/// so type comparisons go through this function. Synonymous base names fold
/// to one family. Parameters are kept, except on text types where a length
/// is not enforced by either store. A bare `DECIMAL` takes DuckDB's implicit
/// `(18,3)`. Unknown types are returned upper-cased with whitespace
/// collapsed.
///
/// # Examples
/// ```
/// use sf_core::sql_utils::canonical_type;
/// assert_eq!(canonical_type("varchar(50)"), "TEXT");
/// assert_eq!(canonical_type("DATETIME"), canonical_type("timestamp"));
/// assert_eq!(canonical_type("INT"), "INTEGER");
/// assert_eq!(canonical_type("numeric(10, 2)"), "DECIMAL(10,2)");
/// ```
pub fn canonical_type(declared: &str) -> String {
    let (family, params) = split_type(declared);
    match (family.as_str(), params) {
        ("TEXT", _) => family,
        ("DECIMAL", None) => "DECIMAL(18,3)".to_string(),
        (_, Some(p)) => format!("{family}({p})"),
        (_, None) => family,
    }
}

/// Base family and normalized parameter list of a declared type
fn split_type(declared: &str) -> (String, Option<String>) {
    let collapsed = declared
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();
    let (base, params) = match collapsed.find('(') {
        Some(pos) => {
            let inner = collapsed[pos + 1..].trim_end_matches(')');
            let params: String = inner.chars().filter(|c| !c.is_whitespace()).collect();
            (collapsed[..pos].trim_end(), Some(params))
        }
        None => (collapsed.as_str(), None),
    };
    let family = match base {
        "TEXT" | "VARCHAR" | "CHAR" | "CHARACTER" | "CHARACTER VARYING" | "STRING" | "NVARCHAR"
        | "NCHAR" | "CLOB" | "BPCHAR" => "TEXT",
        "INT" | "INTEGER" | "INT4" | "SIGNED" | "MEDIUMINT" => "INTEGER",
        "BIGINT" | "INT8" | "LONG" => "BIGINT",
        "SMALLINT" | "INT2" | "SHORT" => "SMALLINT",
        "TINYINT" | "INT1" => "TINYINT",
        "REAL" | "FLOAT" | "FLOAT4" => "REAL",
        "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" => "DOUBLE",
        "NUMERIC" | "DECIMAL" => "DECIMAL",
        "BOOLEAN" | "BOOL" | "LOGICAL" => "BOOLEAN",
        "DATETIME" | "TIMESTAMP" => "TIMESTAMP",
        "BLOB" | "BYTEA" | "BINARY" | "VARBINARY" => "BLOB",
        other => other,
    };
    (family.to_string(), params.filter(|p| !p.is_empty()))
}

/// Whether a declared type belongs to the integer family.
pub fn is_integer_type(declared: &str) -> bool {
    matches!(
        split_type(declared).0.as_str(),
        "INTEGER" | "BIGINT" | "SMALLINT" | "TINYINT"
    )
}

/// Whether a default expression is a constant literal.
///
/// SQLite refuses `ALTER TABLE ADD COLUMN` with a non-constant default
/// (`CURRENT_TIMESTAMP`, parenthesized expressions), so only columns whose
/// default passes this check are eligible for in-place addition.
pub fn is_constant_literal(expr: &str) -> bool {
    let e = expr.trim();
    if e.is_empty() {
        return false;
    }
    if ["NULL", "TRUE", "FALSE"]
        .iter()
        .any(|kw| e.eq_ignore_ascii_case(kw))
    {
        return true;
    }
    if e.len() >= 2 && e.starts_with('\'') && e.ends_with('\'') {
        let inner = &e[1..e.len() - 1];
        return !inner.replace("''", "").contains('\'');
    }
    let unsigned = e.trim_start_matches(['+', '-']);
    unsigned
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.')
        && unsigned.parse::<f64>().is_ok()
}

/// Compare two default expressions for equivalence.
///
/// `None` and an explicit `NULL` are the same default. One layer of enclosing
/// parentheses is ignored, since SQLite reports `DEFAULT (expr)` as `expr`.
/// Expressions containing string literals compare exactly; everything else
/// compares case-insensitively.
pub fn defaults_equivalent(a: Option<&str>, b: Option<&str>) -> bool {
    match (normalize_default(a), normalize_default(b)) {
        (None, None) => true,
        (Some(x), Some(y)) => {
            if x.contains('\'') || y.contains('\'') {
                x == y
            } else {
                x.eq_ignore_ascii_case(y)
            }
        }
        _ => false,
    }
}

fn normalize_default(expr: Option<&str>) -> Option<&str> {
    let e = strip_outer_parens(expr?.trim());
    if e.is_empty() || e.eq_ignore_ascii_case("NULL") {
        None
    } else {
        Some(e)
    }
}

fn strip_outer_parens(expr: &str) -> &str {
    if !(expr.starts_with('(') && expr.ends_with(')')) {
        return expr;
    }
    // The opening paren must close at the very end, otherwise "(a) + (b)"
    // would lose its structure.
    let mut depth = 0usize;
    for (i, c) in expr.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i != expr.len() - 1 {
                    return expr;
                }
            }
            _ => {}
        }
    }
    expr[1..expr.len() - 1].trim()
}

#[cfg(test)]
#[path = "sql_utils_test.rs"]
mod tests;
