//! Strongly-typed table name.

use crate::newtype_string::define_newtype_string;

define_newtype_string! {
    /// A non-empty table name.
    ///
    /// Prevents accidental mixing of table names with column names or raw SQL.
    pub struct TableName;
}
