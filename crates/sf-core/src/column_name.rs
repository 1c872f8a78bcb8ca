//! Strongly-typed column name.

use crate::newtype_string::define_newtype_string;

define_newtype_string! {
    /// A non-empty column name.
    pub struct ColumnName;
}

#[cfg(test)]
#[path = "column_name_test.rs"]
mod tests;
