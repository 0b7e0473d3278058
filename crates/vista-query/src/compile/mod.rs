//! Compilation of widget filters and pagination into predicates.
//!
//! A [`Predicate`] is a SQL fragment that uses `?` for every bound argument;
//! the renderer numbers the markers for the target dialect.

mod filter;
mod pagination;

pub use filter::{compile_filter, resolve_operator, FilterOperator};
pub use pagination::{plan_pagination, PageBound, SortOrder};

use serde_json::Value;

/// A single boolean condition plus its positional arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Fragment with one `?` per argument, in emission order
    pub sql: String,
    pub args: Vec<Value>,
}

impl Predicate {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }
}

/// `?,?,?` for `count` arguments
pub(crate) fn markers(count: usize) -> String {
    vec!["?"; count].join(",")
}
