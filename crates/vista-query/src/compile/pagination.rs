//! Keyset pagination.
//!
//! The cursor is the literal value of the pagination column from the last
//! row of the previous page. Ties on that column are not handled.

use super::Predicate;
use serde_json::Value;
use vista_config::PaginationSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than `desc` (case-insensitive) reads as ascending
    pub fn from_config(order: &str) -> Self {
        if order.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    fn comparison(self) -> &'static str {
        match self {
            SortOrder::Asc => ">",
            SortOrder::Desc => "<",
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// What pagination contributes to a statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageBound {
    pub predicate: Option<Predicate>,
    /// Replaces the base query's own ordering when present
    pub order_by: Option<String>,
}

/// Plan the keyset bound for `cursor`.
///
/// No spec, an empty column or an empty cursor yields an empty bound, which
/// leaves the base query's ordering in place.
pub fn plan_pagination(spec: Option<&PaginationSpec>, cursor: &str) -> PageBound {
    let Some(spec) = spec.filter(|spec| !spec.column.is_empty()) else {
        return PageBound::default();
    };
    if cursor.is_empty() {
        return PageBound::default();
    }

    let order = SortOrder::from_config(&spec.order);
    PageBound {
        predicate: Some(Predicate::new(
            format!("{} {} ?", spec.column, order.comparison()),
            vec![Value::String(cursor.to_string())],
        )),
        order_by: Some(format!("{} {}", spec.column, order.keyword())),
    }
}
