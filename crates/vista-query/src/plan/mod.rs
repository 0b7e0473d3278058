//! Query planning for a widget and a runtime request.
//!
//! 1. strip the terminator and outer `ORDER BY` from the base query
//! 2. wrap it as `SELECT * FROM (<base>) AS src`
//! 3. compile each matching runtime filter into a predicate
//! 4. add the keyset bound; its ordering overrides the base ordering
//! 5. request `limit + 1` rows so the caller can detect a further page

mod order_by;

pub use order_by::{split_order_by, SplitQuery};

use crate::compile::{compile_filter, plan_pagination, Predicate};
use crate::dialect::Dialect;
use crate::error::{BuildError, CompileError};
use crate::render::{RenderedQuery, SelectStatement};
use crate::request::{DataRequest, Filter};
use std::collections::HashMap;
use tracing::debug;
use vista_config::{FilterSpec, SqlSpec, Widget};

/// Build the parameterized statement for one fetch
pub fn build_query(
    widget: &Widget,
    request: &DataRequest,
    dialect: &Dialect,
) -> Result<RenderedQuery, BuildError> {
    let sql = widget.sql().ok_or(BuildError::MissingQuery)?;
    let split = split_order_by(&sql.query)?;

    let mut statement = SelectStatement::wrap(split.base);
    for predicate in filter_predicates(widget.filters(), sql, &request.filters, dialect)? {
        statement = statement.and_where(predicate);
    }

    let bound = plan_pagination(sql.pagination.as_ref(), &request.cursor);
    if let Some(predicate) = bound.predicate {
        statement = statement.and_where(predicate);
    }
    if let Some(order_by) = bound.order_by.or_else(|| split.order_by.map(str::to_string)) {
        statement = statement.order_by(order_by);
    }

    if request.limit > 0 {
        statement = statement.limit(overfetch_limit(request.limit)?);
    }

    let rendered = statement.to_sql(dialect);
    debug!(
        widget = %widget.id,
        dialect = dialect.name,
        sql = %rendered.sql,
        args = ?rendered.args,
        "Planned widget query"
    );
    Ok(rendered)
}

/// `limit + 1`, kept within the signed 64-bit range SQL engines accept.
/// The extra row only tells the caller whether another page exists.
fn overfetch_limit(limit: usize) -> Result<u64, BuildError> {
    u64::try_from(limit)
        .ok()
        .and_then(|limit| limit.checked_add(1))
        .filter(|limit| i64::try_from(*limit).is_ok())
        .ok_or(BuildError::LimitOutOfRange(limit))
}

/// Compile runtime filters against the widget's filter specs.
///
/// Filters naming no spec, specs without a target, and filters without
/// values are skipped silently.
pub fn filter_predicates(
    specs: &[FilterSpec],
    sql: &SqlSpec,
    filters: &[Filter],
    dialect: &Dialect,
) -> Result<Vec<Predicate>, CompileError> {
    let index: HashMap<&str, &FilterSpec> =
        specs.iter().map(|spec| (spec.id.as_str(), spec)).collect();

    let mut predicates = Vec::with_capacity(filters.len());
    for filter in filters {
        let Some(spec) = index.get(filter.name.as_str()) else {
            continue;
        };
        if spec.target.is_empty() || filter.values.is_empty() {
            continue;
        }

        predicates.push(compile_filter(
            spec,
            filter,
            dialect,
            sql.type_of(&spec.target),
        )?);
    }

    Ok(predicates)
}
