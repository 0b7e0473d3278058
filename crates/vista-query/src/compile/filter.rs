//! Filter condition compiler.
//!
//! Turns one configured [`FilterSpec`] and one runtime [`Filter`] into a
//! [`Predicate`] for the target [`Dialect`]. Pure: no I/O, no shared state.

use super::{markers, Predicate};
use crate::dialect::Dialect;
use crate::error::CompileError;
use crate::request::Filter;
use serde_json::Value;
use tracing::debug;
use vista_config::{DataType, FilterSpec};

/// The closed set of operators a filter may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Gt,
    Lt,
    After,
    Before,
    Contains,
    Between,
    In,
}

impl FilterOperator {
    /// Parse an operator token, ignoring case and surrounding whitespace
    pub fn parse(token: &str) -> Option<Self> {
        let operator = match token.trim().to_ascii_lowercase().as_str() {
            "eq" => FilterOperator::Eq,
            "gt" => FilterOperator::Gt,
            "lt" => FilterOperator::Lt,
            "after" => FilterOperator::After,
            "before" => FilterOperator::Before,
            "contains" => FilterOperator::Contains,
            "between" => FilterOperator::Between,
            "in" => FilterOperator::In,
            _ => return None,
        };
        Some(operator)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Gt => "gt",
            FilterOperator::Lt => "lt",
            FilterOperator::After => "after",
            FilterOperator::Before => "before",
            FilterOperator::Contains => "contains",
            FilterOperator::Between => "between",
            FilterOperator::In => "in",
        }
    }
}

/// Pick the operator token for a runtime filter.
///
/// First match wins: explicit request operator, the filter's `mode`, `in` for
/// `select_multi` filters, the only entry of `operators`, then `eq`.
pub fn resolve_operator<'a>(spec: &'a FilterSpec, value: &'a Filter) -> &'a str {
    if let Some(operator) = value.operator.as_deref().filter(|op| !op.is_empty()) {
        return operator;
    }
    if let Some(mode) = spec.mode.as_deref().filter(|mode| !mode.is_empty()) {
        return mode;
    }
    if spec.is_select_multi() {
        return FilterOperator::In.as_str();
    }
    if let [only] = spec.operators.as_slice() {
        return only;
    }
    FilterOperator::Eq.as_str()
}

/// Compile one runtime filter into a predicate over `spec.target`
pub fn compile_filter(
    spec: &FilterSpec,
    value: &Filter,
    dialect: &Dialect,
    type_hint: Option<DataType>,
) -> Result<Predicate, CompileError> {
    let token = resolve_operator(spec, value);
    let values = coerce_values(spec, &value.values)?;
    let operator =
        FilterOperator::parse(token).ok_or_else(|| CompileError::UnknownOperator {
            filter: value.name.clone(),
            operator: token.to_string(),
        })?;

    let column = spec.target.as_str();
    let json_array = type_hint == Some(DataType::JsonArray);
    let first = || {
        values.first().cloned().ok_or_else(|| CompileError::MissingValue {
            filter: value.name.clone(),
        })
    };

    let predicate = match operator {
        FilterOperator::Eq => Predicate::new(format!("{} = ?", column), vec![first()?]),
        FilterOperator::Gt | FilterOperator::After => {
            Predicate::new(format!("{} > ?", column), vec![first()?])
        }
        FilterOperator::Lt | FilterOperator::Before => {
            Predicate::new(format!("{} < ?", column), vec![first()?])
        }
        FilterOperator::Contains => contains(column, &first()?, dialect, json_array),
        FilterOperator::Between => {
            if values.len() < 2 {
                return Err(CompileError::NotEnoughValues {
                    operator: operator.as_str().to_string(),
                });
            }
            Predicate::new(
                format!("{} BETWEEN ? AND ?", column),
                vec![values[0].clone(), values[1].clone()],
            )
        }
        FilterOperator::In => {
            if values.is_empty() {
                return Err(CompileError::MissingValue {
                    filter: value.name.clone(),
                });
            }
            membership(column, values, dialect, json_array)
        }
    };

    Ok(predicate)
}

/// `datetime` filters carry unix timestamps; everything else stays text
fn coerce_values(spec: &FilterSpec, values: &[String]) -> Result<Vec<Value>, CompileError> {
    if !spec.is_datetime() {
        return Ok(values.iter().cloned().map(Value::String).collect());
    }

    values
        .iter()
        .map(|raw| {
            raw.trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| CompileError::InvalidTimestamp { value: raw.clone() })
        })
        .collect()
}

fn contains(column: &str, needle: &Value, dialect: &Dialect, json_array: bool) -> Predicate {
    let pattern = Value::String(format!("%{}%", plain_text(needle)));

    if json_array {
        if dialect.json_each {
            return Predicate::new(
                format!(
                    "EXISTS(SELECT 1 FROM json_each({}) WHERE value {} ?)",
                    column, dialect.like_operator
                ),
                vec![pattern],
            );
        }
        debug!(
            column,
            dialect = dialect.name,
            "json_each unavailable, matching raw column text"
        );
    }

    Predicate::new(format!("{} {} ?", column, dialect.like_operator), vec![pattern])
}

fn membership(column: &str, values: Vec<Value>, dialect: &Dialect, json_array: bool) -> Predicate {
    let placeholders = markers(values.len());

    if json_array {
        if dialect.json_each {
            return Predicate::new(
                format!(
                    "EXISTS(SELECT 1 FROM json_each({}) WHERE value IN ({}))",
                    column, placeholders
                ),
                values,
            );
        }
        debug!(
            column,
            dialect = dialect.name,
            "json_each unavailable, testing raw column membership"
        );
    }

    Predicate::new(format!("{} IN ({})", column, placeholders), values)
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
