//! Result normalization.
//!
//! Raw driver values arrive as [`Cell`]s. Binary values become text, and
//! text in `json_array` columns is parsed when it holds a JSON array or
//! object. Text that does not parse is kept as-is: such columns may
//! legitimately hold plain text.

use crate::request::{DataResponse, Row};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use vista_config::DataType;

/// A value as read from the database, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<Cell> for Value {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Null => Value::Null,
            Cell::Integer(n) => Value::from(n),
            Cell::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
            Cell::Text(text) => Value::String(text),
            Cell::Blob(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

/// Normalize one raw row using the widget's declared column types
pub fn normalize_row<I>(cells: I, types: &BTreeMap<String, DataType>) -> Row
where
    I: IntoIterator<Item = (String, Cell)>,
{
    cells
        .into_iter()
        .map(|(column, cell)| {
            let value = Value::from(cell);
            let value = match types.get(&column) {
                Some(DataType::JsonArray) => parse_json_text(value),
                _ => value,
            };
            (column, value)
        })
        .collect()
}

fn parse_json_text(value: Value) -> Value {
    let Value::String(text) = &value else {
        return value;
    };
    if text.is_empty() {
        return value;
    }

    match serde_json::from_str::<Value>(text) {
        Ok(parsed @ (Value::Array(_) | Value::Object(_))) => parsed,
        _ => value,
    }
}

/// Turn an overfetched row buffer into a response.
///
/// With `limit > 0`, a buffer longer than `limit` means another page exists:
/// the extra row is dropped and `has_more` is set. Only then is a next
/// cursor emitted, read from the last returned row and never from the
/// dropped one.
pub fn finish_page(mut rows: Vec<Row>, limit: usize, cursor_column: Option<&str>) -> DataResponse {
    let mut has_more = false;
    if limit > 0 && rows.len() > limit {
        has_more = true;
        rows.truncate(limit);
    }

    let next_cursor = match (has_more, cursor_column, rows.last()) {
        (true, Some(column), Some(last)) => cursor_value(last, column),
        _ => String::new(),
    };

    DataResponse {
        total: rows.len(),
        data: rows,
        next_cursor,
        has_more,
    }
}

/// String form of a row's cursor column; empty when missing or null
pub fn cursor_value(row: &Row, column: &str) -> String {
    match row.get(column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
