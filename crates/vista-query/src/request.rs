//! Per-call request and response types, and query-string parsing

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Page size used when a request does not name one
pub const DEFAULT_LIMIT: usize = 50;

/// Largest page size accepted from a query string; larger values are clamped
pub const MAX_LIMIT: usize = 10_000;

/// One result row: column name to normalized value
pub type Row = Map<String, Value>;

/// Runtime parameters for a single fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataRequest {
    /// Page size; 0 means unlimited
    pub limit: usize,
    /// Opaque cursor from a previous page; empty for the first page
    pub cursor: String,
    pub filters: Vec<Filter>,
}

/// A runtime filter value addressed to a widget filter by id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub name: String,
    /// Explicit operator token; overrides every configured default
    pub operator: Option<String>,
    pub values: Vec<String>,
}

impl Filter {
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            operator: None,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataResponse {
    pub data: Vec<Row>,
    /// Rows actually returned, after dropping the overfetch row
    pub total: usize,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub next_cursor: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_more: bool,
}

/// Build a [`DataRequest`] from decoded query-string pairs.
///
/// `limit`, `offset` and `cursor` are reserved. Any other key is a filter,
/// either `<id>` or `<id>.<operator>` (split at the last dot). Repeated keys
/// accumulate values in encounter order; empty values are dropped.
pub fn parse_query_pairs<I, K, V>(pairs: I) -> DataRequest
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut limit: Option<usize> = None;
    let mut cursor: Option<String> = None;
    let mut filters: Vec<Filter> = Vec::new();

    for (key, value) in pairs {
        let (key, value) = (key.as_ref(), value.as_ref());
        match key {
            "limit" => {
                if limit.is_none() {
                    limit = Some(
                        value
                            .trim()
                            .parse::<usize>()
                            .map_or(DEFAULT_LIMIT, |limit| limit.min(MAX_LIMIT)),
                    );
                }
            }
            "offset" | "cursor" => {
                if cursor.is_none() {
                    cursor = Some(value.to_string());
                }
            }
            _ => {
                let (name, operator) = match key.rfind('.') {
                    Some(dot) => (&key[..dot], Some(&key[dot + 1..])),
                    None => (key, None),
                };
                if name.is_empty() {
                    continue;
                }
                let operator = operator.filter(|op| !op.is_empty()).map(str::to_string);

                let index = match filters
                    .iter()
                    .position(|f| f.name == name && f.operator == operator)
                {
                    Some(index) => index,
                    None => {
                        filters.push(Filter {
                            name: name.to_string(),
                            operator,
                            values: Vec::new(),
                        });
                        filters.len() - 1
                    }
                };

                if !value.is_empty() {
                    filters[index].values.push(value.to_string());
                }
            }
        }
    }

    DataRequest {
        limit: limit.unwrap_or(DEFAULT_LIMIT),
        cursor: cursor.unwrap_or_default(),
        filters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_defaults() {
        let request = parse_query_pairs(Vec::<(&str, &str)>::new());
        assert_eq!(request.limit, DEFAULT_LIMIT);
        assert_eq!(request.cursor, "");
        assert!(request.filters.is_empty());
    }

    #[test]
    fn test_parse_reserved_keys() {
        let request = parse_query_pairs([("limit", "10"), ("offset", "42")]);
        assert_eq!(request.limit, 10);
        assert_eq!(request.cursor, "42");
        assert!(request.filters.is_empty());

        let request = parse_query_pairs([("cursor", "abc"), ("limit", "0")]);
        assert_eq!(request.cursor, "abc");
        assert_eq!(request.limit, 0);
    }

    #[test]
    fn test_parse_bad_limit_falls_back() {
        assert_eq!(parse_query_pairs([("limit", "-3")]).limit, DEFAULT_LIMIT);
        assert_eq!(parse_query_pairs([("limit", "ten")]).limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_parse_huge_limit_is_clamped() {
        for raw in ["18446744073709551615", "9223372036854775807", "10001"] {
            assert_eq!(parse_query_pairs([("limit", raw)]).limit, MAX_LIMIT, "{raw}");
        }
        assert_eq!(parse_query_pairs([("limit", "10000")]).limit, MAX_LIMIT);
        // Beyond usize entirely
        assert_eq!(
            parse_query_pairs([("limit", "99999999999999999999999")]).limit,
            DEFAULT_LIMIT
        );
    }

    #[test]
    fn test_parse_filters_grouped_in_order() {
        let request = parse_query_pairs([
            ("status", "vip"),
            ("created.between", "2024-01-01"),
            ("status", "active"),
            ("created.between", "2024-01-31"),
            ("name.contains", ""),
        ]);

        assert_eq!(
            request.filters,
            vec![
                Filter::new("status", ["vip", "active"]),
                Filter::new("created", ["2024-01-01", "2024-01-31"]).with_operator("between"),
                Filter::new("name", Vec::<String>::new()).with_operator("contains"),
            ]
        );
    }

    #[test]
    fn test_parse_splits_at_last_dot() {
        let request = parse_query_pairs([("meta.owner.eq", "ann"), (".eq", "x"), ("tag.", "y")]);

        assert_eq!(request.filters.len(), 2);
        assert_eq!(request.filters[0].name, "meta.owner");
        assert_eq!(request.filters[0].operator.as_deref(), Some("eq"));
        assert_eq!(request.filters[1].name, "tag");
        assert_eq!(request.filters[1].operator, None);
    }

    #[test]
    fn test_response_serialization_omits_defaults() {
        let response = DataResponse::default();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "data": [], "total": 0 })
        );

        let mut row = Row::new();
        row.insert("id".into(), json!(1));
        let response = DataResponse {
            data: vec![row],
            total: 1,
            next_cursor: "1".into(),
            has_more: true,
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "data": [{ "id": 1 }], "total": 1, "next_cursor": "1", "has_more": true })
        );
    }
}
