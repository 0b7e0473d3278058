//! Configuration tree for pages, widgets and the providers behind them.
//!
//! Everything here is deserialized once at startup and shared read-only
//! afterwards, so the types are plain data with no interior mutability.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Root of a vista configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub title: String,

    /// Mount point for the HTTP surface (e.g. `/admin`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path_prefix: String,

    /// Named data providers; never serialized because they carry DSNs
    #[serde(default, skip_serializing)]
    pub providers: BTreeMap<String, ProviderConfig>,

    #[serde(default)]
    pub menu: Vec<MenuItem>,

    #[serde(default)]
    pub pages: Vec<Page>,
}

impl AppConfig {
    /// Find a widget by id, scanning pages in declaration order
    pub fn find_widget(&self, id: &str) -> Option<&Widget> {
        self.pages
            .iter()
            .flat_map(|page| page.widgets.iter())
            .find(|widget| widget.id == id)
    }
}

/// Connection settings for one named provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub sql: Option<SqlProviderConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqlProviderConfig {
    #[serde(default)]
    pub driver: String,
    #[serde(default)]
    pub dsn: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

/// A configured data view backed by one provider query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Widget {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Excluded from serialization: exposing it would leak the query
    #[serde(default, skip_serializing)]
    pub provider: ProviderSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableSpec>,
}

impl Widget {
    pub fn sql(&self) -> Option<&SqlSpec> {
        self.provider.sql.as_ref()
    }

    /// Filters declared on the widget's table, empty when it has none
    pub fn filters(&self) -> &[FilterSpec] {
        self.table
            .as_ref()
            .map(|table| table.filters.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sql: Option<SqlSpec>,
}

/// The query half of a widget
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqlSpec {
    /// Arbitrary SELECT; may carry its own ORDER BY
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub pagination: Option<PaginationSpec>,
    /// Column name to declared type
    #[serde(default)]
    pub types: BTreeMap<String, DataType>,
}

impl SqlSpec {
    pub fn type_of(&self, column: &str) -> Option<DataType> {
        self.types.get(column).copied()
    }

    /// Pagination column if one is declared and non-empty
    pub fn pagination_column(&self) -> Option<&str> {
        self.pagination
            .as_ref()
            .map(|pagination| pagination.column.as_str())
            .filter(|column| !column.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationSpec {
    #[serde(default)]
    pub column: String,
    /// `asc` or `desc`; anything else reads as `asc`
    #[serde(default)]
    pub order: String,
}

/// Declared column type.
///
/// Only `json_array` changes behavior; every other name is a plain scalar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    #[default]
    Scalar,
    JsonArray,
}

impl From<String> for DataType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json_array" | "jsonarray" => DataType::JsonArray,
            _ => DataType::Scalar,
        }
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        match value {
            DataType::Scalar => "scalar".to_string(),
            DataType::JsonArray => "json_array".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSpec {
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterSpec>,
}

/// Table column; a bare string in YAML means `id == title`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnSpec {
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render: Option<ColumnRender>,
}

impl<'de> Deserialize<'de> for ColumnSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawColumn {
            Id(String),
            Full {
                id: String,
                #[serde(default)]
                title: String,
                #[serde(default)]
                render: Option<ColumnRender>,
            },
        }

        Ok(match RawColumn::deserialize(deserializer)? {
            RawColumn::Id(id) => ColumnSpec {
                title: id.clone(),
                id,
                render: None,
            },
            RawColumn::Full { id, title, render } => ColumnSpec {
                title: if title.is_empty() { id.clone() } else { title },
                id,
                render,
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnRender {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
}

/// A named, request-addressable filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Request-facing key
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// text, number, date, datetime, select_multi, ...
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Column expression the filter applies to
    #[serde(default, alias = "column")]
    pub target: String,
    /// Forces a specific operator when the request names none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operators: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ValueOption>,
}

impl FilterSpec {
    pub fn is_select_multi(&self) -> bool {
        self.kind == "select_multi"
    }

    pub fn is_datetime(&self) -> bool {
        self.kind == "datetime"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueOption {
    pub value: String,
    #[serde(default)]
    pub label: String,
}
