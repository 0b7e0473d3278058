//! `Provider` implementation backed by SQLite

use crate::config::SqliteConfig;
use crate::connection::SqlitePool;
use crate::error::SqliteResult;
use async_trait::async_trait;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};
use vista_config::{DataType, ProviderConfig, Widget};
use vista_query::{
    build_query, finish_page, normalize_row, Cell, DataRequest, DataResponse, Dialect, Provider,
    ProviderError, ProviderResult, RenderedQuery, Row,
};

/// Driver names accepted in provider configuration
pub const DRIVERS: &[&str] = &["sqlite", "sqlite3"];

/// SQL provider for SQLite databases
#[derive(Clone, Default)]
pub struct SqlProvider {
    pool: Option<SqlitePool>,
}

impl SqlProvider {
    /// Unconfigured provider; call [`Provider::init`] before fetching
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider over an already-open pool; `init` becomes a no-op
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool: Some(pool) }
    }

    pub fn dialect(&self) -> Dialect {
        Dialect::SQLITE
    }
}

#[async_trait]
impl Provider for SqlProvider {
    async fn init(&mut self, name: &str, config: &ProviderConfig) -> ProviderResult<()> {
        if self.pool.is_some() {
            return Ok(());
        }

        let sql = config
            .sql
            .as_ref()
            .ok_or_else(|| ProviderError::Config(format!("sql provider {} missing config", name)))?;

        let driver = sql.driver.trim();
        let dsn = sql.dsn.trim();
        if driver.is_empty() {
            return Err(ProviderError::Config(format!(
                "sql provider {} missing driver",
                name
            )));
        }
        if dsn.is_empty() {
            return Err(ProviderError::Config(format!(
                "sql provider {} missing dsn",
                name
            )));
        }
        if !DRIVERS.contains(&driver.to_ascii_lowercase().as_str()) {
            return Err(ProviderError::Config(format!(
                "sql provider {} unsupported driver {:?}",
                name, driver
            )));
        }

        let config = SqliteConfig::from_dsn(dsn);
        let pool = tokio::task::spawn_blocking(move || SqlitePool::new(config))
            .await
            .map_err(|e| ProviderError::Config(e.to_string()))?
            .map_err(|e| ProviderError::Config(format!("sql provider {} open: {}", name, e)))?;

        info!(provider = name, path = ?pool.config().path, "SQL provider ready");
        self.pool = Some(pool);
        Ok(())
    }

    async fn fetch(&self, widget: &Widget, request: &DataRequest) -> ProviderResult<DataResponse> {
        let pool = self.pool.as_ref().ok_or(ProviderError::NotConfigured)?;
        let sql = widget.sql().ok_or(ProviderError::MissingQuery)?;

        let query = build_query(widget, request, &self.dialect())?;
        let types = sql.types.clone();
        let rows = pool.read(move |conn| query_rows(conn, &query, &types)).await?;

        let fetched = rows.len();
        let response = finish_page(rows, request.limit, sql.pagination_column());
        debug!(
            widget = %widget.id,
            fetched,
            returned = response.total,
            has_more = response.has_more,
            "Fetched widget page"
        );
        Ok(response)
    }
}

fn query_rows(
    conn: &Connection,
    query: &RenderedQuery,
    types: &BTreeMap<String, DataType>,
) -> SqliteResult<Vec<Row>> {
    let mut stmt = conn.prepare(&query.sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = stmt.query(params_from_iter(query.args.iter().map(bind_value)))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            cells.push((column.clone(), cell_from(row.get_ref(index)?)));
        }
        out.push(normalize_row(cells, types));
    }
    Ok(out)
}

fn bind_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => SqlValue::Integer(i),
            (None, Some(f)) => SqlValue::Real(f),
            (None, None) => SqlValue::Text(n.to_string()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn cell_from(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => Cell::Null,
        ValueRef::Integer(i) => Cell::Integer(i),
        ValueRef::Real(f) => Cell::Real(f),
        ValueRef::Text(bytes) => Cell::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Cell::Blob(bytes.to_vec()),
    }
}
