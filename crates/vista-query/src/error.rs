//! Error types for query compilation and planning

use thiserror::Error;

/// Errors compiling a single runtime filter into a predicate.
///
/// These reject one request only; the widget stays usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("unknown operator in filter '{filter}':{operator}")]
    UnknownOperator { filter: String, operator: String },

    #[error("filter operator '{operator}' requires at least two values")]
    NotEnoughValues { operator: String },

    #[error("filter '{filter}' has no values")]
    MissingValue { filter: String },

    #[error("invalid unix timestamp {value:?}")]
    InvalidTimestamp { value: String },
}

/// Errors building the final statement for a widget
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("widget has no sql query")]
    MissingQuery,

    #[error("base query is empty")]
    EmptyQuery,

    #[error("base query cannot be wrapped: {0}")]
    MalformedQuery(String),

    #[error("limit {0} is out of range")]
    LimitOutOfRange(usize),
}

/// Errors surfaced by a data provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Setup problem (missing driver/dsn, unsupported driver)
    #[error("{0}")]
    Config(String),

    #[error("sql provider not configured")]
    NotConfigured,

    #[error("sql provider missing query")]
    MissingQuery,

    #[error("build query: {0}")]
    Build(#[from] BuildError),

    /// Connection or statement failure, message passed through verbatim
    #[error("execute query: {0}")]
    Execute(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;
