//! Query composition and result normalization for vista widgets.
//!
//! A widget declares a base SQL query, filter definitions and an optional
//! keyset pagination column. For each request this crate:
//!
//! - compiles runtime filters into parameterized predicates ([`compile`])
//! - wraps the base query and appends predicates, ordering and an
//!   overfetching limit ([`plan`], [`render`])
//! - turns raw rows into JSON and derives `has_more`/`next_cursor`
//!   ([`normalize`])
//!
//! Concrete databases plug in through the [`Provider`] trait.

pub mod compile;
pub mod dialect;
pub mod error;
pub mod normalize;
pub mod plan;
pub mod provider;
pub mod render;
pub mod request;

pub use compile::{
    compile_filter, plan_pagination, resolve_operator, FilterOperator, PageBound, Predicate,
    SortOrder,
};
pub use dialect::{Dialect, Placeholder};
pub use error::{BuildError, CompileError, ProviderError, ProviderResult};
pub use normalize::{cursor_value, finish_page, normalize_row, Cell};
pub use plan::{build_query, filter_predicates, split_order_by, SplitQuery};
pub use provider::{Provider, ProviderRegistry};
pub use render::{RenderedQuery, SelectStatement};
pub use request::{
    parse_query_pairs, DataRequest, DataResponse, Filter, Row, DEFAULT_LIMIT, MAX_LIMIT,
};
