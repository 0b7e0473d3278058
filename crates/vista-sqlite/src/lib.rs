//! SQLite data provider for vista
//!
//! Implements [`vista_query::Provider`] over a single rusqlite connection.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vista_query::{parse_query_pairs, Provider};
//! use vista_sqlite::SqlProvider;
//!
//! let mut provider = SqlProvider::new();
//! provider.init("main", &config.providers["main"]).await?;
//!
//! let request = parse_query_pairs([("limit", "20"), ("status", "active")]);
//! let page = provider.fetch(widget, &request).await?;
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod provider;

// Re-exports
pub use config::SqliteConfig;
pub use connection::SqlitePool;
pub use error::{SqliteError, SqliteResult};
pub use provider::{SqlProvider, DRIVERS};
