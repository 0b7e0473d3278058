//! # vista configuration
//!
//! Types describing pages, widgets, filters and providers, plus the YAML
//! loader that produces them.
//!
//! ```rust,no_run
//! let config = vista_config::load("vista.yaml")?;
//! let widget = config.find_widget("customers");
//! # Ok::<(), vista_config::ConfigError>(())
//! ```
//!
//! Provider `driver` and `dsn` values may reference environment variables
//! with `{{env.NAME}}`; loading fails if any referenced variable is unset.

mod env;
mod error;
mod loader;
mod types;

pub use env::{resolve_env, resolve_with};
pub use error::{ConfigError, ConfigResult};
pub use loader::{from_yaml_str, load};
pub use types::*;
