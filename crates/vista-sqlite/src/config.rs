//! Connection settings derived from a provider DSN

use std::path::{Path, PathBuf};

const MEMORY_PATH: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    /// Database file, or `:memory:`
    pub path: PathBuf,
    pub busy_timeout_ms: u32,
    /// Negative values are KiB, positive values are pages
    pub cache_size: i32,
    /// Open read-only and refuse writes with `PRAGMA query_only`
    pub read_only: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(MEMORY_PATH),
            busy_timeout_ms: 5000,
            cache_size: -16000,
            read_only: false,
        }
    }
}

impl SqliteConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn memory() -> Self {
        Self::default()
    }

    pub fn is_memory(&self) -> bool {
        self.path.as_os_str() == MEMORY_PATH
    }

    /// Parse a DSN as written in provider configuration.
    ///
    /// Accepts plain paths, `file:` URIs and `:memory:`. Recognized URI
    /// parameters are `mode=ro` and `_busy_timeout=<ms>`; others are ignored.
    pub fn from_dsn(dsn: &str) -> Self {
        let dsn = dsn.trim();
        let (location, query) = match dsn.split_once('?') {
            Some((location, query)) => (location, Some(query)),
            None => (dsn, None),
        };
        let location = location
            .strip_prefix("file://")
            .or_else(|| location.strip_prefix("file:"))
            .unwrap_or(location);

        let mut config = if location.is_empty() || location == MEMORY_PATH {
            Self::memory()
        } else {
            Self::new(location)
        };

        for pair in query.into_iter().flat_map(|query| query.split('&')) {
            match pair.split_once('=') {
                Some(("mode", "ro")) => config.read_only = true,
                Some(("_busy_timeout" | "_timeout", value)) => {
                    if let Ok(ms) = value.parse() {
                        config.busy_timeout_ms = ms;
                    }
                }
                _ => {}
            }
        }

        config
    }
}
