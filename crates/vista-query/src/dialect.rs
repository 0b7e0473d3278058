//! Per-driver SQL capabilities.
//!
//! A [`Dialect`] is a small capability record passed explicitly into the
//! filter compiler and the renderer, so no call site ever branches on a
//! driver name string.

/// How positional parameters are written in the final statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `?` for every parameter
    Question,
    /// `$1`, `$2`, ...
    Dollar,
}

impl Placeholder {
    /// Render the placeholder for the 1-based parameter `index`
    pub fn render(self, index: usize) -> String {
        match self {
            Placeholder::Question => "?".to_string(),
            Placeholder::Dollar => format!("${}", index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// Short name used in logs
    pub name: &'static str,
    /// Operator used for `contains` (case-insensitive where available)
    pub like_operator: &'static str,
    /// Whether JSON arrays can be iterated in SQL via `json_each`
    pub json_each: bool,
    pub placeholder: Placeholder,
}

impl Dialect {
    pub const SQLITE: Dialect = Dialect {
        name: "sqlite",
        like_operator: "LIKE",
        json_each: true,
        placeholder: Placeholder::Question,
    };

    pub const POSTGRES: Dialect = Dialect {
        name: "postgres",
        like_operator: "ILIKE",
        json_each: false,
        placeholder: Placeholder::Dollar,
    };

    pub const MYSQL: Dialect = Dialect {
        name: "mysql",
        like_operator: "LIKE",
        json_each: false,
        placeholder: Placeholder::Question,
    };

    /// Conservative fallback for unrecognized drivers
    pub const GENERIC: Dialect = Dialect {
        name: "generic",
        like_operator: "LIKE",
        json_each: false,
        placeholder: Placeholder::Question,
    };

    /// Map a driver name as written in configuration to its dialect
    pub fn for_driver(driver: &str) -> Dialect {
        match driver.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Dialect::SQLITE,
            "postgres" | "postgresql" | "pgx" => Dialect::POSTGRES,
            "mysql" => Dialect::MYSQL,
            _ => Dialect::GENERIC,
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::GENERIC
    }
}
