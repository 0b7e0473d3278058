//! Errors raised while loading configuration

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for the expected shape
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// One or more `{{env.NAME}}` placeholders reference unset variables
    #[error("provider {provider}: {field}: missing env vars: {}", .names.join(", "))]
    MissingEnv {
        provider: String,
        field: &'static str,
        names: Vec<String>,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
