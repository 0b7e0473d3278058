//! Reading configuration from disk

use crate::env::resolve_env;
use crate::error::{ConfigError, ConfigResult};
use crate::types::{AppConfig, ProviderConfig};
use std::path::Path;
use tracing::{debug, info};

/// Load a YAML config file and resolve provider env placeholders
pub fn load(path: impl AsRef<Path>) -> ConfigResult<AppConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config = from_yaml_str(&contents)?;
    info!(
        path = %path.display(),
        pages = config.pages.len(),
        providers = config.providers.len(),
        "Loaded configuration"
    );
    Ok(config)
}

/// Parse YAML text and resolve provider env placeholders
pub fn from_yaml_str(contents: &str) -> ConfigResult<AppConfig> {
    let mut config: AppConfig = serde_yaml::from_str(contents)?;
    resolve_provider_env(&mut config)?;
    Ok(config)
}

fn resolve_provider_env(config: &mut AppConfig) -> ConfigResult<()> {
    for (name, provider) in config.providers.iter_mut() {
        resolve_provider_config_env(name, provider)?;
    }
    Ok(())
}

fn resolve_provider_config_env(name: &str, provider: &mut ProviderConfig) -> ConfigResult<()> {
    let Some(sql) = provider.sql.as_mut() else {
        return Ok(());
    };

    let missing = |field, names| ConfigError::MissingEnv {
        provider: name.to_string(),
        field,
        names,
    };

    sql.driver = resolve_env(&sql.driver).map_err(|names| missing("driver", names))?;
    sql.dsn = resolve_env(&sql.dsn).map_err(|names| missing("dsn", names))?;
    debug!(provider = name, driver = %sql.driver, "Resolved provider settings");
    Ok(())
}
