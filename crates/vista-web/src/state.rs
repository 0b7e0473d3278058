use crate::{Result, WebError};
use std::sync::Arc;
use tracing::info;
use vista_config::AppConfig;
use vista_query::{Provider, ProviderRegistry};
use vista_sqlite::SqlProvider;

/// Shared, read-only state behind every route
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub providers: Arc<ProviderRegistry>,
}

impl AppState {
    pub fn new(config: AppConfig, providers: ProviderRegistry) -> Self {
        Self {
            config: Arc::new(config),
            providers: Arc::new(providers),
        }
    }

    /// Initialize one SQL provider per configured provider block
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let mut registry = ProviderRegistry::new();

        for (name, provider_config) in &config.providers {
            let mut provider = SqlProvider::new();
            provider.init(name, provider_config).await.map_err(|e| {
                WebError::Config(format!("failed to initialize sql provider {}: {}", name, e))
            })?;
            registry.register(name.clone(), provider);
        }

        info!(providers = ?registry.names(), "Providers initialized");
        Ok(Self::new(config, registry))
    }
}
