//! The seam between the HTTP layer and concrete data providers

use crate::error::ProviderResult;
use crate::request::{DataRequest, DataResponse};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use vista_config::{ProviderConfig, Widget};

/// A source of widget data.
///
/// `fetch` runs exactly one read statement per call and keeps no state
/// between calls; concurrent fetches are independent.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Prepare the provider from its named configuration block
    async fn init(&mut self, name: &str, config: &ProviderConfig) -> ProviderResult<()>;

    /// Fetch one page of widget data
    async fn fetch(&self, widget: &Widget, request: &DataRequest) -> ProviderResult<DataResponse>;
}

/// Providers keyed by the name widgets refer to them by
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, provider: impl Provider + 'static) {
        self.providers.insert(name.into(), Arc::new(provider));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}
