//! Provider registry.
//!
//! A mapping from [`ProviderId`] to provider, assembled once at startup.
//! Adding a backend means implementing [`DateProvider`](super::DateProvider)
//! and registering it here; nothing else branches on the identifier.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::traits::DynDateProvider;
use crate::types::{ProviderId, ProviderInfo};
use crate::{NornError, Result};

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, Arc<dyn DynDateProvider>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own identifier, replacing any earlier one.
    ///
    /// The fallback sentinel is reserved and cannot be registered.
    pub fn register(&mut self, provider: Arc<dyn DynDateProvider>) -> Result<()> {
        let id = provider.info().id;
        if id.is_fallback() {
            return Err(NornError::Configuration(
                "the fallback identifier is reserved".to_string(),
            ));
        }
        if self.providers.insert(id, provider).is_some() {
            debug!(provider = %id, "replaced registered provider");
        }
        Ok(())
    }

    pub fn get(&self, id: ProviderId) -> Option<&Arc<dyn DynDateProvider>> {
        self.providers.get(&id)
    }

    pub fn contains(&self, id: ProviderId) -> bool {
        self.providers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Descriptions of every registered provider, ordered by identifier.
    pub fn catalog(&self) -> Vec<ProviderInfo> {
        let mut infos: Vec<ProviderInfo> = self.providers.values().map(|p| p.info()).collect();
        infos.sort_by_key(|info| info.id);
        infos
    }
}
