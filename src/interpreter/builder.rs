//! Builder for configuring interpreter instances

use std::sync::Arc;
use std::time::Duration;

use super::DateInterpreter;
use crate::fallback::{DateMatcher, FallbackInterpreter};
use crate::providers::openai_compat::DEFAULT_TIMEOUT;
use crate::providers::{
    CloudProvider, DynDateProvider, LmStudioProvider, OllamaProvider, OnDeviceModel,
    OnDeviceProvider, ProviderRegistry,
};
use crate::Result;

/// Builder for [`DateInterpreter`].
///
/// ```rust,no_run
/// # fn main() -> norn::Result<()> {
/// let interpreter = norn::DateInterpreter::builder()
///     .default_providers()
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct DateInterpreterBuilder {
    default_providers: bool,
    on_device: Option<Arc<dyn OnDeviceModel>>,
    custom: Vec<Arc<dyn DynDateProvider>>,
    matcher: Option<Arc<dyn DateMatcher>>,
    http_timeout: Duration,
}

impl Default for DateInterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DateInterpreterBuilder {
    pub fn new() -> Self {
        Self {
            default_providers: false,
            on_device: None,
            custom: Vec::new(),
            matcher: None,
            http_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Register Ollama, LM Studio and the cloud placeholder.
    pub fn default_providers(mut self) -> Self {
        self.default_providers = true;
        self
    }

    /// Register the on-device provider over the given model capability.
    pub fn on_device(mut self, model: Arc<dyn OnDeviceModel>) -> Self {
        self.on_device = Some(model);
        self
    }

    /// Register an additional provider. Registered after the defaults, so it
    /// replaces a default provider with the same identifier.
    pub fn provider(mut self, provider: Arc<dyn DynDateProvider>) -> Self {
        self.custom.push(provider);
        self
    }

    /// Replace the fallback grammar parser.
    pub fn matcher(mut self, matcher: Arc<dyn DateMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// HTTP timeout for the local server providers (default: 60 s).
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<DateInterpreter> {
        let mut registry = ProviderRegistry::new();

        if self.default_providers {
            registry.register(Arc::new(OllamaProvider::with_timeout(self.http_timeout)?))?;
            registry.register(Arc::new(LmStudioProvider::with_timeout(self.http_timeout)?))?;
            registry.register(Arc::new(CloudProvider))?;
        }
        if let Some(model) = self.on_device {
            registry.register(Arc::new(OnDeviceProvider::new(model)))?;
        }
        for provider in self.custom {
            registry.register(provider)?;
        }

        let fallback = match self.matcher {
            Some(matcher) => FallbackInterpreter::new(matcher),
            None => FallbackInterpreter::default(),
        };
        Ok(DateInterpreter::new(registry, fallback))
    }
}
