//! The provider capability contract.
//!
//! Every backend implements [`DateProvider`] with its own typed
//! configuration. The dispatcher never sees those types: it holds
//! providers as `Arc<dyn DynDateProvider>`, an object-safe view that every
//! `DateProvider` gets through a blanket impl. Configuration therefore
//! stays an opaque [`Value`] until the owning provider validates it.
//!
//! # Example
//!
//! ```ignore
//! #[async_trait]
//! impl DateProvider for MyProvider {
//!     type Config = MyConfig;
//!
//!     fn id(&self) -> ProviderId { ProviderId::Ollama }
//!     fn name(&self) -> &str { "My backend" }
//!     fn description(&self) -> &str { "Resolves dates with my backend" }
//!
//!     async fn interpret_date(
//!         &self,
//!         request: InterpretationRequest<MyConfig>,
//!     ) -> Result<DateInterpretation> {
//!         // ... call the backend, then `normalize_response`
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{DateInterpretation, InterpretationRequest, ProviderId, ProviderInfo};
use crate::{NornError, Result};

/// A provider-owned configuration schema.
///
/// Deserialization checks the shape; [`ProviderConfig::validate`] checks
/// what serde cannot express (URL syntax, value ranges) and may coerce
/// fields in place, e.g. trimming a trailing slash from a base URL.
pub trait ProviderConfig: DeserializeOwned + Serialize + Default + Clone + Send + Sync {
    /// Check and coerce the configuration. `Err` carries a human-readable reason.
    fn validate(&mut self) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// A backend capable of interpreting natural-language dates.
#[async_trait]
pub trait DateProvider: Send + Sync {
    /// Typed configuration, validated before any call reaches the provider.
    type Config: ProviderConfig;

    fn id(&self) -> ProviderId;

    /// Human-readable name.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Where users can learn to set this backend up.
    fn docs_url(&self) -> Option<&str> {
        None
    }

    /// `false` for placeholder providers that always fail.
    fn enabled(&self) -> bool {
        true
    }

    fn default_config(&self) -> Self::Config {
        Self::Config::default()
    }

    /// Check and coerce a raw configuration value into [`Self::Config`].
    fn parse_config(&self, raw: &Value) -> Result<Self::Config> {
        let invalid = |reason: String| NornError::InvalidConfig {
            provider: self.id(),
            reason,
        };
        let mut config: Self::Config =
            serde_json::from_value(raw.clone()).map_err(|e| invalid(e.to_string()))?;
        config.validate().map_err(invalid)?;
        Ok(config)
    }

    /// Interpret the request's prompt into a normalized date.
    ///
    /// The result's `provider_id` is always [`DateProvider::id`]. Fails on
    /// transport errors, non-success statuses, readiness failures and
    /// responses that cannot be normalized; fails with
    /// [`NornError::Cancelled`] when the request's signal fires.
    async fn interpret_date(
        &self,
        request: InterpretationRequest<Self::Config>,
    ) -> Result<DateInterpretation>;
}

/// Object-safe view of a [`DateProvider`], used by the registry.
#[async_trait]
pub trait DynDateProvider: Send + Sync {
    fn info(&self) -> ProviderInfo;

    /// Validate a raw configuration, returning its coerced form.
    fn validate_config(&self, raw: &Value) -> Result<Value>;

    /// Interpret a request whose configuration already passed [`Self::validate_config`].
    async fn interpret_validated(
        &self,
        request: InterpretationRequest<Value>,
    ) -> Result<DateInterpretation>;
}

#[async_trait]
impl<P> DynDateProvider for P
where
    P: DateProvider,
{
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            id: self.id(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            docs_url: self.docs_url().map(str::to_string),
            enabled: self.enabled(),
            default_config: serde_json::to_value(self.default_config()).unwrap_or(Value::Null),
        }
    }

    fn validate_config(&self, raw: &Value) -> Result<Value> {
        let config = self.parse_config(raw)?;
        Ok(serde_json::to_value(config)?)
    }

    async fn interpret_validated(
        &self,
        request: InterpretationRequest<Value>,
    ) -> Result<DateInterpretation> {
        let config = self.parse_config(&request.config)?;
        self.interpret_date(request.with_config(config)).await
    }
}
