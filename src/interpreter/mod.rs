//! The date interpreter: validation and dispatch.
//!
//! # Dispatch flow
//!
//! ```text
//! interpret_date(provider_id, request)
//!         │
//!         ▼
//!   resolve provider ── unknown ──► UnknownProvider (no fallback)
//!         │
//!         ▼
//!   validate config ─── invalid ──► fallback parser ── match ──► DateInterpretation
//!         │                                   │
//!         │ valid                             └─ no match ──► InvalidConfig
//!         ▼
//!   provider.interpret_date ──► DateInterpretation, or the provider's error as-is
//! ```
//!
//! Fallback is tried only for bad or missing configuration, never for a
//! configured provider that fails at call time.

mod builder;

pub use builder::DateInterpreterBuilder;

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, instrument, warn};

use crate::fallback::FallbackInterpreter;
use crate::providers::ProviderRegistry;
use crate::telemetry;
use crate::types::{DateInterpretation, InterpretationRequest, ProviderId, ProviderInfo};
use crate::{NornError, Result};

/// Routes interpretation requests to providers or to the fallback parser.
#[derive(Clone)]
pub struct DateInterpreter {
    registry: ProviderRegistry,
    fallback: FallbackInterpreter,
}

impl DateInterpreter {
    /// Create a new builder for configuring the interpreter.
    pub fn builder() -> DateInterpreterBuilder {
        DateInterpreterBuilder::new()
    }

    pub fn new(registry: ProviderRegistry, fallback: FallbackInterpreter) -> Self {
        Self { registry, fallback }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Descriptions of every registered provider.
    pub fn catalog(&self) -> Vec<ProviderInfo> {
        self.registry.catalog()
    }

    /// Interpret `request` with the provider named by `provider_id`.
    ///
    /// The request's `config` is validated against that provider's schema.
    /// Only the validated, coerced configuration reaches the provider. When
    /// validation fails the fallback parser is tried with the prompt,
    /// locale, timezone and reference instant; if it finds nothing the
    /// validation error is returned.
    ///
    /// An unrecognized timezone takes precedence over the validation error:
    /// the fallback cannot run without a zone, so the caller gets
    /// [`NornError::InvalidTimezone`]. The validation error is logged.
    #[instrument(skip(self, request), fields(provider = %provider_id))]
    pub async fn interpret_date(
        &self,
        provider_id: ProviderId,
        mut request: InterpretationRequest,
    ) -> Result<DateInterpretation> {
        let start = Instant::now();
        let Some(provider) = self.registry.get(provider_id) else {
            Self::record(provider_id, "provider", "error", start);
            return Err(NornError::UnknownProvider(provider_id.to_string()));
        };

        // Pin "now" once so both paths resolve against the same instant.
        let now = *request.now.get_or_insert_with(Utc::now);

        let config = match provider.validate_config(&request.config) {
            Ok(config) => config,
            Err(err) if err.is_fallback_trigger() => {
                warn!(error = %err, "provider configuration invalid, trying fallback parser");
                let result = self.fallback.interpret(
                    &request.prompt,
                    request.locale.as_deref(),
                    request.timezone.as_deref(),
                    now,
                );
                return match result {
                    Ok(Some(interpretation)) => {
                        Self::record(provider_id, "fallback", "ok", start);
                        Ok(interpretation)
                    }
                    Ok(None) => {
                        Self::record(provider_id, "fallback", "no_match", start);
                        Err(err)
                    }
                    Err(fallback_err) => {
                        warn!(
                            error = %fallback_err,
                            config_error = %err,
                            "fallback parser failed"
                        );
                        Self::record(provider_id, "fallback", "error", start);
                        Err(fallback_err)
                    }
                };
            }
            Err(err) => {
                Self::record(provider_id, "provider", "error", start);
                return Err(err);
            }
        };

        debug!("configuration valid, invoking provider");
        let result = provider
            .interpret_validated(request.with_config(config))
            .await;
        let status = if result.is_ok() { "ok" } else { "error" };
        Self::record(provider_id, "provider", status, start);
        result
    }

    fn record(provider: ProviderId, path: &'static str, status: &'static str, start: Instant) {
        metrics::counter!(telemetry::INTERPRETATIONS_TOTAL,
            "provider" => provider.as_str(),
            "path" => path,
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::INTERPRETATION_DURATION_SECONDS,
            "provider" => provider.as_str(),
            "path" => path,
        )
        .record(start.elapsed().as_secs_f64());
    }
}
