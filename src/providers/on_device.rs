//! On-device provider backed by an in-process model session.
//!
//! There is no network transport here. The host application supplies an
//! [`OnDeviceModel`] (for example a binding to a platform language model).
//! Each call checks readiness, opens a short-lived [`ModelSession`], prompts
//! it once, and releases it again.
//!
//! These models cannot be constrained by a JSON schema, so the user prompt
//! is augmented with a plain-text format instruction instead.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::cancel::cancellable;
use super::instruction::{build_system_instruction, plain_json_format_instruction};
use super::normalize::normalize_response;
use super::traits::{DateProvider, ProviderConfig};
use crate::types::{Availability, DateInterpretation, InterpretationRequest, ProviderId};
use crate::{NornError, Result};

/// Options for a new session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// System instruction the session is seeded with.
    pub system_prompt: String,
    pub temperature: Option<f32>,
    pub top_k: Option<u32>,
}

/// An in-process language model capability.
#[async_trait]
pub trait OnDeviceModel: Send + Sync {
    /// Whether a session can be created right now.
    async fn availability(&self) -> Availability;

    async fn create_session(&self, options: SessionOptions) -> Result<Box<dyn ModelSession>>;
}

/// A single model session. Must be released with [`ModelSession::destroy`].
#[async_trait]
pub trait ModelSession: Send {
    async fn prompt(&mut self, input: &str) -> Result<String>;

    /// Release the session's resources. Called exactly once.
    fn destroy(&mut self);
}

/// Destroys the wrapped session when dropped, on every exit path.
struct SessionGuard {
    session: Box<dyn ModelSession>,
}

impl SessionGuard {
    fn new(session: Box<dyn ModelSession>) -> Self {
        Self { session }
    }
}

impl std::ops::Deref for SessionGuard {
    type Target = dyn ModelSession;

    fn deref(&self) -> &Self::Target {
        self.session.as_ref()
    }
}

impl std::ops::DerefMut for SessionGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session.as_mut()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.session.destroy();
        debug!("on-device session destroyed");
    }
}

/// Sampling parameters for on-device sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnDeviceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

impl ProviderConfig for OnDeviceConfig {
    fn validate(&mut self) -> std::result::Result<(), String> {
        if let Some(t) = self.temperature.filter(|t| !(0.0..=2.0).contains(t)) {
            return Err(format!("temperature must be between 0 and 2, got {t}"));
        }
        if self.top_k == Some(0) {
            return Err("topK must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Resolves dates with an in-process model.
pub struct OnDeviceProvider {
    model: Arc<dyn OnDeviceModel>,
}

impl OnDeviceProvider {
    pub fn new(model: Arc<dyn OnDeviceModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl DateProvider for OnDeviceProvider {
    type Config = OnDeviceConfig;

    fn id(&self) -> ProviderId {
        ProviderId::OnDevice
    }

    fn name(&self) -> &str {
        "On-device model"
    }

    fn description(&self) -> &str {
        "Runs entirely on this device; no server required"
    }

    #[instrument(skip(self, request), fields(provider = %ProviderId::OnDevice))]
    async fn interpret_date(
        &self,
        request: InterpretationRequest<OnDeviceConfig>,
    ) -> Result<DateInterpretation> {
        let signal = request.signal.as_ref();

        let availability = cancellable(signal, async { Ok(self.model.availability().await) }).await?;
        if !availability.is_ready() {
            return Err(NornError::NotReady {
                provider: ProviderId::OnDevice,
                availability,
            });
        }

        let options = SessionOptions {
            system_prompt: build_system_instruction(
                request.timezone.as_deref(),
                request.reference_instant(),
            ),
            temperature: request.config.temperature,
            top_k: request.config.top_k,
        };
        let mut session = SessionGuard::new(self.model.create_session(options).await?);

        let input = format!("{}\n\n{}", request.prompt, plain_json_format_instruction());
        let output = cancellable(signal, session.prompt(&input)).await?;

        normalize_response(
            ProviderId::OnDevice,
            &Value::String(output.clone()),
            json!({ "output": output }),
        )
    }
}
