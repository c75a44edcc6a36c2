//! LM Studio provider, via LM Studio's OpenAI-compatible local server.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::instruction::build_system_instruction;
use super::normalize::normalize_response;
use super::openai_compat::{ChatCompletionRequest, DEFAULT_TIMEOUT, OpenAiCompatClient};
use super::traits::{DateProvider, ProviderConfig};
use super::validate_base_url;
use crate::types::{DateInterpretation, InterpretationRequest, ProviderId};
use crate::Result;

/// Default base URL of LM Studio's local server.
pub const DEFAULT_LM_STUDIO_URL: &str = "http://localhost:1234/v1";

/// LM Studio configuration.
///
/// When `model` is absent the request omits it and the server answers with
/// whichever model is currently loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LmStudioConfig {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Default for LmStudioConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LM_STUDIO_URL.to_string(),
            model: None,
        }
    }
}

impl ProviderConfig for LmStudioConfig {
    fn validate(&mut self) -> std::result::Result<(), String> {
        self.base_url = validate_base_url(&self.base_url)?;
        self.model = self
            .model
            .take()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        Ok(())
    }
}

/// Resolves dates with the model loaded in LM Studio.
pub struct LmStudioProvider {
    client: OpenAiCompatClient,
}

impl LmStudioProvider {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: OpenAiCompatClient::with_timeout(ProviderId::LmStudio, timeout)?,
        })
    }
}

#[async_trait]
impl DateProvider for LmStudioProvider {
    type Config = LmStudioConfig;

    fn id(&self) -> ProviderId {
        ProviderId::LmStudio
    }

    fn name(&self) -> &str {
        "LM Studio"
    }

    fn description(&self) -> &str {
        "Use the model loaded in LM Studio's local server"
    }

    fn docs_url(&self) -> Option<&str> {
        Some("https://lmstudio.ai/docs/app/api")
    }

    async fn interpret_date(
        &self,
        request: InterpretationRequest<LmStudioConfig>,
    ) -> Result<DateInterpretation> {
        let system = build_system_instruction(request.timezone.as_deref(), request.reference_instant());
        // LM Studio enforces the schema only when `strict` is set.
        let body = ChatCompletionRequest::new(system, request.prompt.as_str())
            .model(request.config.model.clone())
            .temperature(Some(0.0))
            .date_schema(Some(true));

        let (content, raw) = self
            .client
            .complete(&request.config.base_url, &body, request.signal.as_ref())
            .await?;
        normalize_response(ProviderId::LmStudio, &content, raw)
    }
}
