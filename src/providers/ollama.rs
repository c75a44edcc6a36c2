//! Ollama provider, via Ollama's OpenAI-compatible endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::instruction::build_system_instruction;
use super::normalize::normalize_response;
use super::openai_compat::{ChatCompletionRequest, DEFAULT_TIMEOUT, OpenAiCompatClient};
use super::traits::{DateProvider, ProviderConfig};
use super::validate_base_url;
use crate::telemetry;
use crate::types::{DateInterpretation, InterpretationRequest, ProviderId};
use crate::Result;

/// Default base URL of a local Ollama server's OpenAI-compatible API.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/v1";

/// Default Ollama model.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

/// How long a discovered model list is reused.
const MODEL_LIST_TTL: Duration = Duration::from_secs(300);

/// Ollama configuration.
///
/// `base_url` has no serde default: a missing URL means the provider has
/// not been configured yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OllamaConfig {
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature in `[0, 2]`; the server default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

fn default_model() -> String {
    DEFAULT_OLLAMA_MODEL.to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: default_model(),
            temperature: None,
        }
    }
}

impl ProviderConfig for OllamaConfig {
    fn validate(&mut self) -> std::result::Result<(), String> {
        self.base_url = validate_base_url(&self.base_url)?;
        self.model = self.model.trim().to_string();
        if self.model.is_empty() {
            return Err("model must not be empty".to_string());
        }
        if let Some(t) = self.temperature.filter(|t| !(0.0..=2.0).contains(t)) {
            return Err(format!("temperature must be between 0 and 2, got {t}"));
        }
        Ok(())
    }
}

/// Resolves dates with a model served by a local Ollama instance.
pub struct OllamaProvider {
    client: OpenAiCompatClient,
    models: Cache<String, Arc<Vec<String>>>,
}

impl OllamaProvider {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: OpenAiCompatClient::with_timeout(ProviderId::Ollama, timeout)?,
            models: Cache::builder()
                .max_capacity(16)
                .time_to_live(MODEL_LIST_TTL)
                .build(),
        })
    }

    /// Models currently pulled on the server at `base_url`.
    ///
    /// Only used to offer configuration choices. Results are cached per base
    /// URL; failures are returned to the caller and never cached.
    pub async fn list_models(&self, base_url: &str) -> Result<Vec<String>> {
        let key = base_url.trim_end_matches('/').to_string();
        if let Some(models) = self.models.get(&key).await {
            metrics::counter!(telemetry::MODEL_LIST_CACHE_HITS_TOTAL,
                "provider" => ProviderId::Ollama.as_str(),
            )
            .increment(1);
            return Ok(models.as_ref().clone());
        }

        let models = self.client.list_models(&key).await.inspect_err(|e| {
            warn!(error = %e, base_url = %key, "failed to list Ollama models");
        })?;
        debug!(count = models.len(), "discovered Ollama models");
        self.models.insert(key, Arc::new(models.clone())).await;
        Ok(models)
    }
}

#[async_trait]
impl DateProvider for OllamaProvider {
    type Config = OllamaConfig;

    fn id(&self) -> ProviderId {
        ProviderId::Ollama
    }

    fn name(&self) -> &str {
        "Ollama"
    }

    fn description(&self) -> &str {
        "Run open models locally with Ollama"
    }

    fn docs_url(&self) -> Option<&str> {
        Some("https://ollama.com/download")
    }

    async fn interpret_date(
        &self,
        request: InterpretationRequest<OllamaConfig>,
    ) -> Result<DateInterpretation> {
        let system = build_system_instruction(request.timezone.as_deref(), request.reference_instant());
        let body = ChatCompletionRequest::new(system, request.prompt.as_str())
            .model(Some(request.config.model.clone()))
            .temperature(request.config.temperature)
            .date_schema(None);

        let (content, raw) = self
            .client
            .complete(&request.config.base_url, &body, request.signal.as_ref())
            .await?;
        normalize_response(ProviderId::Ollama, &content, raw)
    }
}
