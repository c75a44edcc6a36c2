//! Transport for local servers that speak the OpenAI chat completions API.
//!
//! Ollama and LM Studio both expose `POST {base_url}/chat/completions`. They
//! differ only in defaults and small request-shape details, which the
//! concrete providers express through [`ChatCompletionRequest`].

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::cancel::cancellable;
use super::instruction::{OUTPUT_SCHEMA_NAME, date_output_schema};
use crate::types::ProviderId;
use crate::{NornError, Result};

/// Default HTTP timeout for local inference servers.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat completions body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl ChatCompletionRequest {
    /// A non-streaming request with a system instruction and one user message.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            model: None,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.into(),
                },
                ChatMessage {
                    role: "user",
                    content: user.into(),
                },
            ],
            temperature: None,
            stream: false,
            response_format: None,
        }
    }

    pub fn model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Constrain the completion to the shared date output schema.
    pub fn date_schema(mut self, strict: Option<bool>) -> Self {
        self.response_format = Some(ResponseFormat {
            kind: "json_schema",
            json_schema: JsonSchemaFormat {
                name: OUTPUT_SCHEMA_NAME,
                strict,
                schema: date_output_schema(),
            },
        });
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub json_schema: JsonSchemaFormat,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonSchemaFormat {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    pub schema: Value,
}

/// `GET {base_url}/models` response.
#[derive(Debug, Deserialize)]
pub(crate) struct ModelsResponse {
    #[serde(default)]
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModelEntry {
    pub id: String,
}

/// HTTP client for one OpenAI-compatible provider.
#[derive(Clone)]
pub struct OpenAiCompatClient {
    provider: ProviderId,
    http: Client,
}

impl OpenAiCompatClient {
    /// Create a client with [`DEFAULT_TIMEOUT`].
    pub fn new(provider: ProviderId) -> Result<Self> {
        Self::with_timeout(provider, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(provider: ProviderId, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NornError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { provider, http })
    }

    /// Send a chat completion and return `(content, raw_payload)`.
    ///
    /// `content` is `choices[0].message.content`, or `Value::Null` when the
    /// envelope has none; normalization reports that case with diagnostics.
    #[instrument(skip(self, body, signal), fields(provider = %self.provider))]
    pub async fn complete(
        &self,
        base_url: &str,
        body: &ChatCompletionRequest,
        signal: Option<&CancellationToken>,
    ) -> Result<(Value, Value)> {
        let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        let raw: Value = cancellable(signal, async {
            let response = self.http.post(&url).json(body).send().await?;
            let response = check_status(response).await?;
            Ok::<_, NornError>(response.json::<Value>().await?)
        })
        .await?;

        let content = raw
            .pointer("/choices/0/message/content")
            .filter(|c| c.is_string())
            .cloned()
            .unwrap_or(Value::Null);
        debug!(has_content = !content.is_null(), "chat completion received");
        Ok((content, raw))
    }

    /// List model ids served at `base_url`.
    #[instrument(skip(self), fields(provider = %self.provider))]
    pub async fn list_models(&self, base_url: &str) -> Result<Vec<String>> {
        let url = format!("{}/models", base_url.trim_end_matches('/'));
        let response = self.http.get(&url).send().await?;
        let response = check_status(response).await?;
        let models: ModelsResponse = response.json().await?;
        Ok(models.data.into_iter().map(|m| m.id).collect())
    }
}

/// Map a non-success status to [`NornError::Api`], keeping the body as the message.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        body
    };
    Err(NornError::Api {
        status: status.as_u16(),
        message,
    })
}
