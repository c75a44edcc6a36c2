//! The single result type shared by every interpretation path.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::ProviderId;
use crate::{NornError, Result};

/// A normalized date interpretation.
///
/// `value` is the only load-bearing field: it must parse into an absolute
/// instant (see [`DateInterpretation::instant`]). Everything else is advisory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateInterpretation {
    /// Date-time string, expected as `YYYY-MM-DDTHH:mm:ss±HH:mm`.
    pub value: String,
    /// Backend that produced this result, or [`ProviderId::Fallback`].
    pub provider_id: ProviderId,
    /// IANA timezone name reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Advisory confidence, conventionally in `[0, 1]`. Not clamped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Provider-native payload, kept for diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<serde_json::Value>,
}

impl DateInterpretation {
    /// Create an interpretation with only the required fields set.
    pub fn new(value: impl Into<String>, provider_id: ProviderId) -> Self {
        Self {
            value: value.into(),
            provider_id,
            timezone: None,
            confidence: None,
            reasoning: None,
            raw_response: None,
        }
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn with_raw_response(mut self, raw: serde_json::Value) -> Self {
        self.raw_response = Some(raw);
        self
    }

    /// Parse `value` into an absolute instant.
    ///
    /// Accepts RFC 3339, which covers the `YYYY-MM-DDTHH:mm:ss±HH:mm` shape
    /// providers are instructed to produce, `Z` offsets and fractional seconds.
    pub fn instant(&self) -> Result<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(self.value.trim())
            .map_err(|_| NornError::InvalidInstant(self.value.clone()))
    }
}
