//! Response normalization shared by every provider.

use serde_json::Value;
use tracing::warn;

use crate::telemetry;
use crate::types::{DateInterpretation, ProviderId};
use crate::{NornError, Result};

/// Normalize a backend candidate into a [`DateInterpretation`].
///
/// `candidate` is either a JSON-encoded string or an already-structured
/// value. `raw` is the backend's full payload and is attached verbatim as
/// `raw_response`. Optional fields are projected only when present with
/// the expected type; they are never defaulted or coerced.
pub fn normalize_response(
    provider: ProviderId,
    candidate: &Value,
    raw: Value,
) -> Result<DateInterpretation> {
    let parsed = match candidate {
        Value::String(text) => serde_json::from_str::<Value>(strip_code_fence(text)).ok(),
        Value::Null => None,
        other => Some(other.clone()),
    };

    let Some(value) = parsed
        .as_ref()
        .and_then(|p| p.get("value"))
        .and_then(Value::as_str)
    else {
        warn!(
            provider = %provider,
            candidate = %candidate,
            raw = %raw,
            "response is missing an ISO date value"
        );
        metrics::counter!(telemetry::NORMALIZATION_FAILURES_TOTAL,
            "provider" => provider.as_str(),
        )
        .increment(1);
        return Err(NornError::MissingIsoValue { provider });
    };

    let mut interpretation = DateInterpretation::new(value, provider);
    if let Some(parsed) = parsed.as_ref() {
        interpretation.timezone = parsed
            .get("timezone")
            .and_then(Value::as_str)
            .map(str::to_string);
        interpretation.confidence = parsed.get("confidence").and_then(Value::as_f64);
        interpretation.reasoning = parsed
            .get("reasoning")
            .and_then(Value::as_str)
            .map(str::to_string);
    }
    Ok(interpretation.with_raw_response(raw))
}

/// Unwrap a Markdown code fence (```` ```json ... ``` ````) around model output.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    match inner.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with('{') => body.trim(),
        _ => inner.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_json_text() {
        let candidate = Value::String(
            r#"{"value":"2025-12-25T00:00:00+08:00","confidence":0.9}"#.to_string(),
        );
        let result = normalize_response(ProviderId::Ollama, &candidate, json!({"id": 1})).unwrap();

        assert_eq!(result.value, "2025-12-25T00:00:00+08:00");
        assert_eq!(result.provider_id, ProviderId::Ollama);
        assert_eq!(result.confidence, Some(0.9));
        assert_eq!(result.timezone, None);
        assert_eq!(result.reasoning, None);
        assert_eq!(result.raw_response, Some(json!({"id": 1})));
    }

    #[test]
    fn accepts_structured_candidate() {
        let candidate = json!({
            "value": "2025-03-01T00:00:00-05:00",
            "timezone": "America/New_York",
            "reasoning": "bare month"
        });
        let result = normalize_response(ProviderId::OnDevice, &candidate, Value::Null).unwrap();

        assert_eq!(result.timezone.as_deref(), Some("America/New_York"));
        assert_eq!(result.reasoning.as_deref(), Some("bare month"));
        assert_eq!(result.raw_response, Some(Value::Null));
    }

    #[test]
    fn missing_value_fails() {
        let candidate = Value::String(r#"{"confidence":0.9}"#.to_string());
        let err = normalize_response(ProviderId::LmStudio, &candidate, Value::Null).unwrap_err();
        assert!(matches!(
            err,
            NornError::MissingIsoValue { provider: ProviderId::LmStudio }
        ));
    }

    #[test]
    fn non_string_value_fails() {
        let candidate = json!({ "value": 1735689600 });
        assert!(normalize_response(ProviderId::Ollama, &candidate, Value::Null).is_err());
    }

    #[test]
    fn unparseable_text_fails() {
        let candidate = Value::String("next tuesday, probably".to_string());
        assert!(normalize_response(ProviderId::Ollama, &candidate, Value::Null).is_err());
    }

    #[test]
    fn null_candidate_fails() {
        assert!(normalize_response(ProviderId::Ollama, &Value::Null, json!({})).is_err());
    }

    #[test]
    fn mistyped_optional_fields_are_omitted() {
        let candidate = json!({
            "value": "2025-01-02T00:00:00Z",
            "timezone": 8,
            "confidence": "high",
            "reasoning": ["a", "b"]
        });
        let result = normalize_response(ProviderId::Ollama, &candidate, Value::Null).unwrap();
        assert_eq!(result.timezone, None);
        assert_eq!(result.confidence, None);
        assert_eq!(result.reasoning, None);
    }

    #[test]
    fn out_of_range_confidence_is_not_clamped() {
        let candidate = json!({ "value": "2025-01-02T00:00:00Z", "confidence": 1.7 });
        let result = normalize_response(ProviderId::Ollama, &candidate, Value::Null).unwrap();
        assert_eq!(result.confidence, Some(1.7));
    }

    #[test]
    fn strips_markdown_fence() {
        let candidate = Value::String(
            "```json\n{\"value\":\"2025-01-02T00:00:00+00:00\"}\n```".to_string(),
        );
        let result = normalize_response(ProviderId::OnDevice, &candidate, Value::Null).unwrap();
        assert_eq!(result.value, "2025-01-02T00:00:00+00:00");
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(strip_code_fence("```{\"value\":\"x\"}```"), "{\"value\":\"x\"}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }
}
