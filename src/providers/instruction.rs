//! System instruction and structured output schema shared by every provider.
//!
//! The instruction text materially changes model behaviour; the resolution
//! rules below are what make vague inputs resolve the same way regardless of
//! which backend answers.

use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde_json::{Value, json};

/// Name used for the structured output schema in `response_format` payloads.
pub const OUTPUT_SCHEMA_NAME: &str = "date_interpretation";

/// The caller's local IANA timezone, or `UTC` when it cannot be determined.
pub fn local_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Build the system instruction for the given timezone and reference instant.
///
/// `timezone` defaults to [`local_timezone`]. The reference instant is
/// rendered in that zone when it is a known IANA name, so the model sees the
/// same wall-clock "now" the user does.
pub fn build_system_instruction(timezone: Option<&str>, now: DateTime<Utc>) -> String {
    let timezone = timezone
        .map(str::to_string)
        .unwrap_or_else(local_timezone);
    let (reference, weekday) = match timezone.parse::<Tz>() {
        Ok(tz) => {
            let local = now.with_timezone(&tz);
            (
                local.to_rfc3339_opts(SecondsFormat::Secs, false),
                local.format("%A").to_string(),
            )
        }
        Err(_) => (
            now.to_rfc3339_opts(SecondsFormat::Secs, false),
            now.format("%A").to_string(),
        ),
    };

    format!(
        "You convert natural-language date and time expressions into exact timestamps.

The user's timezone is {timezone}.
The current date and time is {reference} ({weekday}). Resolve every relative expression against this instant.

Output requirements:
- \"value\" MUST be a complete, fully specified date and time with an explicit UTC offset, in the exact format YYYY-MM-DDTHH:mm:ss±HH:mm (for example 2025-03-14T09:30:00-07:00).
- Hours, minutes and seconds MUST each be exactly two digits.
- Never put relative or vague phrases such as \"tomorrow\", \"soon\" or \"later\" in \"value\".
- Use the UTC offset that applies in {timezone} on the resolved date.

Resolution rules for vague input:
- \"tomorrow\" means the next calendar day at 00:00:00.
- \"next week\" means the upcoming Monday at 00:00:00.
- A bare month name (for example \"March\") means the first day of that month, at its next occurrence, at 00:00:00.
- A bare hour (for example \"3pm\") means today at that hour, with minutes and seconds set to 00.
- \"afternoon\" means today at 12:00:00.
- \"this weekend\" means the upcoming Saturday at 00:00:00.
- When no time of day is given, use 00:00:00.

Respond with a single JSON object that strictly conforms to the provided JSON schema: \"value\" (required string), \"timezone\" (IANA name), \"confidence\" (number between 0 and 1) and \"reasoning\" (short explanation). Do not add any other text."
    )
}

/// Plain-text format instruction appended to the user prompt for backends
/// that cannot be constrained by a JSON schema.
pub fn plain_json_format_instruction() -> &'static str {
    "Respond ONLY with a JSON object of the form \
     {\"value\": \"YYYY-MM-DDTHH:mm:ss±HH:mm\", \"timezone\": \"<IANA timezone>\", \
     \"confidence\": <number between 0 and 1>, \"reasoning\": \"<short explanation>\"}. \
     Do not wrap it in Markdown and do not add any other text."
}

/// JSON Schema every structured-output capable provider is constrained to.
pub fn date_output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "value": {
                "type": "string",
                "description": "Resolved date and time in the format YYYY-MM-DDTHH:mm:ss±HH:mm"
            },
            "timezone": {
                "type": "string",
                "description": "IANA timezone name the value was resolved in"
            },
            "confidence": {
                "type": "number",
                "description": "Confidence in the interpretation, between 0 and 1"
            },
            "reasoning": {
                "type": "string",
                "description": "Short explanation of how the expression was resolved"
            }
        },
        "required": ["value"],
        "additionalProperties": false
    })
}
