//! Grammar-based fallback interpretation.
//!
//! Used by the dispatcher when a provider's configuration is invalid or
//! missing. The grammar parser sits behind [`DateMatcher`] so it can be
//! replaced; [`EnglishDateMatcher`] is the default.

mod english;

pub use english::EnglishDateMatcher;

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::providers::instruction::local_timezone;
use crate::types::{DateInterpretation, ProviderId};
use crate::{NornError, Result};

/// Advisory confidence attached to every fallback result.
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

/// Reasoning attached to every fallback result.
pub const FALLBACK_REASONING: &str = "Parsed with the grammar-based fallback parser";

/// Options passed to a [`DateMatcher`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Resolve ambiguous relative expressions to the future.
    pub prefer_future: bool,
    /// BCP 47 locale tag, used for day/month ordering.
    pub locale: Option<String>,
}

/// A date mention found in free text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateMatch {
    /// The matched slice of the input.
    pub text: String,
    /// Byte offset of the match in the input.
    pub index: usize,
    pub start: DateTime<FixedOffset>,
}

impl DateMatch {
    /// Materialize the matched instant.
    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.start
    }
}

/// Finds date mentions in free text.
pub trait DateMatcher: Send + Sync {
    /// All matches in `text`, best first.
    ///
    /// `reference` is the reference instant in the target zone. Matches
    /// should carry the zone's offset on their own date, which can differ
    /// from the reference's offset across a daylight-saving change.
    fn find_matches(
        &self,
        text: &str,
        reference: DateTime<Tz>,
        options: &MatchOptions,
    ) -> Vec<DateMatch>;
}

/// Wraps a [`DateMatcher`] behind the [`DateInterpretation`] result shape.
#[derive(Clone)]
pub struct FallbackInterpreter {
    matcher: Arc<dyn DateMatcher>,
}

impl Default for FallbackInterpreter {
    fn default() -> Self {
        Self::new(Arc::new(EnglishDateMatcher::new()))
    }
}

impl FallbackInterpreter {
    pub fn new(matcher: Arc<dyn DateMatcher>) -> Self {
        Self { matcher }
    }

    /// Interpret `prompt` without a model.
    ///
    /// Returns `Ok(None)` when nothing in the prompt looks like a date; that
    /// is a "nothing understood" outcome, not an error. Fails only on an
    /// unrecognized timezone name.
    pub fn interpret(
        &self,
        prompt: &str,
        locale: Option<&str>,
        timezone: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<DateInterpretation>> {
        let (zone_name, tz) = resolve_timezone(timezone)?;
        let reference = now.with_timezone(&tz);
        let options = MatchOptions {
            prefer_future: true,
            locale: locale.map(str::to_string),
        };

        let matches = self.matcher.find_matches(prompt, reference, &options);
        let Some(best) = matches.into_iter().next() else {
            debug!("fallback parser found no date");
            return Ok(None);
        };

        let value = best
            .instant()
            .with_timezone(&tz)
            .to_rfc3339_opts(SecondsFormat::Secs, false);
        debug!(matched = %best.text, %value, "fallback parser matched");
        Ok(Some(
            DateInterpretation::new(value, ProviderId::Fallback)
                .with_timezone(zone_name)
                .with_confidence(FALLBACK_CONFIDENCE)
                .with_reasoning(FALLBACK_REASONING)
                .with_raw_response(serde_json::to_value(&best)?),
        ))
    }
}

/// Resolve an explicit IANA name, or the local zone (UTC when unknown).
fn resolve_timezone(timezone: Option<&str>) -> Result<(String, Tz)> {
    match timezone {
        Some(name) => name
            .parse::<Tz>()
            .map(|tz| (name.to_string(), tz))
            .map_err(|_| NornError::InvalidTimezone(name.to_string())),
        None => {
            let local = local_timezone();
            Ok(match local.parse::<Tz>() {
                Ok(tz) => (local, tz),
                Err(_) => ("UTC".to_string(), Tz::UTC),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FixedMatcher(Vec<DateMatch>);

    impl DateMatcher for FixedMatcher {
        fn find_matches(
            &self,
            _text: &str,
            _reference: DateTime<Tz>,
            _options: &MatchOptions,
        ) -> Vec<DateMatch> {
            self.0.clone()
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
    }

    #[test]
    fn takes_highest_ranked_match() {
        let matcher = FixedMatcher(vec![
            DateMatch { text: "friday".into(), index: 4, start: at(2025, 1, 3, 0) },
            DateMatch { text: "noon".into(), index: 0, start: at(2025, 1, 1, 12) },
        ]);
        let result = FallbackInterpreter::new(Arc::new(matcher))
            .interpret("ping friday", None, Some("UTC"), Utc::now())
            .unwrap()
            .unwrap();

        assert_eq!(result.value, "2025-01-03T00:00:00+00:00");
        assert_eq!(result.provider_id, ProviderId::Fallback);
        assert_eq!(result.confidence, Some(FALLBACK_CONFIDENCE));
        assert_eq!(result.reasoning.as_deref(), Some(FALLBACK_REASONING));
        assert_eq!(result.raw_response.unwrap()["text"], "friday");
    }

    #[test]
    fn value_is_rendered_in_requested_zone() {
        let matcher = FixedMatcher(vec![DateMatch {
            text: "x".into(),
            index: 0,
            start: at(2025, 6, 1, 12),
        }]);
        let result = FallbackInterpreter::new(Arc::new(matcher))
            .interpret("x", None, Some("Europe/Berlin"), Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(result.value, "2025-06-01T14:00:00+02:00");
        assert_eq!(result.timezone.as_deref(), Some("Europe/Berlin"));
    }

    #[test]
    fn no_match_is_none() {
        let result = FallbackInterpreter::new(Arc::new(FixedMatcher(vec![])))
            .interpret("hello", None, Some("UTC"), Utc::now())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn unknown_timezone_fails() {
        let err = FallbackInterpreter::default()
            .interpret("tomorrow", None, Some("Nowhere/Special"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, NornError::InvalidTimezone(ref z) if z == "Nowhere/Special"));
    }

    #[test]
    fn reference_is_passed_in_target_zone() {
        struct Capture(std::sync::Mutex<Option<DateTime<FixedOffset>>>);
        impl DateMatcher for Capture {
            fn find_matches(
                &self,
                _text: &str,
                reference: DateTime<Tz>,
                _options: &MatchOptions,
            ) -> Vec<DateMatch> {
                *self.0.lock().unwrap() = Some(reference.fixed_offset());
                Vec::new()
            }
        }

        let capture = Arc::new(Capture(std::sync::Mutex::new(None)));
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        FallbackInterpreter::new(capture.clone())
            .interpret("x", None, Some("Asia/Tokyo"), now)
            .unwrap();

        let reference = capture.0.lock().unwrap().unwrap();
        assert_eq!(reference.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(reference, now);
    }
}
