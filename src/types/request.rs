//! Interpretation requests.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// A single interpretation request.
///
/// `C` is the configuration carried with the request. Callers build requests
/// with a raw [`Value`]; the dispatcher validates it against the target
/// provider's schema and hands the provider the same request carrying the
/// typed configuration instead.
#[derive(Debug, Clone)]
pub struct InterpretationRequest<C = Value> {
    /// Free-text date expression, e.g. `"next friday at 5pm"`.
    pub prompt: String,
    /// BCP 47 locale tag, e.g. `"en-US"`.
    pub locale: Option<String>,
    /// IANA timezone name. Providers fall back to the local zone when absent.
    pub timezone: Option<String>,
    /// Reference instant for relative expressions. Defaults to the time of the call.
    pub now: Option<DateTime<Utc>>,
    /// Cancels the in-flight backend call when triggered.
    pub signal: Option<CancellationToken>,
    pub config: C,
}

impl InterpretationRequest<Value> {
    /// Create a request with no configuration (`null`).
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            locale: None,
            timezone: None,
            now: None,
            signal: None,
            config: Value::Null,
        }
    }
}

impl<C> InterpretationRequest<C> {
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Replace the configuration, possibly changing its type.
    pub fn with_config<D>(self, config: D) -> InterpretationRequest<D> {
        InterpretationRequest {
            prompt: self.prompt,
            locale: self.locale,
            timezone: self.timezone,
            now: self.now,
            signal: self.signal,
            config,
        }
    }

    /// The reference instant, or the current time when none was supplied.
    pub fn reference_instant(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}
