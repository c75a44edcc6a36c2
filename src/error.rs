//! Norn error types

use crate::types::{Availability, ProviderId};

/// Norn error types
#[derive(Debug, thiserror::Error)]
pub enum NornError {
    // Dispatch errors
    /// The requested provider is not registered. Never recovered by fallback.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// The supplied configuration does not satisfy the provider's schema.
    #[error("invalid configuration for {provider}: {reason}")]
    InvalidConfig { provider: ProviderId, reason: String },

    // Transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The caller's cancellation signal fired while the request was in flight.
    #[error("request cancelled")]
    Cancelled,

    // Readiness errors
    #[error("{provider} is not ready (availability: {availability})")]
    NotReady {
        provider: ProviderId,
        availability: Availability,
    },

    #[error("{0} is not yet available")]
    NotYetAvailable(ProviderId),

    // Normalization errors
    /// The backend answered, but its payload had no usable `value` string.
    #[error("{provider} response is missing an ISO date value")]
    MissingIsoValue { provider: ProviderId },

    #[error("unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("not a parseable instant: {0}")]
    InvalidInstant(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl NornError {
    /// Whether this failure came from the caller's cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, NornError::Cancelled)
    }

    /// Whether the dispatcher may recover from this failure via the fallback parser.
    ///
    /// Only configuration problems qualify. A configured provider that fails
    /// at call time is surfaced to the caller as-is.
    pub fn is_fallback_trigger(&self) -> bool {
        matches!(self, NornError::InvalidConfig { .. })
    }
}

impl From<reqwest::Error> for NornError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => NornError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => NornError::Http(err.to_string()),
        }
    }
}

/// Result type alias for Norn operations
pub type Result<T> = std::result::Result<T, NornError>;
