//! Telemetry metric name constants.
//!
//! Centralised metric names for norn operations. Consumers install their
//! own `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `norn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: requested provider id (e.g. "ollama", "lm-studio")
//! - `path`: the path that answered, "provider" or "fallback"
//! - `status`: "ok", "no_match" or "error"

/// Total interpretations dispatched.
///
/// Labels: `provider`, `path`, `status`.
pub const INTERPRETATIONS_TOTAL: &str = "norn_interpretations_total";

/// Interpretation duration in seconds.
///
/// Labels: `provider`, `path`.
pub const INTERPRETATION_DURATION_SECONDS: &str = "norn_interpretation_duration_seconds";

/// Responses that could not be normalized into a date value.
///
/// Labels: `provider`.
pub const NORMALIZATION_FAILURES_TOTAL: &str = "norn_normalization_failures_total";

/// Model list lookups answered from the provider's cache.
///
/// Labels: `provider`.
pub const MODEL_LIST_CACHE_HITS_TOTAL: &str = "norn_model_list_cache_hits_total";
