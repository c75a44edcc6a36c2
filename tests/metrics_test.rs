//! Tests for metrics integration.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;

use async_trait::async_trait;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use norn::providers::OllamaProvider;
use norn::{
    DateInterpretation, DateInterpreter, DateProvider, InterpretationRequest, NornError,
    ProviderConfig, ProviderId, Result, telemetry,
};

// ============================================================================
// Mock providers
// ============================================================================

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct KeyConfig {
    key: String,
}

impl ProviderConfig for KeyConfig {}

struct FixedProvider {
    fail: bool,
}

#[async_trait]
impl DateProvider for FixedProvider {
    type Config = KeyConfig;

    fn id(&self) -> ProviderId {
        ProviderId::LmStudio
    }

    fn name(&self) -> &str {
        "fixed"
    }

    fn description(&self) -> &str {
        "fixed answer"
    }

    async fn interpret_date(
        &self,
        _request: InterpretationRequest<KeyConfig>,
    ) -> Result<DateInterpretation> {
        if self.fail {
            return Err(NornError::Http("connection refused".to_string()));
        }
        Ok(DateInterpretation::new(
            "2025-01-02T00:00:00+00:00",
            ProviderId::LmStudio,
        ))
    }
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Value of a label on the first counter with the given name.
fn counter_label(snapshot: &SnapshotVec, name: &str, label: &str) -> Option<String> {
    snapshot
        .iter()
        .find(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .and_then(|(key, _, _, _)| {
            key.key()
                .labels()
                .find(|l| l.key() == label)
                .map(|l| l.value().to_string())
        })
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

fn interpreter(fail: bool) -> DateInterpreter {
    DateInterpreter::builder()
        .provider(Arc::new(FixedProvider { fail }))
        .build()
        .unwrap()
}

fn request(config: Value) -> InterpretationRequest {
    InterpretationRequest::new("tomorrow")
        .timezone("UTC")
        .with_config(config)
}

// ============================================================================
// Tests
// ============================================================================

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn provider_success_records_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                interpreter(false)
                    .interpret_date(ProviderId::LmStudio, request(json!({ "key": "k" })))
                    .await
            })
        })
    });
    assert!(result.is_ok());

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::INTERPRETATIONS_TOTAL), 1);
    assert_eq!(
        counter_label(&snapshot, telemetry::INTERPRETATIONS_TOTAL, "path").as_deref(),
        Some("provider")
    );
    assert_eq!(
        counter_label(&snapshot, telemetry::INTERPRETATIONS_TOTAL, "status").as_deref(),
        Some("ok")
    );
    assert!(
        has_histogram(&snapshot, telemetry::INTERPRETATION_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn provider_failure_records_error_status() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let _result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                interpreter(true)
                    .interpret_date(ProviderId::LmStudio, request(json!({ "key": "k" })))
                    .await
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::INTERPRETATIONS_TOTAL), 1);
    assert_eq!(
        counter_label(&snapshot, telemetry::INTERPRETATIONS_TOTAL, "status").as_deref(),
        Some("error")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn fallback_path_is_labelled() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                interpreter(false)
                    .interpret_date(ProviderId::LmStudio, request(Value::Null))
                    .await
            })
        })
    });
    assert_eq!(result.unwrap().provider_id, ProviderId::Fallback);

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_label(&snapshot, telemetry::INTERPRETATIONS_TOTAL, "path").as_deref(),
        Some("fallback")
    );
    assert_eq!(
        counter_label(&snapshot, telemetry::INTERPRETATIONS_TOTAL, "provider").as_deref(),
        Some("lm-studio")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn unknown_provider_records_error_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let _result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                interpreter(false)
                    .interpret_date(ProviderId::Ollama, request(Value::Null))
                    .await
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::INTERPRETATIONS_TOTAL), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn normalization_failure_is_counted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "no idea" } }]
        })))
        .mount(&server)
        .await;

    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                DateInterpreter::builder()
                    .default_providers()
                    .build()
                    .unwrap()
                    .interpret_date(
                        ProviderId::Ollama,
                        request(json!({ "baseUrl": server.uri() })),
                    )
                    .await
            })
        })
    });
    assert!(matches!(result, Err(NornError::MissingIsoValue { .. })));

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_total(&snapshot, telemetry::NORMALIZATION_FAILURES_TOTAL),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn model_list_cache_hit_is_counted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": [{ "id": "llama3.2" }] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let provider = OllamaProvider::new().unwrap();
                provider.list_models(&server.uri()).await.unwrap();
                provider.list_models(&server.uri()).await.unwrap();
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_total(&snapshot, telemetry::MODEL_LIST_CACHE_HITS_TOTAL),
        1
    );
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let _result = interpreter(false)
        .interpret_date(ProviderId::LmStudio, request(json!({ "key": "k" })))
        .await
        .unwrap();
}
