use norn::{Availability, NornError, ProviderId, Result};

#[test]
fn test_error_display() {
    let err = NornError::UnknownProvider("openai".to_string());
    assert!(err.to_string().contains("openai"));
}

#[test]
fn test_invalid_config_names_provider() {
    let err = NornError::InvalidConfig {
        provider: ProviderId::LmStudio,
        reason: "missing field `baseUrl`".to_string(),
    };
    let text = err.to_string();
    assert!(text.contains("lm-studio"));
    assert!(text.contains("baseUrl"));
}

#[test]
fn test_not_ready_reports_availability() {
    let err = NornError::NotReady {
        provider: ProviderId::OnDevice,
        availability: Availability::Downloading,
    };
    assert!(err.to_string().contains("downloading"));
}

#[test]
fn test_result_alias() {
    fn returns_error() -> Result<()> {
        Err(NornError::NotYetAvailable(ProviderId::Cloud))
    }
    assert!(returns_error().is_err());
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn only_config_errors_trigger_fallback() {
    assert!(
        NornError::InvalidConfig {
            provider: ProviderId::Ollama,
            reason: "bad".into()
        }
        .is_fallback_trigger()
    );

    assert!(!NornError::UnknownProvider("x".into()).is_fallback_trigger());
    assert!(!NornError::Http("connection refused".into()).is_fallback_trigger());
    assert!(
        !NornError::Api {
            status: 500,
            message: "internal".into()
        }
        .is_fallback_trigger()
    );
    assert!(!NornError::Cancelled.is_fallback_trigger());
    assert!(!NornError::NotYetAvailable(ProviderId::Cloud).is_fallback_trigger());
    assert!(
        !NornError::MissingIsoValue {
            provider: ProviderId::Ollama
        }
        .is_fallback_trigger()
    );
    assert!(
        !NornError::NotReady {
            provider: ProviderId::OnDevice,
            availability: Availability::Unavailable
        }
        .is_fallback_trigger()
    );
}

#[test]
fn cancelled_is_recognised() {
    assert!(NornError::Cancelled.is_cancelled());
    assert!(!NornError::Http("timeout".into()).is_cancelled());
}

#[test]
fn json_error_converts() {
    let err: NornError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    assert!(matches!(err, NornError::Json(_)));
}
