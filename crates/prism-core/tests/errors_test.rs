use prism_core::errors::*;

#[test]
fn all_signals_failed_lists_every_failure() {
    let err = RetrievalError::AllSignalsFailed {
        failures: vec!["bm25: timeout".into(), "dense: refused".into()],
    };
    let msg = err.to_string();
    assert!(msg.contains("all 2 signals failed"));
    assert!(msg.contains("bm25: timeout"));
    assert!(msg.contains("dense: refused"));
}

#[test]
fn backend_error_carries_backend_name() {
    let err = BackendError::Timeout {
        backend: "vector".into(),
        elapsed_ms: 1500,
    };
    assert_eq!(err.backend(), "vector");
    assert!(err.to_string().contains("1500ms"));
}

#[test]
fn validation_error_carries_field() {
    let err = ConfigError::ValidationFailed {
        field: "rrf_k".into(),
        message: "must be greater than 0".into(),
    };
    assert!(err.to_string().contains("rrf_k"));
}

// --- From impls ---

#[test]
fn retrieval_error_converts_to_prism_error() {
    let err: PrismError = RetrievalError::NoSignalsConfigured.into();
    assert!(matches!(err, PrismError::RetrievalError(_)));
}

#[test]
fn backend_error_converts_to_prism_error() {
    let err: PrismError = BackendError::Unavailable {
        backend: "lexical".into(),
        reason: "connection refused".into(),
    }
    .into();
    assert!(matches!(err, PrismError::BackendError(_)));
}

#[test]
fn config_error_converts_to_prism_error() {
    let err: PrismError = ConfigError::FileNotFound {
        path: "prism.toml".into(),
    }
    .into();
    assert!(matches!(err, PrismError::ConfigError(_)));
}

// --- Error codes ---

#[test]
fn error_codes_pass_through_the_aggregate() {
    let err: PrismError = RetrievalError::AllSignalsFailed { failures: vec![] }.into();
    assert_eq!(err.error_code(), error_code::ALL_SIGNALS_FAILED);

    let err: PrismError = BackendError::MalformedResponse {
        backend: "catalog".into(),
        reason: "missing term".into(),
    }
    .into();
    assert_eq!(err.error_code(), error_code::BACKEND_MALFORMED_RESPONSE);
}
