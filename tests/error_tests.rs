//! Tests for the error taxonomy.

use palaver::error::*;

#[test]
fn run_limit_is_distinguishable_from_failures() {
    let limit = PalaverError::RunLimit { limit: 10 };
    assert!(limit.is_run_limit());
    assert_eq!(limit.category(), ErrorCategory::RunLimit);
    assert_eq!(limit.to_string(), "Run loop limit reached after 10 iterations");

    let failure = PalaverError::Response("empty body".into());
    assert!(!failure.is_run_limit());
    assert_eq!(failure.category(), ErrorCategory::Response);
}

#[test]
fn only_transport_errors_are_retryable() {
    assert!(PalaverError::Stream("reset".into()).is_retryable());
    assert!(!PalaverError::tool("x", "bad").is_retryable());
    assert!(!PalaverError::Request("bad".into()).is_retryable());
}

#[test]
fn serde_errors_convert() {
    let err: PalaverError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    assert_eq!(err.category(), ErrorCategory::Serialization);
}

#[test]
fn tool_error_display() {
    let err = PalaverError::tool("search", "timed out");
    assert_eq!(err.to_string(), "Tool error: search: timed out");
}
