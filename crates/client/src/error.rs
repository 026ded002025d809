//! Mapping of HTTP failures onto upstream error kinds

use greptile_mcp_core::UpstreamError;
use tracing::warn;

/// Classify a transport-level reqwest failure
pub(crate) fn classify_transport_error(operation: &str, err: &reqwest::Error) -> UpstreamError {
    let error_kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connection"
    } else if err.is_request() {
        "request build"
    } else if err.is_body() {
        "body"
    } else if err.is_decode() {
        "decode"
    } else {
        "unknown"
    };
    warn!("{operation} failed ({error_kind}): {err}");

    let detail = format!("{operation} failed ({error_kind}): {err}");
    if err.is_timeout() {
        UpstreamError::Timeout(detail)
    } else if err.is_decode() {
        UpstreamError::Malformed(detail)
    } else {
        UpstreamError::Unreachable(detail)
    }
}

/// Upstream answered with a non-success status
pub(crate) fn rejected(operation: &str, status: reqwest::StatusCode, body: String) -> UpstreamError {
    warn!("{operation} returned error {status}: {body}");
    UpstreamError::Rejected {
        status: status.as_u16(),
        body,
    }
}

/// Upstream answered successfully but the payload did not decode
pub(crate) fn malformed(operation: &str, err: &serde_json::Error) -> UpstreamError {
    warn!("Failed to parse {operation} response: {err}");
    UpstreamError::Malformed(format!("Failed to parse {operation} response: {err}"))
}
