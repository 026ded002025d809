use thiserror::Error;

/// Result type for greptile-mcp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for greptile-mcp operations
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-supplied input failed validation before any side effect
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// The upstream code-search service failed
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failures of the upstream code-search service
///
/// The variants separate "could not talk to the service" from "the service
/// said no" so that callers can decide whether a retry makes sense.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Connection, DNS or transport-level failure
    #[error("Upstream unreachable: {0}")]
    Unreachable(String),

    /// The request exceeded the configured timeout
    #[error("Upstream timed out: {0}")]
    Timeout(String),

    /// The service answered with a non-success status
    #[error("Upstream rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The service answered but the payload could not be decoded
    #[error("Malformed upstream response: {0}")]
    Malformed(String),
}

impl UpstreamError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "upstream_unreachable",
            Self::Timeout(_) => "upstream_timeout",
            Self::Rejected { .. } => "upstream_rejected",
            Self::Malformed(_) => "upstream_malformed",
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable(_) | Self::Timeout(_) => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            Self::Malformed(_) => false,
        }
    }
}

impl Error {
    /// Creates a validation error for the named field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable machine-readable kind, used by the tool gateway
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::Upstream(e) => e.kind(),
            Self::Config(_) => "config_error",
            Self::Io(_) | Self::Other(_) => "internal_error",
        }
    }

    /// Returns true for errors raised before any state mutation
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_names_field() {
        let err = Error::validation("repository", "expected owner/name, got 'foo'");
        assert_eq!(err.kind(), "validation_error");
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "Invalid repository: expected owner/name, got 'foo'"
        );
    }

    #[test]
    fn test_upstream_kinds_are_distinct() {
        let unreachable: Error = UpstreamError::Unreachable("refused".to_string()).into();
        let rejected: Error = UpstreamError::Rejected {
            status: 401,
            body: "bad key".to_string(),
        }
        .into();
        let malformed: Error = UpstreamError::Malformed("eof".to_string()).into();

        assert_eq!(unreachable.kind(), "upstream_unreachable");
        assert_eq!(rejected.kind(), "upstream_rejected");
        assert_eq!(malformed.kind(), "upstream_malformed");
        assert!(!rejected.is_validation());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(UpstreamError::Timeout("30s".to_string()).is_retryable());
        assert!(UpstreamError::Rejected {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(!UpstreamError::Rejected {
            status: 400,
            body: String::new()
        }
        .is_retryable());
        assert!(!UpstreamError::Malformed("x".to_string()).is_retryable());
    }
}
