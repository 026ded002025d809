//! Error types for the MCP server

use greptile_mcp_core::Error as CoreError;
use rmcp::model::{ErrorCode, ErrorData};
use serde_json::json;
use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, McpError>;

/// Errors that can occur in the MCP server itself
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("MCP transport error: {0}")]
    Transport(String),
}

impl McpError {
    /// Convert to MCP tool error format (isError: true response)
    pub fn to_tool_error_message(&self) -> String {
        match self {
            McpError::Config(msg) => {
                format!("Configuration error: {msg}\n\nPlease check your greptile-mcp configuration.")
            }
            McpError::Serialization(e) => {
                format!("Failed to format results: {e}")
            }
            McpError::Transport(msg) => {
                format!("Transport error: {msg}")
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            McpError::Config(_) => "config_error",
            McpError::Serialization(_) | McpError::Transport(_) => "internal_error",
        }
    }
}

/// Convert a domain error into rmcp ErrorData
///
/// Validation failures are the caller's fault and map to invalid params;
/// everything else is an internal error. Both carry `{kind, message}`.
pub(crate) fn to_error_data(err: &CoreError) -> ErrorData {
    let code = if err.is_validation() {
        ErrorCode::INVALID_PARAMS
    } else {
        ErrorCode::INTERNAL_ERROR
    };
    let message = err.to_string();
    ErrorData {
        code,
        data: Some(json!({ "kind": err.kind(), "message": message })),
        message: message.into(),
    }
}

/// Convert McpError to rmcp ErrorData
pub(crate) fn mcp_error_data(err: &McpError) -> ErrorData {
    ErrorData {
        code: ErrorCode::INTERNAL_ERROR,
        message: err.to_tool_error_message().into(),
        data: Some(json!({ "kind": err.kind(), "message": err.to_string() })),
    }
}
