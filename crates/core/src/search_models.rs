//! Request and response models for the upstream code-search API
//!
//! These types are the wire contract of the hosted service. Field names are
//! camelCase on the wire; citation objects are kept as opaque JSON because
//! their shape belongs to the upstream service.

use crate::error::{Result, UpstreamError};
use crate::message::Message;
use crate::repository::RepositoryRef;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque citation object returned by the upstream service
pub type Source = Value;

/// Request to (re)index a repository
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexRequest {
    #[serde(flatten)]
    pub repository: RepositoryRef,
    /// Re-process the repository even if it was indexed before
    pub reload: bool,
    /// Ask the service to email when indexing completes
    pub notify: bool,
}

/// Acknowledgement of an index request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_endpoint: Option<String>,
}

/// A conversation turn as the upstream service expects it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamMessage {
    pub id: String,
    pub content: String,
    pub role: String,
}

/// Natural-language query over one or more repositories
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub messages: Vec<UpstreamMessage>,
    pub repositories: Vec<RepositoryRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub stream: bool,
    /// Slower, more thorough answering mode
    pub genius: bool,
}

impl QueryRequest {
    /// Build the upstream payload from an ordered session history
    pub fn from_history(
        history: &[Message],
        repositories: Vec<RepositoryRef>,
        session_id: Option<String>,
        genius: bool,
    ) -> Self {
        let messages = history
            .iter()
            .enumerate()
            .map(|(index, message)| UpstreamMessage {
                id: format!("msg-{index}"),
                content: message.content.clone(),
                role: message.role.as_str().to_string(),
            })
            .collect();

        Self {
            messages,
            repositories,
            session_id,
            stream: false,
            genius,
        }
    }
}

/// Answer to a [`QueryRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub message: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// Search for relevant files without generating an answer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub repositories: Vec<RepositoryRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub stream: bool,
}

/// Result of a [`SearchRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub sources: Vec<Source>,
}

impl SearchResponse {
    /// Decode the upstream payload
    ///
    /// The service answers with a bare array of sources; an object carrying a
    /// `sources` array is accepted as well.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(sources) => Ok(Self { sources }),
            Value::Object(mut object) => match object.remove("sources") {
                Some(Value::Array(sources)) => Ok(Self { sources }),
                _ => Err(UpstreamError::Malformed(
                    "search response object has no 'sources' array".to_string(),
                )
                .into()),
            },
            other => Err(UpstreamError::Malformed(format!(
                "expected an array of sources, got {}",
                json_type_name(&other)
            ))
            .into()),
        }
    }
}

/// Indexing status of a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInfo {
    pub repository: String,
    pub remote: String,
    pub branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_processed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_files: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    /// Fields this crate does not model, passed through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RepositoryInfo {
    /// Whether the upstream service reports indexing as finished
    pub fn is_ready(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("completed"))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Remote;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn repo() -> RepositoryRef {
        RepositoryRef::new(Remote::Github, "owner/name", "main")
    }

    #[test]
    fn test_query_request_wire_shape() {
        let history = vec![
            Message::user("What does auth.py do?").unwrap(),
            Message::assistant("It validates tokens").unwrap(),
            Message::user("Who calls it?").unwrap(),
        ];
        let request = QueryRequest::from_history(
            &history,
            vec![repo()],
            Some("abcdef12-3456-7890-abcd-ef1234567890".to_string()),
            true,
        );

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "messages": [
                    {"id": "msg-0", "content": "What does auth.py do?", "role": "user"},
                    {"id": "msg-1", "content": "It validates tokens", "role": "assistant"},
                    {"id": "msg-2", "content": "Who calls it?", "role": "user"},
                ],
                "repositories": [
                    {"remote": "github", "repository": "owner/name", "branch": "main"}
                ],
                "sessionId": "abcdef12-3456-7890-abcd-ef1234567890",
                "stream": false,
                "genius": true,
            })
        );
    }

    #[test]
    fn test_index_request_flattens_repository() {
        let request = IndexRequest {
            repository: repo(),
            reload: true,
            notify: false,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "remote": "github",
                "repository": "owner/name",
                "branch": "main",
                "reload": true,
                "notify": false,
            })
        );
    }

    #[test]
    fn test_search_response_accepts_bare_array() {
        let response = SearchResponse::from_value(json!([{"filepath": "a.rs"}])).unwrap();
        assert_eq!(response.sources.len(), 1);
    }

    #[test]
    fn test_search_response_rejects_scalar() {
        let err = SearchResponse::from_value(json!("nope")).unwrap_err();
        assert_eq!(err.kind(), "upstream_malformed");
    }

    #[test]
    fn test_repository_info_keeps_unknown_fields() {
        let info: RepositoryInfo = serde_json::from_value(json!({
            "repository": "owner/name",
            "remote": "github",
            "branch": "main",
            "status": "COMPLETED",
            "filesProcessed": 10,
            "numFiles": 10,
            "sha": "abc123",
            "private": false,
            "indexedAt": "2024-01-01"
        }))
        .unwrap();

        assert!(info.is_ready());
        assert_eq!(info.files_processed, Some(10));
        assert_eq!(info.extra.get("indexedAt"), Some(&json!("2024-01-01")));
    }
}
