//! Output shapes for MCP tool responses
//!
//! Citation objects are passed through untouched; only the envelope around
//! them is defined here.

use greptile_mcp_core::search_api::{IndexResponse, RepositoryInfo, SearchResponse, Source};
use greptile_mcp_core::{RepositoryRef, SessionId};
use greptile_mcp_session::QueryOutcome;
use serde::Serialize;
use serde_json::{Map, Value};

/// Formatted query_repository response
#[derive(Debug, Serialize)]
pub struct FormattedQueryResponse {
    pub answer: String,
    pub sources: Vec<Source>,
    /// Pass this back to continue the conversation
    pub session_id: SessionId,
}

/// Formatted search_repository response
#[derive(Debug, Serialize)]
pub struct FormattedSearchResponse {
    pub sources: Vec<Source>,
    pub total_results: usize,
}

/// Formatted index_repository response
#[derive(Debug, Serialize)]
pub struct FormattedIndexResponse {
    pub repository: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_endpoint: Option<String>,
}

/// Formatted get_repository_info response
#[derive(Debug, Serialize)]
pub struct FormattedRepositoryInfo {
    pub repository: String,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_processed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_files: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    /// Fields the service returned that are not modelled above
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

/// Formatted clear_session response
#[derive(Debug, Serialize)]
pub struct FormattedClearResponse {
    pub session_id: SessionId,
    pub cleared: bool,
}

pub fn format_query(outcome: QueryOutcome) -> FormattedQueryResponse {
    FormattedQueryResponse {
        answer: outcome.answer,
        sources: outcome.sources,
        session_id: outcome.session_id,
    }
}

pub fn format_search(response: SearchResponse) -> FormattedSearchResponse {
    FormattedSearchResponse {
        total_results: response.sources.len(),
        sources: response.sources,
    }
}

pub fn format_index(repository: &RepositoryRef, response: IndexResponse) -> FormattedIndexResponse {
    FormattedIndexResponse {
        repository: repository.to_string(),
        message: response.message,
        status_endpoint: response.status_endpoint,
    }
}

pub fn format_repository_info(
    repository: &RepositoryRef,
    info: RepositoryInfo,
) -> FormattedRepositoryInfo {
    FormattedRepositoryInfo {
        repository: repository.to_string(),
        ready: info.is_ready(),
        status: info.status,
        files_processed: info.files_processed,
        num_files: info.num_files,
        sha: info.sha,
        private: info.private,
        details: info.extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greptile_mcp_core::Remote;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_search_counts_sources() {
        let formatted = format_search(SearchResponse {
            sources: vec![json!({"filepath": "a.rs"}), json!({"filepath": "b.rs"})],
        });
        assert_eq!(formatted.total_results, 2);
        assert_eq!(formatted.sources[1]["filepath"], "b.rs");
    }

    #[test]
    fn test_repository_info_keeps_unknown_fields() {
        let info: RepositoryInfo = serde_json::from_value(json!({
            "repository": "acme/api",
            "remote": "github",
            "branch": "main",
            "status": "processing",
            "filesProcessed": 10,
            "numFiles": 40,
            "createdAt": "2024-01-01"
        }))
        .unwrap();
        let repo = RepositoryRef::new(Remote::Github, "acme/api", "main");

        let value = serde_json::to_value(format_repository_info(&repo, info)).unwrap();
        assert_eq!(value["repository"], "github/acme/api@main");
        assert_eq!(value["ready"], false);
        assert_eq!(value["num_files"], 40);
        assert_eq!(value["details"]["createdAt"], "2024-01-01");
    }

    #[test]
    fn test_index_omits_missing_status_endpoint() {
        let repo = RepositoryRef::new(Remote::Gitlab, "acme/api", "dev");
        let formatted = format_index(
            &repo,
            IndexResponse {
                message: "queued".to_string(),
                status_endpoint: None,
            },
        );
        let value = serde_json::to_value(formatted).unwrap();
        assert_eq!(value, json!({"repository": "gitlab/acme/api@dev", "message": "queued"}));
    }
}
