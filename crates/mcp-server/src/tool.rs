//! MCP tool input schemas
//!
//! Defines the argument shapes of every tool. Loosely-typed fields (remote,
//! branch, session id) are checked later so that errors name the field.

use greptile_mcp_core::PriorMessage;
use schemars::JsonSchema;
use serde::Deserialize;

/// A repository as named by a tool caller
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RepositoryInput {
    #[schemars(description = "Hosting remote: \"github\" or \"gitlab\". Defaults to the configured remote.")]
    pub remote: Option<String>,

    #[schemars(description = "Repository in owner/name form, e.g. \"tokio-rs/tokio\"")]
    pub repository: String,

    #[schemars(description = "Branch to use. Defaults to the configured branch.")]
    pub branch: Option<String>,
}

/// Request schema for the index_repository tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct IndexRepositoryInput {
    #[serde(flatten)]
    pub repository: RepositoryInput,

    #[schemars(description = "Re-process the repository even if it was indexed before")]
    pub reload: Option<bool>,

    #[schemars(description = "Send an email notification when indexing completes")]
    pub notify: Option<bool>,
}

/// Request schema for the query_repository tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QueryRepositoryInput {
    /// Natural language question about the code.
    /// Examples: "How is authentication handled?", "Where are retries configured?"
    #[schemars(description = "Natural language question about the code")]
    pub query: String,

    #[schemars(description = "Repositories to answer from (at least one)")]
    pub repositories: Vec<RepositoryInput>,

    /// Continue an existing conversation. Omit to start a new one; the
    /// response carries the id to reuse.
    #[schemars(
        description = "Conversation id (UUID) returned by a previous query. Omit to start a new conversation."
    )]
    pub session_id: Option<String>,

    #[schemars(
        description = "Replace the stored conversation with these turns. Each entry is a string (user turn) or {role, content} with role \"user\" or \"assistant\"."
    )]
    pub prior_messages: Option<Vec<PriorMessage>>,

    #[schemars(description = "Use the slower, more thorough answering mode")]
    pub genius: Option<bool>,
}

/// Request schema for the search_repository tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchRepositoryInput {
    #[schemars(description = "Natural language description of the code to find")]
    pub query: String,

    #[schemars(description = "Repositories to search (at least one)")]
    pub repositories: Vec<RepositoryInput>,

    #[schemars(description = "Optional conversation id (UUID) passed to the service")]
    pub session_id: Option<String>,
}

/// Request schema for the get_repository_info tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RepositoryInfoInput {
    #[serde(flatten)]
    pub repository: RepositoryInput,
}

/// Request schema for the clear_session tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ClearSessionInput {
    #[schemars(description = "Conversation id (UUID) to forget")]
    pub session_id: String,
}
