//! MCP Server implementation for greptile-mcp
//!
//! Exposes the hosted code-search API as MCP tools over stdio using the rmcp
//! SDK. Queries go through the session assembler; the other tools call the
//! upstream client directly.

use crate::error::{mcp_error_data, to_error_data, McpError};
use crate::output_formatter::{
    format_index, format_query, format_repository_info, format_search, FormattedClearResponse,
};
use crate::repository_resolution::{resolve_repositories, resolve_repository};
use crate::tool::{
    ClearSessionInput, IndexRepositoryInput, QueryRepositoryInput, RepositoryInfoInput,
    SearchRepositoryInput,
};
use greptile_mcp_core::config::RepositoryDefaults;
use greptile_mcp_core::search_api::{IndexRequest, SearchRequest};
use greptile_mcp_core::{CodeSearchApi, Error, SessionId};
use greptile_mcp_session::{ContextQuery, QueryContextAssembler, SessionStore};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, ErrorData, Implementation, ProtocolVersion, ServerCapabilities,
        ServerInfo,
    },
    tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// MCP Server for greptile-mcp
#[derive(Clone)]
pub struct GreptileMcpServer {
    tool_router: ToolRouter<Self>,
    search_api: Arc<dyn CodeSearchApi>,
    assembler: Arc<QueryContextAssembler>,
    defaults: RepositoryDefaults,
}

impl std::fmt::Debug for GreptileMcpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreptileMcpServer")
            .field("search_api", &"<CodeSearchApi>")
            .field("sessions", &self.assembler.store().session_count())
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl GreptileMcpServer {
    /// Create a new MCP server instance
    pub fn new(
        search_api: Arc<dyn CodeSearchApi>,
        store: Arc<SessionStore>,
        defaults: RepositoryDefaults,
    ) -> Self {
        let assembler = QueryContextAssembler::new(store, Arc::clone(&search_api));
        Self {
            tool_router: Self::tool_router(),
            search_api,
            assembler: Arc::new(assembler),
            defaults,
        }
    }
}

/// Serialize a formatted response into a successful tool result
fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, ErrorData> {
    let json_output = serde_json::to_string_pretty(value)
        .map_err(|e| mcp_error_data(&McpError::Serialization(e)))?;
    Ok(CallToolResult::success(vec![Content::text(json_output)]))
}

/// Log a failed tool call and convert it for the client
fn tool_error(tool: &str, err: Error) -> ErrorData {
    warn!("{tool} failed ({}): {err}", err.kind());
    to_error_data(&err)
}

#[tool_router]
impl GreptileMcpServer {
    /// Submit a repository for indexing so it can be queried.
    #[tool(
        name = "index_repository",
        description = "Submit a GitHub or GitLab repository for indexing. Indexing runs in the background; use get_repository_info to check when it is ready. Must be done once before a repository can be queried or searched."
    )]
    async fn index_repository(
        &self,
        Parameters(input): Parameters<IndexRepositoryInput>,
    ) -> Result<CallToolResult, ErrorData> {
        info!("Executing index_repository: {}", input.repository.repository);

        let repository = resolve_repository(&input.repository, &self.defaults)
            .map_err(|e| tool_error("index_repository", e))?;

        let request = IndexRequest {
            repository: repository.clone(),
            reload: input.reload.unwrap_or(false),
            notify: input.notify.unwrap_or(false),
        };
        let response = self
            .search_api
            .index_repository(request)
            .await
            .map_err(|e| tool_error("index_repository", e))?;

        info!("index_repository accepted for {repository}");
        json_result(&format_index(&repository, response))
    }

    /// Ask a question about indexed repositories, keeping conversation context.
    #[tool(
        name = "query_repository",
        description = "Ask a natural language question about one or more indexed repositories. Returns an answer with source citations and a session_id; pass the session_id back to ask follow-up questions in the same conversation."
    )]
    async fn query_repository(
        &self,
        Parameters(input): Parameters<QueryRepositoryInput>,
    ) -> Result<CallToolResult, ErrorData> {
        info!("Executing query_repository: query={}", input.query);

        let repositories = resolve_repositories(&input.repositories, &self.defaults)
            .map_err(|e| tool_error("query_repository", e))?;

        let request = ContextQuery {
            query: input.query,
            repositories,
            session_id: input.session_id,
            prior_messages: input.prior_messages,
            genius: input.genius.unwrap_or(false),
        };
        let outcome = self
            .assembler
            .query(request)
            .await
            .map_err(|e| tool_error("query_repository", e))?;

        info!(
            "query_repository completed: session={}, {} sources",
            outcome.session_id,
            outcome.sources.len()
        );
        json_result(&format_query(outcome))
    }

    /// Find files relevant to a query without generating an answer.
    #[tool(
        name = "search_repository",
        description = "Search indexed repositories for files relevant to a natural language query. Returns source references without a generated answer."
    )]
    async fn search_repository(
        &self,
        Parameters(input): Parameters<SearchRepositoryInput>,
    ) -> Result<CallToolResult, ErrorData> {
        info!("Executing search_repository: query={}", input.query);

        if input.query.trim().is_empty() {
            return Err(tool_error(
                "search_repository",
                Error::validation("query", "Query cannot be empty"),
            ));
        }
        let repositories = resolve_repositories(&input.repositories, &self.defaults)
            .map_err(|e| tool_error("search_repository", e))?;
        SessionId::validate(input.session_id.as_deref())
            .map_err(|e| tool_error("search_repository", e))?;

        let request = SearchRequest {
            query: input.query,
            repositories,
            session_id: SessionId::normalize(input.session_id.as_deref()).map(|s| s.to_string()),
            stream: false,
        };
        let response = self
            .search_api
            .search(request)
            .await
            .map_err(|e| tool_error("search_repository", e))?;

        info!("search_repository completed: {} results", response.sources.len());
        json_result(&format_search(response))
    }

    /// Report the indexing status of a repository.
    #[tool(
        name = "get_repository_info",
        description = "Get the indexing status of a repository, including whether it is ready to be queried and how many files have been processed."
    )]
    async fn get_repository_info(
        &self,
        Parameters(input): Parameters<RepositoryInfoInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let repository = resolve_repository(&input.repository, &self.defaults)
            .map_err(|e| tool_error("get_repository_info", e))?;
        info!("Executing get_repository_info: {repository}");

        let info = self
            .search_api
            .repository_info(&repository)
            .await
            .map_err(|e| tool_error("get_repository_info", e))?;

        json_result(&format_repository_info(&repository, info))
    }

    /// Forget a conversation.
    #[tool(
        name = "clear_session",
        description = "Forget the stored conversation history of a session_id returned by query_repository."
    )]
    async fn clear_session(
        &self,
        Parameters(input): Parameters<ClearSessionInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let session_id = SessionId::resolve(Some(input.session_id.as_str()))
            .map_err(|e| tool_error("clear_session", e))?;
        let cleared = self.assembler.store().clear_session(&session_id);
        info!("clear_session {session_id}: cleared={cleared}");

        json_result(&FormattedClearResponse {
            session_id,
            cleared,
        })
    }
}

#[tool_handler]
impl ServerHandler for GreptileMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "greptile-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Code search and Q&A over GitHub and GitLab repositories. \
                Index a repository with index_repository, wait until get_repository_info \
                reports it ready, then ask questions with query_repository. Reuse the \
                returned session_id for follow-up questions."
                    .to_string(),
            ),
        }
    }
}

/// Run the MCP server with stdio transport
///
/// This is the main entry point for the `greptile-mcp serve` command.
/// It runs until the client disconnects.
pub async fn run_mcp_server(
    search_api: Arc<dyn CodeSearchApi>,
    store: Arc<SessionStore>,
    defaults: RepositoryDefaults,
) -> crate::Result<()> {
    defaults
        .remote
        .parse::<greptile_mcp_core::Remote>()
        .map_err(|e| McpError::Config(e.to_string()))?;

    info!(
        "Starting MCP server (default remote: {}, default branch: {})",
        defaults.remote, defaults.branch
    );

    let server = GreptileMcpServer::new(search_api, store, defaults);

    // Start server with stdio transport
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| McpError::Transport(e.to_string()))?;

    info!("MCP server started, waiting for client requests");

    service
        .waiting()
        .await
        .map_err(|e| McpError::Transport(e.to_string()))?;

    info!("MCP server shutting down");
    Ok(())
}
