//! HTTP client for the Greptile code-search API

use crate::error::{classify_transport_error, malformed, rejected};
use async_trait::async_trait;
use greptile_mcp_core::config::ApiConfig;
use greptile_mcp_core::search_api::{
    CodeSearchApi, IndexRequest, IndexResponse, QueryRequest, QueryResponse, RepositoryInfo,
    SearchRequest, SearchResponse,
};
use greptile_mcp_core::{Error, RepositoryRef, Result};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Connection settings for [`GreptileClient`]
#[derive(Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub api_key: String,
    pub github_token: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("github_token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientSettings {
    /// Build settings from API configuration, requiring both credentials
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            Error::config("API key required. Set api.api_key or GREPTILE_API_KEY env var")
        })?;
        let github_token = config.github_token.clone().ok_or_else(|| {
            Error::config("GitHub token required. Set api.github_token or GITHUB_TOKEN env var")
        })?;

        Ok(Self {
            base_url: config.base_url.clone(),
            api_key,
            github_token,
            timeout: config.timeout(),
        })
    }
}

/// Greptile API client
pub struct GreptileClient {
    client: Client,
    base_url: Url,
    api_key: String,
    github_token: String,
}

impl std::fmt::Debug for GreptileClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreptileClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl GreptileClient {
    /// Create a new client
    ///
    /// The timeout applies to each request as a whole, so a slow upstream
    /// surfaces as [`greptile_mcp_core::UpstreamError::Timeout`].
    pub fn new(settings: ClientSettings) -> Result<Self> {
        info!("Initializing Greptile client");
        info!("  Base URL: {}", settings.base_url);
        info!("  Timeout: {:?}", settings.timeout);

        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            Error::config(format!("Invalid base_url '{}': {e}", settings.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "Invalid base_url '{}': cannot be used as a base",
                settings.base_url
            )));
        }

        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("greptile-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key: settings.api_key,
            github_token: settings.github_token,
        })
    }

    /// Join path segments onto the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::config(format!("Invalid base_url '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-GitHub-Token", &self.github_token)
    }

    async fn execute<T: DeserializeOwned + Send>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        let started = Instant::now();

        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| classify_transport_error(operation, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(operation, &e))?;

        debug!(
            "{operation} answered {status} in {}ms ({} bytes)",
            started.elapsed().as_millis(),
            body.len()
        );

        if !status.is_success() {
            return Err(rejected(operation, status, body).into());
        }

        serde_json::from_str(&body).map_err(|e| malformed(operation, &e).into())
    }
}

#[async_trait]
impl CodeSearchApi for GreptileClient {
    async fn index_repository(&self, request: IndexRequest) -> Result<IndexResponse> {
        info!("Submitting {} for indexing", request.repository);
        let url = self.endpoint(&["repositories"])?;
        self.execute("index_repository", self.client.post(url).json(&request))
            .await
    }

    async fn query(&self, request: QueryRequest) -> Result<QueryResponse> {
        info!(
            "Querying {} repositories with {} messages",
            request.repositories.len(),
            request.messages.len()
        );
        let url = self.endpoint(&["query"])?;
        self.execute("query", self.client.post(url).json(&request))
            .await
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        info!("Searching {} repositories", request.repositories.len());
        let url = self.endpoint(&["search"])?;
        let value: Value = self
            .execute("search", self.client.post(url).json(&request))
            .await?;
        SearchResponse::from_value(value)
    }

    async fn repository_info(&self, repository: &RepositoryRef) -> Result<RepositoryInfo> {
        let id = repository.upstream_id();
        debug!("Fetching repository info for {id}");
        let url = self.endpoint(&["repositories", &id])?;
        self.execute("repository_info", self.client.get(url)).await
    }
}
