//! Upstream code-search API trait definition
//!
//! This trait is the seam between the session layer and the hosted service.
//! The HTTP implementation lives in the client crate; tests substitute mocks.

use crate::error::Result;
use crate::repository::RepositoryRef;
use async_trait::async_trait;

pub use super::search_models::*;

/// Operations offered by the upstream code-search service
#[async_trait]
pub trait CodeSearchApi: Send + Sync {
    /// Submit a repository for indexing
    async fn index_repository(&self, request: IndexRequest) -> Result<IndexResponse>;

    /// Ask a natural-language question with conversation context
    async fn query(&self, request: QueryRequest) -> Result<QueryResponse>;

    /// Find relevant files for a query without generating an answer
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse>;

    /// Look up the indexing status of a repository
    async fn repository_info(&self, repository: &RepositoryRef) -> Result<RepositoryInfo>;
}
