//! Query-context assembly
//!
//! Turns a single caller query into an upstream request carrying the whole
//! conversation so far, then records the answer.

use crate::store::SessionStore;
use greptile_mcp_core::search_api::{QueryRequest, Source};
use greptile_mcp_core::{
    normalize_prior_messages, validate_repositories, CodeSearchApi, Error, Message, PriorMessage,
    RepositoryRef, Result, Role, SessionId, UpstreamError,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A query as received from the tool layer
#[derive(Debug, Clone, Default)]
pub struct ContextQuery {
    pub query: String,
    pub repositories: Vec<RepositoryRef>,
    pub session_id: Option<String>,
    /// Replaces the stored history when present
    pub prior_messages: Option<Vec<PriorMessage>>,
    pub genius: bool,
}

/// Inputs that survived validation, ready to touch the store
struct ValidatedQuery {
    query: String,
    repositories: Vec<RepositoryRef>,
    session_id: SessionId,
    prior_messages: Option<Vec<Message>>,
    genius: bool,
}

impl ContextQuery {
    /// Check every input before anything is mutated
    fn validate(self) -> Result<ValidatedQuery> {
        if self.query.trim().is_empty() {
            return Err(Error::validation("query", "Query cannot be empty"));
        }
        validate_repositories(&self.repositories)?;
        let session_id = SessionId::resolve(self.session_id.as_deref())?;
        let prior_messages = self
            .prior_messages
            .map(normalize_prior_messages)
            .transpose()?;

        Ok(ValidatedQuery {
            query: self.query,
            repositories: self.repositories,
            session_id,
            prior_messages,
            genius: self.genius,
        })
    }
}

/// Answer returned to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub answer: String,
    pub sources: Vec<Source>,
    pub session_id: SessionId,
}

/// Assembles session context around upstream queries
pub struct QueryContextAssembler {
    store: Arc<SessionStore>,
    api: Arc<dyn CodeSearchApi>,
}

impl QueryContextAssembler {
    pub fn new(store: Arc<SessionStore>, api: Arc<dyn CodeSearchApi>) -> Self {
        Self { store, api }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Run a query in the context of its session
    ///
    /// On upstream failure the user turn stays in the session and no assistant
    /// turn is recorded. Every call appends its own user turn; a caller that
    /// wants to retry without repeating the question sends `prior_messages`.
    pub async fn query(&self, request: ContextQuery) -> Result<QueryOutcome> {
        let ValidatedQuery {
            query,
            repositories,
            session_id,
            prior_messages,
            genius,
        } = request.validate()?;

        let history = match prior_messages {
            Some(prior) => self
                .store
                .replace_and_append_user_turn(&session_id, prior, query)?,
            None => self.store.append_user_turn(&session_id, query)?,
        };

        info!(
            "Querying session {session_id} ({} turns, {} repositories)",
            history.len(),
            repositories.len()
        );

        let upstream_request =
            QueryRequest::from_history(&history, repositories, Some(session_id.to_string()), genius);
        let started = Instant::now();

        let response = match self.api.query(upstream_request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Query for session {session_id} failed, user turn kept: {e}");
                return Err(e);
            }
        };

        if response.message.trim().is_empty() {
            warn!("Upstream returned an empty answer for session {session_id}");
            return Err(UpstreamError::Malformed("answer message is empty".to_string()).into());
        }

        let recorded =
            self.store
                .append_to_existing(&session_id, Role::Assistant, response.message.clone())?;
        if !recorded {
            info!("Session {session_id} was cleared during the query, answer not recorded");
        }

        debug!(
            "Session {session_id} answered in {}ms with {} sources",
            started.elapsed().as_millis(),
            response.sources.len()
        );

        Ok(QueryOutcome {
            answer: response.message,
            sources: response.sources,
            session_id,
        })
    }
}
