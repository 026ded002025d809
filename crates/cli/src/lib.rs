//! Library interface for the greptile-mcp CLI
//!
//! This module exposes the composition of the server's services for
//! integration testing while keeping the main binary logic in main.rs.

use anyhow::{Context, Result};
use greptile_mcp_core::CodeSearchApi;
use greptile_mcp_session::{spawn_idle_sweeper, RetentionPolicy, SessionStore};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

// Re-export commonly needed types for tests
pub use greptile_mcp_core::config::Config;

/// Long-lived services shared by every tool call
pub struct Services {
    pub search_api: Arc<dyn CodeSearchApi>,
    pub store: Arc<SessionStore>,
    sweeper: Option<JoinHandle<()>>,
}

impl Services {
    /// Whether idle sessions are being evicted in the background
    pub fn has_sweeper(&self) -> bool {
        self.sweeper.is_some()
    }
}

impl Drop for Services {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}

/// Build the upstream client and session store from validated configuration
///
/// Must be called inside a tokio runtime when idle eviction is enabled.
pub fn build_services(config: &Config) -> Result<Services> {
    let search_api = greptile_mcp_client::create_search_api(&config.api)
        .context("Failed to create upstream client")?;

    let retention = RetentionPolicy::from(&config.session);
    info!(
        "Session retention: {} messages per session, idle ttl {:?}",
        retention.max_messages_per_session, retention.idle_ttl
    );
    let store = Arc::new(SessionStore::new(retention));

    let sweeper = config.session.idle_ttl().map(|_| {
        spawn_idle_sweeper(Arc::clone(&store), config.session.sweep_interval())
    });

    Ok(Services {
        search_api,
        store,
        sweeper,
    })
}

/// Default log filter for the given verbosity
pub fn log_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("greptile_mcp={level},greptile_mcp_core={level},greptile_mcp_client={level},greptile_mcp_session={level},greptile_mcp_server={level}")
}
