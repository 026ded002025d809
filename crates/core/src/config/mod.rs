//! Configuration module for greptile-mcp
//!
//! Configuration is layered from hard-coded defaults, an optional TOML file
//! and environment variables. See [`Config::load`] for precedence.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use crate::repository::Remote;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use defaults::*;

/// Returns the path to the global configuration file
///
/// Stored at `~/.greptile-mcp/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".greptile-mcp").join("config.toml"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream API connection
    #[serde(default)]
    pub api: ApiConfig,

    /// Session retention
    #[serde(default)]
    pub session: SessionConfig,

    /// Fallbacks for tool inputs that omit remote or branch
    #[serde(default)]
    pub defaults: RepositoryDefaults,
}

/// Upstream API connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the code-search API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key (or use GREPTILE_API_KEY env var)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Token used by the service to read private repositories (or GITHUB_TOKEN)
    #[serde(default)]
    pub github_token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            github_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***REDACTED***"))
            .field(
                "github_token",
                &self.github_token.as_ref().map(|_| "***REDACTED***"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Session retention settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Oldest turns are dropped once a session exceeds this many messages
    #[serde(default = "default_max_messages_per_session")]
    pub max_messages_per_session: usize,

    /// Sessions untouched for this long are evicted; 0 disables eviction
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,

    /// How often the eviction sweep runs
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_messages_per_session: default_max_messages_per_session(),
            idle_ttl_secs: default_idle_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl SessionConfig {
    /// Idle time-to-live, `None` when eviction is disabled
    pub fn idle_ttl(&self) -> Option<Duration> {
        (self.idle_ttl_secs > 0).then(|| Duration::from_secs(self.idle_ttl_secs))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Fallback remote and branch for tool inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryDefaults {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_branch")]
    pub branch: String,
}

impl Default for RepositoryDefaults {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            branch: default_branch(),
        }
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        let has_value = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

        if !has_value(&self.api.api_key) {
            return Err(Error::config(
                "API key required. Set api.api_key or GREPTILE_API_KEY env var",
            ));
        }
        if !has_value(&self.api.github_token) {
            return Err(Error::config(
                "GitHub token required. Set api.github_token or GITHUB_TOKEN env var",
            ));
        }
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err(Error::config(format!(
                "Invalid base_url '{}': must start with http:// or https://",
                self.api.base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::config("api.timeout_secs must be greater than 0"));
        }
        if self.session.max_messages_per_session == 0 {
            return Err(Error::config(
                "session.max_messages_per_session must be greater than 0",
            ));
        }
        if self.session.idle_ttl_secs > 0 && self.session.sweep_interval_secs == 0 {
            return Err(Error::config(
                "session.sweep_interval_secs must be greater than 0 when eviction is enabled",
            ));
        }
        self.defaults
            .remote
            .parse::<Remote>()
            .map_err(|e| Error::config(format!("Invalid defaults.remote: {e}")))?;
        if self.defaults.branch.trim().is_empty() {
            return Err(Error::config("defaults.branch cannot be empty"));
        }

        Ok(())
    }
}
