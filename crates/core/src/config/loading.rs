//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, Environment, File};
use std::path::Path;
use tracing::debug;

use super::{global_config_path, Config};

/// Conventional variables honoured on top of the prefixed ones
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("GREPTILE_API_KEY", "api.api_key"),
    ("GITHUB_TOKEN", "api.github_token"),
    ("GREPTILE_BASE_URL", "api.base_url"),
];

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `GREPTILE_MCP` and use double
    /// underscores for nesting, e.g. `GREPTILE_MCP__API__TIMEOUT_SECS=30`.
    /// `GREPTILE_API_KEY`, `GITHUB_TOKEN` and `GREPTILE_BASE_URL` take
    /// precedence over both.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut builder = ConfigLib::builder();

        if path.exists() {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        } else {
            debug!(
                "No config file at {}, using defaults and environment",
                path.display()
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("GREPTILE_MCP")
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in ENV_OVERRIDES {
            if let Ok(value) = std::env::var(var) {
                if value.trim().is_empty() {
                    continue;
                }
                builder = builder
                    .set_override(*key, value)
                    .map_err(|e| Error::config(format!("Failed to set {var}: {e}")))?;
            }
        }

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.greptile-mcp/config.toml or custom --config path)
    /// 3. Environment variables (GREPTILE_MCP__*)
    /// 4. GREPTILE_API_KEY / GITHUB_TOKEN / GREPTILE_BASE_URL
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }
}
