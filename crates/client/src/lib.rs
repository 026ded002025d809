//! Upstream client for the hosted code-search API
//!
//! Implements [`greptile_mcp_core::CodeSearchApi`] over HTTP with reqwest.
//! Failures are classified into [`greptile_mcp_core::UpstreamError`] kinds so
//! callers can tell an unreachable service from a rejected request.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod error;
mod greptile;

use greptile_mcp_core::config::ApiConfig;
use greptile_mcp_core::{CodeSearchApi, Result};
use std::sync::Arc;

pub use greptile::{ClientSettings, GreptileClient};

/// Create the upstream API client from configuration
pub fn create_search_api(config: &ApiConfig) -> Result<Arc<dyn CodeSearchApi>> {
    let settings = ClientSettings::from_config(config)?;
    Ok(Arc::new(GreptileClient::new(settings)?))
}
