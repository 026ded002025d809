//! MCP Server for greptile-mcp
//!
//! Provides a Model Context Protocol server exposing repository indexing,
//! conversational querying, search and status lookup of the hosted
//! code-search API as tools.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod error;
mod output_formatter;
mod repository_resolution;
mod server;
mod tool;

pub use error::{McpError, Result};
pub use server::{run_mcp_server, GreptileMcpServer};
