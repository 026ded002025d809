//! Core types and traits for greptile-mcp
//!
//! This crate provides the foundational pieces shared by the other crates:
//!
//! - **Session identity**: canonical session ids ([`SessionId`])
//! - **Conversation turns**: [`Message`], [`Role`], caller-supplied [`PriorMessage`]s
//! - **Repository references**: [`RepositoryRef`] and [`Remote`]
//! - **Upstream API seam**: the [`CodeSearchApi`] trait and its wire models
//! - **Configuration**: layered file + environment configuration
//! - **Error handling**: unified error types

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod message;
pub mod repository;
pub mod search_api;
pub mod search_models;
pub mod session_id;

// Re-export main types for convenience
pub use config::Config;
pub use error::{Error, Result, UpstreamError};
pub use message::{normalize_prior_messages, Message, PriorMessage, Role};
pub use repository::{validate_repositories, Remote, RepositoryRef};
pub use search_api::CodeSearchApi;
pub use session_id::SessionId;

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
