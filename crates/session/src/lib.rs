//! Conversation sessions for greptile-mcp
//!
//! [`SessionStore`] keeps per-session histories in memory and
//! [`QueryContextAssembler`] wraps each upstream query with the history of
//! its session.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod assembler;
mod store;

pub use assembler::{ContextQuery, QueryContextAssembler, QueryOutcome};
pub use store::{spawn_idle_sweeper, RetentionPolicy, SessionStore};
