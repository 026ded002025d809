//! Conversation turns

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Parse a role name, ignoring case and surrounding whitespace
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(Error::validation(
                "role",
                format!("'{other}' is not one of: user, assistant"),
            )),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Build a message, rejecting empty content
    pub fn new(role: Role, content: impl Into<String>) -> Result<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(Error::validation(
                "content",
                format!("{role} message content cannot be empty"),
            ));
        }
        Ok(Self { role, content })
    }

    pub fn user(content: impl Into<String>) -> Result<Self> {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Result<Self> {
        Self::new(Role::Assistant, content)
    }
}

/// A caller-supplied history entry
///
/// Simple callers send bare strings, richer ones send role/content pairs.
/// Both shapes are accepted and converted in [`PriorMessage::into_message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(untagged)]
pub enum PriorMessage {
    PlainText(String),
    RoleMessage { role: String, content: String },
}

impl PriorMessage {
    /// Convert to a canonical [`Message`]; plain text is a user turn
    pub fn into_message(self) -> Result<Message> {
        match self {
            Self::PlainText(content) => Message::user(content),
            Self::RoleMessage { role, content } => Message::new(Role::parse(&role)?, content),
        }
    }
}

/// Convert a whole caller-supplied history, failing on the first bad entry
pub fn normalize_prior_messages(prior: Vec<PriorMessage>) -> Result<Vec<Message>> {
    prior
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            entry.into_message().map_err(|e| match e {
                Error::Validation { field, message } => Error::Validation {
                    field: format!("prior_messages[{index}].{field}"),
                    message,
                },
                other => other,
            })
        })
        .collect()
}
