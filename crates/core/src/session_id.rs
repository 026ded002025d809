//! Canonical session identifiers
//!
//! Session ids are UUID-shaped strings. Input is accepted in any letter case
//! with surrounding whitespace; the canonical form is trimmed and lowercase so
//! that two callers spelling the same id differently share one session.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use uuid::Uuid;

/// Textual pattern accepted for session ids
pub const SESSION_ID_PATTERN: &str =
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";

static SESSION_ID_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(SESSION_ID_PATTERN).ok());

/// A canonical (trimmed, lowercase) session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random identifier in canonical form
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Canonicalize a raw identifier without checking its shape
    ///
    /// `None` means "no session supplied yet" and is passed through.
    pub fn normalize(raw: Option<&str>) -> Option<Self> {
        raw.map(|value| Self(value.trim().to_lowercase()))
    }

    /// Check that a raw identifier has the UUID textual shape
    ///
    /// An absent identifier is valid because the field is optional.
    pub fn validate(candidate: Option<&str>) -> Result<()> {
        let Some(value) = candidate else {
            return Ok(());
        };

        if is_uuid_shaped(value.trim()) {
            Ok(())
        } else {
            Err(Error::validation(
                "session_id",
                format!("'{value}' does not match the expected pattern {SESSION_ID_PATTERN}"),
            ))
        }
    }

    /// Validate, then normalize, generating a new id when none was supplied
    pub fn resolve(raw: Option<&str>) -> Result<Self> {
        Self::validate(raw)?;
        Ok(Self::normalize(raw).unwrap_or_else(Self::generate))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_uuid_shaped(value: &str) -> bool {
    SESSION_ID_REGEX
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(value))
}
