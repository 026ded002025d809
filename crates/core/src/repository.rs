//! Repository references passed through to the upstream service

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hosting provider of a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Remote {
    Github,
    Gitlab,
}

impl Remote {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
        }
    }
}

impl fmt::Display for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Remote {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "github" => Ok(Self::Github),
            "gitlab" => Ok(Self::Gitlab),
            other => Err(Error::validation(
                "remote",
                format!("'{other}' is not one of: github, gitlab"),
            )),
        }
    }
}

/// A repository at a branch on a remote
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub remote: Remote,
    /// `owner/name`
    pub repository: String,
    pub branch: String,
}

impl RepositoryRef {
    pub fn new(remote: Remote, repository: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            remote,
            repository: repository.into(),
            branch: branch.into(),
        }
    }

    /// Build from loosely-typed tool input, checking every field
    pub fn parse(remote: &str, repository: &str, branch: &str) -> Result<Self> {
        let reference = Self::new(remote.parse()?, repository.trim(), branch.trim());
        reference.validate()?;
        Ok(reference)
    }

    /// Check the reference shape without touching the network
    pub fn validate(&self) -> Result<()> {
        self.owner_and_name()?;
        if self.branch.trim().is_empty() {
            return Err(Error::validation("branch", "branch cannot be empty"));
        }
        Ok(())
    }

    /// Split `repository` into exactly `(owner, name)`
    pub fn owner_and_name(&self) -> Result<(&str, &str)> {
        let mut parts = self.repository.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok((owner, name))
            }
            _ => Err(Error::validation(
                "repository",
                format!("expected 'owner/name', got '{}'", self.repository),
            )),
        }
    }

    /// Identifier the upstream service uses for an indexed repository
    pub fn upstream_id(&self) -> String {
        format!("{}:{}:{}", self.remote, self.branch, self.repository)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.remote, self.repository, self.branch)
    }
}

/// Validate a batch of references, failing fast on the first bad one
pub fn validate_repositories(repositories: &[RepositoryRef]) -> Result<()> {
    if repositories.is_empty() {
        return Err(Error::validation(
            "repositories",
            "at least one repository is required",
        ));
    }
    repositories.iter().try_for_each(RepositoryRef::validate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_valid_reference() {
        let r = RepositoryRef::parse("GitHub", "tokio-rs/tokio", "master").unwrap();
        assert_eq!(r.remote, Remote::Github);
        assert_eq!(r.owner_and_name().unwrap(), ("tokio-rs", "tokio"));
        assert_eq!(r.upstream_id(), "github:master:tokio-rs/tokio");
    }

    #[test]
    fn test_unknown_remote_rejected() {
        let err = RepositoryRef::parse("bitbucket", "a/b", "main").unwrap_err();
        assert!(err.to_string().contains("Invalid remote"));
    }

    #[test]
    fn test_repository_must_have_owner_and_name() {
        for bad in ["tokio", "a/b/c", "/tokio", "tokio/", ""] {
            let err = RepositoryRef::parse("github", bad, "main").unwrap_err();
            assert!(
                err.to_string().starts_with("Invalid repository"),
                "{bad}: {err}"
            );
        }
    }

    #[test]
    fn test_empty_branch_rejected() {
        let err = RepositoryRef::parse("gitlab", "group/project", " ").unwrap_err();
        assert!(err.to_string().contains("Invalid branch"));
    }

    #[test]
    fn test_validate_repositories_requires_one() {
        assert!(validate_repositories(&[]).is_err());
        let ok = RepositoryRef::new(Remote::Gitlab, "group/project", "main");
        assert!(validate_repositories(&[ok]).is_ok());
    }

    #[test]
    fn test_remote_serializes_lowercase() {
        let r = RepositoryRef::new(Remote::Github, "a/b", "main");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["remote"], "github");
    }
}
