//! Resolution of tool repository arguments
//!
//! Fills in the configured remote and branch where a caller omitted them,
//! then checks the result.

use crate::tool::RepositoryInput;
use greptile_mcp_core::config::RepositoryDefaults;
use greptile_mcp_core::{validate_repositories, RepositoryRef, Result};

/// Resolve one repository argument against the configured defaults
pub fn resolve_repository(
    input: &RepositoryInput,
    defaults: &RepositoryDefaults,
) -> Result<RepositoryRef> {
    let remote = input.remote.as_deref().unwrap_or(&defaults.remote);
    let branch = input.branch.as_deref().unwrap_or(&defaults.branch);
    RepositoryRef::parse(remote, &input.repository, branch)
}

/// Resolve a non-empty list of repository arguments, failing on the first bad one
pub fn resolve_repositories(
    inputs: &[RepositoryInput],
    defaults: &RepositoryDefaults,
) -> Result<Vec<RepositoryRef>> {
    let resolved = inputs
        .iter()
        .map(|input| resolve_repository(input, defaults))
        .collect::<Result<Vec<_>>>()?;
    validate_repositories(&resolved)?;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use greptile_mcp_core::Remote;
    use pretty_assertions::assert_eq;

    fn input(remote: Option<&str>, repository: &str, branch: Option<&str>) -> RepositoryInput {
        RepositoryInput {
            remote: remote.map(str::to_string),
            repository: repository.to_string(),
            branch: branch.map(str::to_string),
        }
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let defaults = RepositoryDefaults::default();
        let resolved = resolve_repository(&input(None, "acme/api", None), &defaults).unwrap();
        assert_eq!(resolved, RepositoryRef::new(Remote::Github, "acme/api", "main"));
    }

    #[test]
    fn test_explicit_fields_win() {
        let defaults = RepositoryDefaults::default();
        let resolved =
            resolve_repository(&input(Some("GitLab"), "acme/api", Some("dev")), &defaults).unwrap();
        assert_eq!(resolved, RepositoryRef::new(Remote::Gitlab, "acme/api", "dev"));
    }

    #[test]
    fn test_bad_inputs_name_their_field() {
        let defaults = RepositoryDefaults::default();

        let err = resolve_repository(&input(Some("bitbucket"), "acme/api", None), &defaults)
            .unwrap_err();
        assert!(err.to_string().contains("remote"));

        let err = resolve_repository(&input(None, "acme", None), &defaults).unwrap_err();
        assert!(err.to_string().contains("repository"));

        let err = resolve_repository(&input(None, "acme/api", Some(" ")), &defaults).unwrap_err();
        assert!(err.to_string().contains("branch"));
    }

    #[test]
    fn test_empty_list_rejected() {
        let err = resolve_repositories(&[], &RepositoryDefaults::default()).unwrap_err();
        assert!(err.is_validation());
    }
}
