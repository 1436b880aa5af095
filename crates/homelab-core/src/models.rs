//! Core data models for discovered projects and modules.
//!
//! Records are rebuilt from the filesystem on every scan. Nothing here is
//! cached or persisted.

use crate::error::{Error, Result};
use crate::git_analyzer::parse_git_url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One discovered Git repository, as reported to the user.
///
/// The JSON shape is `{"name": ..., "gitRepoUrl": ...}`.
///
/// # Example
///
/// ```
/// # use homelab_core::RepoRecord;
/// let record = RepoRecord::new_validated("backend/api", "git@github.com:me/api.git").unwrap();
/// assert_eq!(record.service().as_deref(), Some("github"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct RepoRecord {
    /// Display name.
    ///
    /// The directory base name for projects, or the scan-root-relative path
    /// joined with `/` for modules. Never empty.
    pub name: String,

    /// URL of the `origin` remote, or an empty string when the repository
    /// has none (or it could not be read). Not format-checked.
    pub git_repo_url: String,
}

/// A repository sitting directly under the projects directory.
pub type Project = RepoRecord;

/// A repository found anywhere below a project's source directory.
pub type Module = RepoRecord;

impl RepoRecord {
    /// Builds a record and runs it through [`RepoRecord::validate`].
    pub fn new_validated(name: impl Into<String>, git_repo_url: impl Into<String>) -> Result<Self> {
        let record = Self {
            name: name.into(),
            git_repo_url: git_repo_url.into(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks the output schema: a non-empty name.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("name must not be empty"));
        }
        Ok(())
    }

    /// Whether an `origin` URL was found.
    pub fn has_remote(&self) -> bool {
        !self.git_repo_url.is_empty()
    }

    /// Hosting service of the origin URL, if recognisable.
    pub fn service(&self) -> Option<String> {
        parse_git_url(&self.git_repo_url).0
    }

    /// Owner or organisation segment of the origin URL, if extractable.
    pub fn account(&self) -> Option<String> {
        parse_git_url(&self.git_repo_url).1
    }
}

/// How the `origin` URL of a discovered repository is looked up.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RemoteResolver {
    /// Run `git remote get-url origin` in the repository.
    #[default]
    Git,

    /// Read the remote configuration in-process with gitoxide.
    Gix,
}

impl fmt::Display for RemoteResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteResolver::Git => f.write_str("git"),
            RemoteResolver::Gix => f.write_str("gix"),
        }
    }
}

impl FromStr for RemoteResolver {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "git" => Ok(RemoteResolver::Git),
            "gix" => Ok(RemoteResolver::Gix),
            other => Err(Error::config(format!(
                "unknown git resolver '{}' (expected 'git' or 'gix')",
                other
            ))),
        }
    }
}
