//! Repository probing and `origin` lookup.
//!
//! Both operations here are infallible from the caller's point of view:
//! I/O problems turn into "not a repository" and lookup problems turn into
//! an empty URL.

use crate::error::{Error, Result};
use crate::models::RemoteResolver;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, trace};

/// Name of the remote whose URL is reported.
pub const ORIGIN: &str = "origin";

/// Reports whether `path` is the root of a Git repository.
///
/// Only a `.git` **directory** counts. A `.git` file (worktrees, submodules)
/// is not treated as a repository. Any I/O error yields `false`.
///
/// # Example
///
/// ```no_run
/// # async fn demo() {
/// use homelab_core::git_analyzer::is_repository;
/// use std::path::Path;
///
/// if is_repository(Path::new("/home/me/projects/site")).await {
///     println!("found a repository");
/// }
/// # }
/// ```
pub async fn is_repository(path: &Path) -> bool {
    match tokio::fs::metadata(path.join(".git")).await {
        Ok(meta) => meta.is_dir(),
        Err(e) => {
            trace!(path = %path.display(), error = %e, "no .git marker");
            false
        }
    }
}

/// Returns the URL of the `origin` remote of `repo_path`, trimmed.
///
/// Returns an empty string when the remote is missing, the directory is not
/// a usable repository, or the lookup itself fails.
pub async fn resolve_origin_url(repo_path: &Path, resolver: RemoteResolver) -> String {
    match resolver {
        RemoteResolver::Git => git_cli_origin_url(repo_path).await,
        RemoteResolver::Gix => gix_origin_url(repo_path).await,
    }
}

/// Runs `git remote get-url origin` with `repo_path` as working directory.
///
/// Discovery is capped at the repository's parent so a broken `.git` never
/// reports the remote of an enclosing checkout.
async fn git_cli_origin_url(repo_path: &Path) -> String {
    let mut command = Command::new("git");
    command
        .args(["remote", "get-url", ORIGIN])
        .current_dir(repo_path)
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(parent) = repo_path.parent() {
        command.env("GIT_CEILING_DIRECTORIES", parent);
    }

    let output = match command.output().await {
        Ok(output) => output,
        Err(e) => {
            debug!(repo = %repo_path.display(), error = %e, "failed to execute git");
            return String::new();
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(repo = %repo_path.display(), stderr = %stderr.trim(), "no origin remote");
        return String::new();
    }

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Reads the `origin` fetch URL with gitoxide on a blocking worker thread.
async fn gix_origin_url(repo_path: &Path) -> String {
    let path = repo_path.to_path_buf();
    match tokio::task::spawn_blocking(move || read_origin_with_gix(&path)).await {
        Ok(Ok(url)) => url,
        Ok(Err(e)) => {
            debug!(repo = %repo_path.display(), error = %e, "no origin remote");
            String::new()
        }
        Err(e) => {
            debug!(repo = %repo_path.display(), error = %e, "gix lookup task failed");
            String::new()
        }
    }
}

fn read_origin_with_gix(repo_path: &Path) -> Result<String> {
    let repo = gix::open(repo_path).map_err(|e| Error::other(e.to_string()))?;
    let remote = repo
        .find_remote(ORIGIN)
        .map_err(|e| Error::other(e.to_string()))?;
    let url = remote
        .url(gix::remote::Direction::Fetch)
        .ok_or_else(|| Error::other("origin has no fetch URL"))?;
    Ok(url.to_bstring().to_string().trim().to_string())
}

/// Parses a Git URL to extract the hosting service and account name.
///
/// Supports `https://host/account/repo`, scp-like `git@host:account/repo`
/// and `ssh://git@host[:port]/account/repo`. Both parts are `None` when
/// nothing can be extracted, which includes the empty URL of a repository
/// without `origin`.
///
/// # Examples
///
/// ```
/// # use homelab_core::git_analyzer::parse_git_url;
/// assert_eq!(
///     parse_git_url("https://github.com/user/repo.git"),
///     (Some("github".to_string()), Some("user".to_string()))
/// );
/// assert_eq!(parse_git_url(""), (None, None));
/// ```
pub fn parse_git_url(url: &str) -> (Option<String>, Option<String>) {
    let url = url.trim();
    if url.is_empty() {
        return (None, None);
    }
    (extract_service(&url.to_lowercase()), extract_account(url))
}

fn extract_service(url: &str) -> Option<String> {
    const SERVICES: [(&str, &str); 5] = [
        ("github.com", "github"),
        ("gitlab.com", "gitlab"),
        ("bitbucket.org", "bitbucket"),
        ("codeberg.org", "codeberg"),
        ("sr.ht", "sourcehut"),
    ];

    SERVICES
        .iter()
        .find(|(domain, _)| url.contains(domain))
        .map(|(_, name)| name.to_string())
}

fn extract_account(url: &str) -> Option<String> {
    let url = url.trim_end_matches('/').trim_end_matches(".git");

    if let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .or_else(|| url.strip_prefix("ssh://"))
    {
        // host[:port]/account/repo, possibly with user@ in front of host
        return rest
            .split('/')
            .nth(1)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    // scp-like: user@host:account/repo
    let (_, after_at) = url.split_once('@')?;
    let (_, path) = after_at.split_once(':')?;
    path.split('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
