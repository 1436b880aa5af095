//! Project and module discovery.
//!
//! Projects are the Git repositories sitting directly under the projects
//! directory. Modules are the Git repositories found at any depth below a
//! project's source directory, stopping at the first repository boundary on
//! every branch.
//!
//! All sibling probes run concurrently on the current task via
//! [`futures::future::join_all`]. Result order is therefore unspecified;
//! callers sort when they need a stable listing.

use crate::error::{Error, Result};
use crate::git_analyzer::{is_repository, resolve_origin_url};
use crate::models::{Module, Project, RemoteResolver, RepoRecord};
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Scanner producing [`Project`] and [`Module`] records.
///
/// Stateless: every call walks the filesystem again.
///
/// # Example
///
/// ```no_run
/// use homelab_core::{DefaultScanner, RemoteResolver};
/// use std::path::Path;
///
/// # async fn demo() -> homelab_core::Result<()> {
/// let scanner = DefaultScanner::new().with_resolver(RemoteResolver::Gix);
/// let mut projects = scanner.scan_projects(Path::new("/home/me/projects")).await?;
/// projects.sort_by(|a, b| a.name.cmp(&b.name));
/// for project in projects {
///     println!("{} {}", project.name, project.git_repo_url);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefaultScanner {
    resolver: RemoteResolver,
}

impl DefaultScanner {
    /// Creates a scanner that resolves remotes with the `git` binary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects how `origin` URLs are looked up.
    pub fn with_resolver(mut self, resolver: RemoteResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// The configured remote resolver.
    pub fn resolver(&self) -> RemoteResolver {
        self.resolver
    }

    /// Lists the repositories directly under `root`.
    ///
    /// Hidden entries and non-directories are ignored, directories without
    /// a `.git` directory are dropped, and every survivor becomes a record
    /// named after its base name.
    ///
    /// # Errors
    ///
    /// - [`Error::PathNotFound`] / [`Error::NotADirectory`] when `root` is
    ///   unusable.
    /// - [`Error::ScanFailed`] when `root` passed the check but could not be
    ///   listed.
    pub async fn scan_projects(&self, root: &Path) -> Result<Vec<Project>> {
        check_scan_root(root).await?;

        let candidates = list_visible_subdirectories(root)
            .await
            .map_err(|e| Error::scan_failed(root, e.to_string()))?;
        debug!(root = %root.display(), candidates = candidates.len(), "probing project candidates");

        let records = join_all(candidates.iter().map(|dir| self.project_record(dir))).await;
        let projects: Vec<Project> = records.into_iter().flatten().collect();

        info!(root = %root.display(), count = projects.len(), "project scan complete");
        Ok(projects)
    }

    /// Lists every repository below `root`, named relative to it.
    ///
    /// The walk does not descend into a repository once one is found, so a
    /// repository nested inside another is never reported. A `root` that is
    /// itself a repository yields an empty relative name, which fails
    /// validation and is dropped.
    ///
    /// # Errors
    ///
    /// Only the scan-root precondition fails the call. Unreadable
    /// subdirectories contribute nothing.
    pub async fn scan_modules(&self, root: &Path) -> Result<Vec<Module>> {
        check_scan_root(root).await?;

        let repositories = discover_repositories(root.to_path_buf()).await;
        debug!(root = %root.display(), found = repositories.len(), "resolving module remotes");

        let records = join_all(repositories.iter().map(|repo| async move {
            let name = relative_module_name(root, repo).unwrap_or_default();
            self.assemble(name, repo).await
        }))
        .await;
        let modules: Vec<Module> = records.into_iter().flatten().collect();

        info!(root = %root.display(), count = modules.len(), "module scan complete");
        Ok(modules)
    }

    async fn project_record(&self, dir: &Path) -> Option<Project> {
        if !is_repository(dir).await {
            return None;
        }
        let name = dir.file_name()?.to_string_lossy().into_owned();
        self.assemble(name, dir).await
    }

    /// Resolves the remote and validates; `None` drops the entry.
    async fn assemble(&self, name: String, repo: &Path) -> Option<RepoRecord> {
        let git_repo_url = resolve_origin_url(repo, self.resolver).await;
        match RepoRecord::new_validated(name, git_repo_url) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(repo = %repo.display(), error = %e, "skipping repository");
                None
            }
        }
    }
}

/// Fails unless `root` exists and is a directory.
pub async fn check_scan_root(root: &Path) -> Result<()> {
    let meta = tokio::fs::metadata(root).await.map_err(|e| {
        debug!(root = %root.display(), error = %e, "scan root inaccessible");
        Error::path_not_found(root)
    })?;
    if !meta.is_dir() {
        return Err(Error::not_a_directory(root));
    }
    Ok(())
}

/// Recursively collects repository roots at or below `dir`.
///
/// If `dir` is a repository it is the only result. Otherwise every visible
/// subdirectory is walked concurrently and the results are concatenated.
/// A directory that cannot be listed is logged and yields nothing. There is
/// no depth limit.
pub fn discover_repositories(dir: PathBuf) -> BoxFuture<'static, Vec<PathBuf>> {
    async move {
        if is_repository(&dir).await {
            return vec![dir];
        }

        let children = match list_visible_subdirectories(&dir).await {
            Ok(children) => children,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                return Vec::new();
            }
        };

        join_all(children.into_iter().map(discover_repositories))
            .await
            .into_iter()
            .flatten()
            .collect()
    }
    .boxed()
}

/// Path of `repo` relative to `root`, joined with `/` on every platform.
///
/// Returns `None` when `repo` is not below `root` or is `root` itself.
///
/// ```
/// # use homelab_core::scanner::relative_module_name;
/// # use std::path::Path;
/// let name = relative_module_name(Path::new("/src"), Path::new("/src/backend/api"));
/// assert_eq!(name.as_deref(), Some("backend/api"));
/// ```
pub fn relative_module_name(root: &Path, repo: &Path) -> Option<String> {
    let relative = repo.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Immediate subdirectories of `dir` whose names do not start with `.`.
///
/// Entries are classified without following symlinks. Entries whose type
/// cannot be read are skipped.
async fn list_visible_subdirectories(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut subdirs = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        match entry.file_type().await {
            Ok(file_type) if file_type.is_dir() => subdirs.push(entry.path()),
            Ok(_) => {}
            Err(e) => {
                debug!(path = %entry.path().display(), error = %e, "skipping entry");
            }
        }
    }

    Ok(subdirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    /// Creates `path` (and parents) with an empty `.git` directory inside.
    fn create_mock_repo(path: &Path) {
        fs::create_dir_all(path.join(".git")).unwrap();
    }

    fn names(records: &[RepoRecord]) -> Vec<String> {
        let mut names: Vec<String> = records.iter().map(|r| r.name.clone()).collect();
        names.sort();
        names
    }

    fn relative(root: &Path, paths: &[PathBuf]) -> HashSet<String> {
        paths
            .iter()
            .map(|p| relative_module_name(root, p).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_missing_root_is_not_found() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let scanner = DefaultScanner::new();

        let err = scanner.scan_projects(&missing).await.unwrap_err();
        assert!(matches!(err, Error::PathNotFound(_)));
        assert!(err.to_string().contains("nope"));

        let err = scanner.scan_modules(&missing).await.unwrap_err();
        assert!(matches!(err, Error::PathNotFound(_)));
    }

    #[tokio::test]
    async fn test_file_root_is_not_a_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("notes.txt");
        fs::write(&file, "hello").unwrap();
        let scanner = DefaultScanner::new();

        let err = scanner.scan_projects(&file).await.unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)));

        let err = scanner.scan_modules(&file).await.unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)));
    }

    #[tokio::test]
    async fn test_empty_root_yields_empty_list() {
        let temp = TempDir::new().unwrap();
        let scanner = DefaultScanner::new();

        assert!(scanner.scan_projects(temp.path()).await.unwrap().is_empty());
        assert!(scanner.scan_modules(temp.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_projects_are_top_level_repositories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        create_mock_repo(&root.join("homepage"));
        create_mock_repo(&root.join("ansible"));
        fs::create_dir(root.join("notes")).unwrap();
        fs::write(root.join("README.md"), "# projects").unwrap();
        // Only direct children count.
        create_mock_repo(&root.join("archive").join("old-site"));

        let projects = DefaultScanner::new().scan_projects(root).await.unwrap();
        assert_eq!(names(&projects), vec!["ansible", "homepage"]);
        assert!(projects.iter().all(|p| p.git_repo_url.is_empty()));
    }

    #[tokio::test]
    async fn test_hidden_directories_are_never_reported() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        create_mock_repo(&root.join(".dotfiles"));
        create_mock_repo(&root.join("visible"));
        create_mock_repo(&root.join("nested").join(".cache").join("repo"));

        let scanner = DefaultScanner::new();
        let projects = scanner.scan_projects(root).await.unwrap();
        assert_eq!(names(&projects), vec!["visible"]);

        let modules = scanner.scan_modules(root).await.unwrap();
        assert_eq!(names(&modules), vec!["visible"]);
    }

    #[tokio::test]
    async fn test_git_file_is_not_a_project() {
        let temp = TempDir::new().unwrap();
        let worktree = temp.path().join("worktree");
        fs::create_dir(&worktree).unwrap();
        fs::write(worktree.join(".git"), "gitdir: /elsewhere").unwrap();

        let projects = DefaultScanner::new().scan_projects(temp.path()).await.unwrap();
        assert!(projects.is_empty());
    }

    #[tokio::test]
    async fn test_multi_depth_discovery() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        create_mock_repo(&root.join("top"));
        create_mock_repo(&root.join("x").join("y"));
        create_mock_repo(&root.join("p").join("q").join("r"));
        fs::create_dir_all(root.join("empty").join("deeper")).unwrap();

        let found = discover_repositories(root.to_path_buf()).await;
        assert_eq!(found.len(), 3);
        let expected: HashSet<String> = ["top", "x/y", "p/q/r"].iter().map(|s| s.to_string()).collect();
        assert_eq!(relative(root, &found), expected);

        let modules = DefaultScanner::new().scan_modules(root).await.unwrap();
        assert_eq!(names(&modules), vec!["p/q/r", "top", "x/y"]);
    }

    #[tokio::test]
    async fn test_nested_repositories_are_suppressed() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        create_mock_repo(&root.join("A"));
        create_mock_repo(&root.join("A").join("B"));

        let found = discover_repositories(root.to_path_buf()).await;
        assert_eq!(found, vec![root.join("A")]);
    }

    #[tokio::test]
    async fn test_branch_without_repositories_yields_nothing() {
        let temp = TempDir::new().unwrap();
        let branch = temp.path().join("docs");
        fs::create_dir_all(branch.join("guides").join("drafts")).unwrap();
        fs::write(branch.join("guides").join("index.md"), "").unwrap();

        assert!(discover_repositories(branch).await.is_empty());
    }

    #[tokio::test]
    async fn test_repository_root_stops_the_walk() {
        let temp = TempDir::new().unwrap();
        create_mock_repo(temp.path());
        create_mock_repo(&temp.path().join("vendor").join("lib"));

        let found = discover_repositories(temp.path().to_path_buf()).await;
        assert_eq!(found, vec![temp.path().to_path_buf()]);

        // The root itself has no relative name and is dropped from modules.
        let modules = DefaultScanner::new().scan_modules(temp.path()).await.unwrap();
        assert!(modules.is_empty());
    }

    #[tokio::test]
    async fn test_scans_are_idempotent() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        create_mock_repo(&root.join("one"));
        create_mock_repo(&root.join("two").join("inner"));
        let scanner = DefaultScanner::new();

        let first = scanner.scan_modules(root).await.unwrap();
        let second = scanner.scan_modules(root).await.unwrap();
        assert_eq!(
            first.into_iter().collect::<HashSet<_>>(),
            second.into_iter().collect::<HashSet<_>>()
        );

        let first = scanner.scan_projects(root).await.unwrap();
        let second = scanner.scan_projects(root).await.unwrap();
        assert_eq!(names(&first), names(&second));
    }

    #[tokio::test]
    async fn test_gix_resolver_scans_the_same_set() {
        let temp = TempDir::new().unwrap();
        create_mock_repo(&temp.path().join("site"));
        create_mock_repo(&temp.path().join("lab").join("dns"));

        let scanner = DefaultScanner::new().with_resolver(RemoteResolver::Gix);
        assert_eq!(scanner.resolver(), RemoteResolver::Gix);

        let modules = scanner.scan_modules(temp.path()).await.unwrap();
        assert_eq!(names(&modules), vec!["lab/dns", "site"]);
        assert!(modules.iter().all(|m| m.git_repo_url.is_empty()));
    }

    #[tokio::test]
    async fn test_records_carry_origin_url() {
        let git = |dir: &Path, args: &[&str]| {
            std::process::Command::new("git")
                .args(args)
                .current_dir(dir)
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false)
        };
        let temp = TempDir::new().unwrap();
        let with_remote = temp.path().join("site");
        let without_remote = temp.path().join("scratch");
        fs::create_dir_all(&with_remote).unwrap();
        fs::create_dir_all(&without_remote).unwrap();
        if !git(&with_remote, &["init", "-q"]) {
            // git is not installed
            return;
        }
        assert!(git(&with_remote, &["remote", "add", "origin", "git@github.com:lab/site.git"]));
        assert!(git(&without_remote, &["init", "-q"]));

        let mut projects = DefaultScanner::new().scan_projects(temp.path()).await.unwrap();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(
            projects,
            vec![
                RepoRecord::new_validated("scratch", "").unwrap(),
                RepoRecord::new_validated("site", "git@github.com:lab/site.git").unwrap(),
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_branch_does_not_abort_siblings() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let root = temp.path();
        create_mock_repo(&root.join("ok").join("svc"));
        let locked = root.join("locked");
        create_mock_repo(&locked.join("hidden-svc"));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Privileged users can still read the directory.
        let readable = fs::read_dir(&locked).is_ok();

        let modules = DefaultScanner::new().scan_modules(root).await.unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let found = names(&modules);
        assert!(found.contains(&"ok/svc".to_string()));
        assert_eq!(found.contains(&"locked/hidden-svc".to_string()), readable);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unlistable_root_fails_the_project_scan() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let root = temp.path().join("projects");
        create_mock_repo(&root.join("site"));
        fs::set_permissions(&root, fs::Permissions::from_mode(0o000)).unwrap();
        // Privileged users can still read the directory.
        let readable = fs::read_dir(&root).is_ok();

        let result = DefaultScanner::new().scan_projects(&root).await;
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();

        if readable {
            assert_eq!(names(&result.unwrap()), vec!["site"]);
        } else {
            match result.unwrap_err() {
                Error::ScanFailed { root: failed, message } => {
                    assert_eq!(failed, root);
                    assert!(!message.is_empty());
                }
                other => panic!("unexpected error: {}", other),
            }
        }
    }

    #[test]
    fn test_relative_module_name() {
        let root = Path::new("/work/src");
        assert_eq!(
            relative_module_name(root, Path::new("/work/src/backend/api/services")).as_deref(),
            Some("backend/api/services")
        );
        assert_eq!(relative_module_name(root, root), None);
        assert_eq!(relative_module_name(root, Path::new("/elsewhere")), None);
    }
}
