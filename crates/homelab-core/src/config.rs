//! Configuration for the `homelab` tool.
//!
//! Values are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. the JSON config store (`<config dir>/homelab/config.json`)
//! 3. `HOMELAB_*` environment variables
//! 4. command-line flags (applied by the binary)

use crate::error::{Error, Result};
use crate::models::RemoteResolver;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding [`HomelabConfig::projects_dir`].
pub const ENV_PROJECTS_DIR: &str = "HOMELAB_PROJECTS_DIR";
/// Environment variable overriding [`HomelabConfig::source_dir`].
pub const ENV_SOURCE_DIR: &str = "HOMELAB_SOURCE_DIR";
/// Environment variable overriding [`HomelabConfig::locale`].
pub const ENV_LOCALE: &str = "HOMELAB_LOCALE";
/// Environment variable overriding [`HomelabConfig::resolver`].
pub const ENV_RESOLVER: &str = "HOMELAB_GIT_RESOLVER";

/// Default name of a project's source directory.
pub const DEFAULT_SOURCE_DIR: &str = "src";

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomelabConfig {
    /// Directory whose immediate children are the projects.
    pub projects_dir: PathBuf,

    /// Subdirectory of a project that is scanned for modules.
    ///
    /// Empty means the project directory itself.
    pub source_dir: String,

    /// Locale for user-facing messages; detected from the system when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// How `origin` URLs are looked up.
    pub resolver: RemoteResolver,
}

/// Partial config as stored on disk. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StoredConfig {
    projects_dir: Option<PathBuf>,
    source_dir: Option<String>,
    locale: Option<String>,
    resolver: Option<RemoteResolver>,
}

impl Default for HomelabConfig {
    /// `~/projects`, source directory `src`, the `git` resolver.
    fn default() -> Self {
        Self {
            projects_dir: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("projects"),
            source_dir: DEFAULT_SOURCE_DIR.to_string(),
            locale: None,
            resolver: RemoteResolver::default(),
        }
    }
}

impl HomelabConfig {
    /// Loads defaults, the default config store, then the environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = default_store_path() {
            config.merge_store(&path)?;
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlays the JSON store at `path` onto `self`.
    ///
    /// A missing file leaves `self` untouched; an unreadable or malformed
    /// file is an error.
    pub fn merge_store(&mut self, path: &Path) -> Result<()> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config store");
                return Ok(());
            }
            Err(e) => {
                return Err(Error::config(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let stored: StoredConfig = serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("invalid {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded config store");

        if let Some(dir) = stored.projects_dir {
            self.set_projects_dir(&dir);
        }
        if let Some(source_dir) = stored.source_dir {
            self.source_dir = source_dir;
        }
        if stored.locale.is_some() {
            self.locale = stored.locale;
        }
        if let Some(resolver) = stored.resolver {
            self.resolver = resolver;
        }
        Ok(())
    }

    /// Overlays `HOMELAB_*` variables read through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(ENV_PROJECTS_DIR) {
            self.set_projects_dir(Path::new(&dir));
        }
        if let Some(source_dir) = lookup(ENV_SOURCE_DIR) {
            // An explicitly empty source dir is meaningful here.
            self.source_dir = source_dir.trim().to_string();
        }
        if let Some(locale) = get(ENV_LOCALE) {
            self.locale = Some(locale);
        }
        if let Some(resolver) = get(ENV_RESOLVER) {
            self.resolver = resolver.parse()?;
        }
        Ok(())
    }

    /// Sets the projects directory, expanding a leading `~`.
    pub fn set_projects_dir(&mut self, dir: &Path) {
        self.projects_dir = expand_home(dir);
    }

    /// Directory of the named project.
    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.projects_dir.join(project)
    }

    /// Module scan root of the named project.
    pub fn project_source_dir(&self, project: &str) -> PathBuf {
        let dir = self.project_dir(project);
        if self.source_dir.is_empty() {
            dir
        } else {
            dir.join(&self.source_dir)
        }
    }
}

/// `<config dir>/homelab/config.json`, when the platform has a config dir.
pub fn default_store_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("homelab").join("config.json"))
}

/// Expands a leading `~` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
