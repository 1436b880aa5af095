//! # homelab-core
//!
//! Discovery of development projects and their Git modules on a homelab
//! workstation, plus the `homelab` command-line tool built on top of it.
//!
//! ## Concepts
//!
//! - A **project** is a Git repository directly under the projects directory.
//! - A **module** is a Git repository anywhere below a project's source
//!   directory. The walk stops at the first repository on each branch, so
//!   repositories nested inside repositories are not reported.
//! - Every discovered repository becomes a [`RepoRecord`] holding a display
//!   name and the URL of its `origin` remote (empty when there is none).
//!
//! ## Quick Start
//!
//! ```no_run
//! use homelab_core::{DefaultScanner, HomelabConfig};
//!
//! # async fn demo() -> homelab_core::Result<()> {
//! let config = HomelabConfig::load()?;
//! let scanner = DefaultScanner::new().with_resolver(config.resolver);
//!
//! let modules = scanner
//!     .scan_modules(&config.project_source_dir("homepage"))
//!     .await?;
//! for module in modules {
//!     println!("{} {}", module.name, module.git_repo_url);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`models`] - Record type and resolver selection
//! - [`scanner`] - Single-level and recursive repository discovery
//! - [`git_analyzer`] - `.git` probing and `origin` lookup
//! - [`config`] - Layered configuration (defaults, JSON store, environment)
//! - [`error`] - Custom error types
//! - [`l10n`] - Localization utilities
//! - [`logging`] - Tracing subscriber setup

pub mod config;
pub mod error;
pub mod git_analyzer;
pub mod l10n;
pub mod logging;
pub mod models;
pub mod scanner;

pub use config::HomelabConfig;
pub use error::{Error, Result};
pub use models::{Module, Project, RemoteResolver, RepoRecord};
pub use scanner::DefaultScanner;

pub use git_analyzer::{is_repository, parse_git_url, resolve_origin_url};

/// Library version, derived from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "homelab-core");
    }
}
