//! Error types for homelab-core.
//!
//! The library exposes a single `thiserror` enum. The `homelab` binary wraps
//! it with `anyhow` context when reporting to the terminal.

use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for homelab-core operations.
///
/// # Example
///
/// ```
/// use homelab_core::Result;
///
/// fn list_nothing() -> Result<Vec<String>> {
///     Ok(Vec::new())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while discovering projects and modules.
///
/// Only the scan-root precondition failures and [`Error::ScanFailed`] abort a
/// scan. Per-repository problems are recovered inside the scanner and never
/// reach the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// The scan root does not exist or cannot be accessed.
    #[error("{} not found", .0.display())]
    PathNotFound(PathBuf),

    /// The scan root exists but is not a directory.
    #[error("path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// An unexpected failure escaped the scan of `root`.
    #[error("Failed to scan {}: {message}", .root.display())]
    ScanFailed {
        /// The scan root the failure belongs to.
        root: PathBuf,
        /// The message of the triggering failure.
        message: String,
    },

    /// An assembled record did not satisfy the output schema.
    #[error("Invalid record: {message}")]
    Validation {
        /// Which constraint was violated.
        message: String,
    },

    /// The configuration store or environment held an unusable value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Localization system error.
    #[error("Localization error: {0}")]
    L10n(String),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates a PathNotFound error.
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Error::PathNotFound(path.into())
    }

    /// Creates a NotADirectory error.
    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Error::NotADirectory(path.into())
    }

    /// Creates a ScanFailed error wrapping the triggering message.
    ///
    /// ```ignore
    /// return Err(Error::scan_failed(root, err.to_string()));
    /// ```
    pub fn scan_failed(root: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::ScanFailed {
            root: root.into(),
            message: message.into(),
        }
    }

    /// Creates a Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    /// Creates a Config error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Creates an L10n error.
    pub fn l10n(message: impl Into<String>) -> Self {
        Error::L10n(message.into())
    }

    /// Creates an Other error.
    pub fn other(message: impl Into<String>) -> Self {
        Error::Other(message.into())
    }
}
