//! Error types for suitemap
//!
//! All modules use `SuitemapResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for suitemap operations
pub type SuitemapResult<T> = Result<T, SuitemapError>;

/// All errors that can occur in suitemap
#[derive(Error, Debug)]
pub enum SuitemapError {
    // Cache errors
    /// Expected miss; callers branch on it via [`SuitemapError::is_cache_miss`]
    #[error("No cached report for this working copy")]
    CacheMiss,

    #[error("Corrupt cache file {path}: {source}")]
    CacheDecode {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Collaborator errors
    #[error("Failed to resolve remote branches on {remote}: {reason}")]
    RemoteResolve { remote: String, reason: String },

    #[error("Failed to inspect working copy {path}: {reason}")]
    WorkingCopy { path: PathBuf, reason: String },

    #[error("Dry run failed in {path}: {reason}")]
    DryRun { path: PathBuf, reason: String },

    #[error("Invalid dry-run report {path}: {reason}")]
    ReportParse { path: PathBuf, reason: String },

    #[error("Operation cancelled")]
    Cancelled,

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl SuitemapError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Whether this is the expected cache-miss signal rather than a failure
    pub fn is_cache_miss(&self) -> bool {
        matches!(self, Self::CacheMiss)
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CacheDecode { .. } => Some("Run: suitemap cache clear"),
            Self::RemoteResolve { .. } => Some("Check the remote with: git ls-remote --heads origin"),
            Self::DryRun { .. } => Some("Check [builder].command in: suitemap config show"),
            Self::ConfigInvalid { .. } => Some("Regenerate defaults with: suitemap config init --force"),
            _ => None,
        }
    }
}
