//! Configuration schema for suitemap
//!
//! Configuration is stored at `~/.config/suitemap/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Report cache settings
    pub cache: CacheConfig,

    /// Remote used to validate cached reports
    pub remote: RemoteConfig,

    /// Dry-run settings
    pub builder: BuilderConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Report cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Disable to always rebuild reports
    pub enabled: bool,

    /// Cache directory (default: per-user cache dir)
    ///
    /// Owned by suitemap: saving removes every other regular file in it,
    /// so never point it at a directory shared with anything else.
    pub dir: Option<PathBuf>,

    /// Directory hashed into the source fingerprint instead of the
    /// sources embedded at build time
    pub source_dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            source_dir: None,
        }
    }
}

/// Remote configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Remote name or URL
    pub name: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            name: "origin".to_string(),
        }
    }
}

/// Dry-run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Dry-run command and arguments, run in the checkout
    pub command: Vec<String>,

    /// Report written by the command, relative to the checkout
    pub report_file: PathBuf,

    /// Path of the tree root
    pub root: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            command: [
                "ginkgo",
                "run",
                "--dry-run",
                "-r",
                "--json-report",
                "suitemap-report.json",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            report_file: PathBuf::from("suitemap-report.json"),
            root: "/".to_string(),
        }
    }
}
