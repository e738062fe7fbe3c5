//! Configuration management for suitemap

pub mod schema;

pub use schema::Config;

use crate::error::{SuitemapError, SuitemapResult};
use crate::report::{CacheOptions, Fingerprint};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("suitemap")
            .join("config.toml")
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> SuitemapResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> SuitemapResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| SuitemapError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| SuitemapError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> SuitemapResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            SuitemapError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> SuitemapResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SuitemapError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Cache directory for `config`
    pub fn cache_dir(config: &Config) -> PathBuf {
        config
            .cache
            .dir
            .clone()
            .unwrap_or_else(CacheOptions::default_dir)
    }

    /// Cache options for `config`, computing the source fingerprint
    ///
    /// A disabled cache gets the empty fingerprint.
    pub fn cache_options(config: &Config) -> CacheOptions {
        let fingerprint = if !config.cache.enabled {
            info!("Report cache disabled by configuration");
            Fingerprint::empty()
        } else if let Some(ref dir) = config.cache.source_dir {
            Fingerprint::from_dir(dir)
        } else {
            Fingerprint::current()
        };

        CacheOptions {
            dir: Self::cache_dir(config),
            remote: config.remote.name.clone(),
            fingerprint,
        }
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.remote.name, "origin");
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.remote.name = "upstream".to_string();

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.remote.name, "upstream");
    }

    #[tokio::test]
    async fn invalid_config_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[cache]\nenabled = \"sometimes\"\n").unwrap();

        let err = ConfigManager::with_path(path.clone()).load().await.unwrap_err();

        match err {
            SuitemapError::ConfigInvalid { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn disabled_cache_has_empty_fingerprint() {
        let mut config = Config::default();
        config.cache.enabled = false;

        assert!(ConfigManager::cache_options(&config).fingerprint.is_empty());
    }

    #[test]
    fn cache_options_follow_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.rs"), "a").unwrap();

        let mut config = Config::default();
        config.cache.dir = Some(temp.path().join("cache"));
        config.cache.source_dir = Some(temp.path().to_path_buf());
        config.remote.name = "upstream".to_string();

        let options = ConfigManager::cache_options(&config);

        assert_eq!(options.dir, temp.path().join("cache"));
        assert_eq!(options.remote, "upstream");
        assert_eq!(options.fingerprint, Fingerprint::from_sources(["a"]));
    }
}
