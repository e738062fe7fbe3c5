//! CLI command implementations

pub mod branches;
pub mod cache;
pub mod config;
pub mod show;

pub use branches::execute as branches;
pub use cache::execute as cache;
pub use config::execute as config;
pub use show::execute as show;

use crate::builder::DryRunBuilder;
use crate::config::{Config, ConfigManager};
use crate::error::{SuitemapError, SuitemapResult};
use crate::report::{Collaborators, ReportCache};
use crate::vcs::{GitRemoteResolver, GitWorkingCopy};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Git-backed collaborators for the repository at `repo`
fn collaborators(repo: &Path, config: &Config) -> Collaborators {
    Collaborators {
        resolver: Box::new(GitRemoteResolver::new(repo)),
        inspector: Box::new(GitWorkingCopy::new()),
        builder: Box::new(DryRunBuilder::new(
            config.builder.command.clone(),
            config.builder.report_file.clone(),
            config.builder.root.clone(),
        )),
    }
}

/// Load the report cache, validating entries against `repo`'s remote
async fn open_cache(
    repo: &Path,
    config: &Config,
    cancel: CancellationToken,
) -> SuitemapResult<ReportCache> {
    ReportCache::load(
        ConfigManager::cache_options(config),
        collaborators(repo, config),
        cancel,
    )
    .await
}

/// `path`, or the current directory, which must exist
fn resolve_repo(path: Option<PathBuf>) -> SuitemapResult<PathBuf> {
    let repo = match path {
        Some(p) => p,
        None => std::env::current_dir()
            .map_err(|e| SuitemapError::io("getting current directory", e))?,
    };

    if !repo.exists() {
        return Err(SuitemapError::PathNotFound(repo));
    }
    Ok(repo.canonicalize().unwrap_or(repo))
}
