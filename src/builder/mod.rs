//! Suite tree construction from a dry run of the target suite

pub mod dry_run;

use crate::error::SuitemapResult;
use crate::report::SuiteTree;
use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

pub use dry_run::{DryRunBuilder, SuiteRecord};

/// Produces a fresh suite tree for a checkout
#[async_trait]
pub trait SuiteBuilder: Send + Sync {
    async fn build(&self, repo: &Path, cancel: &CancellationToken) -> SuitemapResult<SuiteTree>;
}
