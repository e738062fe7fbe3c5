//! Version-control collaborators
//!
//! The report cache asks two questions of version control: which revision
//! each remote branch currently points at, and what state a local working
//! copy is in. Both are traits so tests can substitute fakes.

pub mod git;

use crate::error::SuitemapResult;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use tokio_util::sync::CancellationToken;

pub use git::{GitRemoteResolver, GitWorkingCopy, Worktree};

/// Branch name to current revision
pub type BranchRevisions = BTreeMap<String, String>;

/// Resolves remote branches to their current revisions
#[async_trait]
pub trait RemoteResolver: Send + Sync {
    /// Look up every branch on `remote` matching one of `patterns`
    ///
    /// Patterns may be exact branch names or globs. Branches that do not
    /// exist are absent from the result rather than an error.
    async fn resolve(
        &self,
        remote: &str,
        patterns: &[String],
        cancel: &CancellationToken,
    ) -> SuitemapResult<BranchRevisions>;
}

/// State of a local working copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopyState {
    /// Checked-out branch name
    pub branch: String,
    /// Revision of `HEAD`
    pub revision: String,
    /// Whether there are uncommitted local changes
    pub dirty: bool,
}

/// Inspects local working copies
#[async_trait]
pub trait WorkingCopyInspector: Send + Sync {
    async fn inspect(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> SuitemapResult<WorkingCopyState>;
}
