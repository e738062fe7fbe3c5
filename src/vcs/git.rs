//! Git implementations of the version-control collaborators

use crate::error::{SuitemapError, SuitemapResult};
use crate::process;
use crate::vcs::{BranchRevisions, RemoteResolver, WorkingCopyInspector, WorkingCopyState};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const HEADS_PREFIX: &str = "refs/heads/";

/// Resolves remote branches with `git ls-remote`
pub struct GitRemoteResolver {
    repo: PathBuf,
}

impl GitRemoteResolver {
    /// Resolve remotes as configured in the repository at `repo`
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }
}

#[async_trait]
impl RemoteResolver for GitRemoteResolver {
    async fn resolve(
        &self,
        remote: &str,
        patterns: &[String],
        cancel: &CancellationToken,
    ) -> SuitemapResult<BranchRevisions> {
        let mut args = vec![
            "ls-remote".to_string(),
            "--heads".to_string(),
            remote.to_string(),
        ];
        // Anchor each pattern so "main" does not also match "feature/main"
        args.extend(patterns.iter().map(|p| format!("{}{}", HEADS_PREFIX, p)));

        let stdout = process::run_stdout("git", &args, &self.repo, cancel)
            .await
            .map_err(|e| match e {
                SuitemapError::Cancelled => e,
                other => SuitemapError::RemoteResolve {
                    remote: remote.to_string(),
                    reason: other.to_string(),
                },
            })?;

        let branches = parse_ls_remote(&stdout);
        debug!(
            "Resolved {} branch(es) on {} for {} pattern(s)",
            branches.len(),
            remote,
            patterns.len()
        );
        Ok(branches)
    }
}

/// Parse `<revision>\trefs/heads/<branch>` lines
fn parse_ls_remote(output: &str) -> BranchRevisions {
    output
        .lines()
        .filter_map(|line| {
            let (revision, reference) = line.split_once('\t')?;
            let branch = reference.trim().strip_prefix(HEADS_PREFIX)?;
            Some((branch.to_string(), revision.trim().to_string()))
        })
        .collect()
}

/// Inspects working copies with `git rev-parse` and `git status`
#[derive(Debug, Default, Clone, Copy)]
pub struct GitWorkingCopy;

impl GitWorkingCopy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WorkingCopyInspector for GitWorkingCopy {
    async fn inspect(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> SuitemapResult<WorkingCopyState> {
        let wrap = |e: SuitemapError| match e {
            SuitemapError::Cancelled => e,
            other => SuitemapError::WorkingCopy {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        };

        let branch = process::run_stdout("git", ["rev-parse", "--abbrev-ref", "HEAD"], path, cancel)
            .await
            .map_err(wrap)?;
        let revision = process::run_stdout("git", ["rev-parse", "HEAD"], path, cancel)
            .await
            .map_err(wrap)?;
        let status = process::run_stdout("git", ["status", "--porcelain"], path, cancel)
            .await
            .map_err(wrap)?;

        Ok(WorkingCopyState {
            branch,
            revision,
            dirty: !status.is_empty(),
        })
    }
}

/// Detached checkout of one revision in a temporary directory
pub struct Worktree {
    repo: PathBuf,
    path: PathBuf,
    // Removed on drop, after git has unregistered the worktree
    _dir: TempDir,
}

impl Worktree {
    /// Fetch `branch` from `remote` and check out `revision` next to `repo`
    pub async fn add(
        repo: &Path,
        remote: &str,
        branch: &str,
        revision: &str,
        cancel: &CancellationToken,
    ) -> SuitemapResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("suitemap-worktree-")
            .tempdir()
            .map_err(|e| SuitemapError::io("creating worktree directory", e))?;
        let path = dir.path().join("checkout");

        info!("Checking out {}@{}", branch, revision);
        let refspec = format!("{}{}", HEADS_PREFIX, branch);
        process::run("git", ["fetch", "--quiet", remote, refspec.as_str()], repo, cancel).await?;

        let path_arg = path.to_string_lossy().into_owned();
        process::run(
            "git",
            ["worktree", "add", "--detach", path_arg.as_str(), revision],
            repo,
            cancel,
        )
        .await?;

        Ok(Self {
            repo: repo.to_path_buf(),
            path,
            _dir: dir,
        })
    }

    /// Checkout directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unregister the worktree and delete its files
    pub async fn remove(self, cancel: &CancellationToken) -> SuitemapResult<()> {
        let path_arg = self.path.to_string_lossy().into_owned();
        process::run(
            "git",
            ["worktree", "remove", "--force", path_arg.as_str()],
            &self.repo,
            cancel,
        )
        .await?;
        debug!("Removed worktree {}", self.path.display());
        Ok(())
    }
}
