//! Suite builder backed by an external dry-run command
//!
//! The command runs in the checkout and writes a JSON report: an array of
//! suite records, each with the test cases it contains. Test bodies are
//! never executed.

use crate::builder::SuiteBuilder;
use crate::error::{SuitemapError, SuitemapResult};
use crate::process;
use crate::report::tree::{join_path, relative_path};
use crate::report::{SpecReport, SuiteTree};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// One suite in a dry-run report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteRecord {
    /// Slash-separated suite path, relative to the tree root
    pub path: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub specs: Vec<SpecReport>,
}

/// Builds suite trees by running a dry-run command
#[derive(Debug, Clone)]
pub struct DryRunBuilder {
    command: Vec<String>,
    report_file: PathBuf,
    root: String,
}

impl DryRunBuilder {
    /// `command` writes its report to `report_file`, relative to the checkout
    pub fn new(command: Vec<String>, report_file: impl Into<PathBuf>, root: impl Into<String>) -> Self {
        Self {
            command,
            report_file: report_file.into(),
            root: root.into(),
        }
    }

    /// Build a tree rooted at `root` from report records, in report order
    pub fn tree_from_records(root: &str, records: Vec<SuiteRecord>) -> SuiteTree {
        let mut tree = SuiteTree::new(root);
        for record in records {
            let path = if relative_path(root, &record.path).is_some() {
                record.path
            } else {
                join_path(root, record.path.trim_start_matches('/'))
            };

            let count = record.specs.len() as u64;
            if let Some(node) = tree.insert(&path, &record.description, count) {
                node.insert_specs(record.specs);
            }
        }
        tree
    }

    /// Parse a report file's contents
    pub fn parse_report(&self, path: &Path, bytes: &[u8]) -> SuitemapResult<SuiteTree> {
        let records: Vec<SuiteRecord> =
            serde_json::from_slice(bytes).map_err(|e| SuitemapError::ReportParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        debug!("Parsed {} suite record(s) from {}", records.len(), path.display());
        Ok(Self::tree_from_records(&self.root, records))
    }
}

#[async_trait]
impl SuiteBuilder for DryRunBuilder {
    async fn build(&self, repo: &Path, cancel: &CancellationToken) -> SuitemapResult<SuiteTree> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(SuitemapError::DryRun {
                path: repo.to_path_buf(),
                reason: "no dry-run command configured".to_string(),
            });
        };

        let report_path = repo.join(&self.report_file);
        if report_path.exists() {
            fs::remove_file(&report_path).await.map_err(|e| {
                SuitemapError::io(format!("removing stale report {}", report_path.display()), e)
            })?;
        }

        info!("Running dry run in {}", repo.display());
        process::run(program, args, repo, cancel)
            .await
            .map_err(|e| match e {
                SuitemapError::Cancelled => e,
                other => SuitemapError::DryRun {
                    path: repo.to_path_buf(),
                    reason: other.to_string(),
                },
            })?;

        let bytes = fs::read(&report_path).await.map_err(|e| {
            SuitemapError::io(format!("reading dry-run report {}", report_path.display()), e)
        })?;
        let tree = self.parse_report(&report_path, &bytes)?;

        fs::remove_file(&report_path).await.map_err(|e| {
            SuitemapError::io(format!("removing report {}", report_path.display()), e)
        })?;

        info!("Dry run found {} spec(s)", tree.spec_count);
        Ok(tree)
    }
}
