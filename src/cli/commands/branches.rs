//! Branches command - suite summaries for remote branches

use crate::cli::args::{BranchesArgs, OutputFormat};
use crate::config::Config;
use crate::error::SuitemapResult;
use crate::report::{CacheKey, ReportCache};
use crate::ui::{self, TaskSpinner, UiContext};
use crate::vcs::Worktree;
use console::style;
use serde::Serialize;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Summary of one remote branch
#[derive(Debug, Serialize)]
struct BranchSummary {
    branch: String,
    revision: String,
    spec_count: u64,
    suites: usize,
    cached: bool,
}

/// Execute the branches command
pub async fn execute(args: BranchesArgs, config: &Config, cancel: CancellationToken) -> SuitemapResult<()> {
    let ctx = UiContext::detect();
    let repo = super::resolve_repo(args.repo)?;
    let mut cache = super::open_cache(&repo, config, cancel).await?;

    let matched = cache.get_remote_patterns(&args.patterns).await?;
    if matched.is_empty() {
        ui::step_warn(
            &ctx,
            &format!("No branches on {} match {}", cache.remote(), args.patterns.join(", ")),
        );
        return Ok(());
    }

    let total = matched.len();
    let mut summaries = Vec::with_capacity(total);
    let mut missing = Vec::new();
    for (key, tree) in matched {
        match tree {
            Some(tree) => summaries.push(BranchSummary {
                branch: key.branch.clone(),
                revision: key.revision.clone(),
                spec_count: tree.spec_count,
                suites: tree.children().len(),
                cached: true,
            }),
            None => missing.push(key),
        }
    }

    ui::step_info(
        &ctx,
        &format!("{} of {} branch(es) cached", summaries.len(), total),
    );

    for key in missing {
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start(&format!("Mapping suites on {}", key.branch));
        match build_branch(&mut cache, &repo, &key).await {
            Ok(summary) => {
                spinner.stop(&format!("{}: {} spec(s)", key.branch, summary.spec_count));
                summaries.push(summary);
            }
            Err(e) => {
                spinner.stop_error(&format!("{}: dry run failed", key.branch));
                return Err(e);
            }
        }
    }

    cache.save().await?;

    summaries.sort_by(|a, b| a.branch.cmp(&b.branch));
    match args.format {
        OutputFormat::Table => print_table(&summaries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Plain => {
            for s in &summaries {
                println!("{}\t{}", s.branch, s.spec_count);
            }
        }
    }

    Ok(())
}

/// Build the tree for `key` in a temporary worktree and cache it
async fn build_branch(
    cache: &mut ReportCache,
    repo: &Path,
    key: &CacheKey,
) -> SuitemapResult<BranchSummary> {
    let cancel = cache.cancel_token().clone();
    let worktree = Worktree::add(repo, cache.remote(), &key.branch, &key.revision, &cancel).await?;

    let built = cache.builder().build(worktree.path(), &cancel).await;
    if let Err(e) = worktree.remove(&cancel).await {
        debug!("Failed to remove worktree: {}", e);
    }
    let tree = built?;

    let summary = BranchSummary {
        branch: key.branch.clone(),
        revision: key.revision.clone(),
        spec_count: tree.spec_count,
        suites: tree.children().len(),
        cached: false,
    };
    cache.insert(key.clone(), tree);
    Ok(summary)
}

fn print_table(summaries: &[BranchSummary]) {
    println!(
        "{:<32} {:<12} {:>8} {:>8} {:<8}",
        "BRANCH", "REVISION", "SPECS", "SUITES", "SOURCE"
    );
    println!("{}", "-".repeat(72));

    for s in summaries {
        let source = if s.cached {
            style("cached").green().to_string()
        } else {
            style("built").yellow().to_string()
        };
        println!(
            "{:<32} {:<12} {:>8} {:>8} {:<8}",
            s.branch,
            short_revision(&s.revision),
            s.spec_count,
            s.suites,
            source
        );
    }

    println!();
    println!("Total: {} branch(es)", summaries.len());
}

fn short_revision(revision: &str) -> &str {
    revision.get(..12).unwrap_or(revision)
}
