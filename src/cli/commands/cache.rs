//! Cache command - inspect or clear the report cache

use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::{Config, ConfigManager};
use crate::error::SuitemapResult;
use crate::report::{CacheFile, ReportCache};
use crate::ui::{self, UiContext};
use console::style;
use std::path::Path;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> SuitemapResult<()> {
    let dir = ConfigManager::cache_dir(config);

    match args.action {
        CacheAction::List { format } => list_reports(&dir, config, format).await,
        CacheAction::Path => {
            println!("{}", dir.display());
            Ok(())
        }
        CacheAction::Clear { yes } => clear_reports(&dir, yes).await,
    }
}

/// List cached reports
async fn list_reports(dir: &Path, config: &Config, format: OutputFormat) -> SuitemapResult<()> {
    let files = ReportCache::scan_dir(dir).await?;

    if files.is_empty() {
        println!("No cached reports found.");
        return Ok(());
    }

    match format {
        OutputFormat::Table => {
            let current = ConfigManager::cache_options(config).fingerprint;
            print_table(&files, current.as_str());
        }
        OutputFormat::Json => print_json(&files)?,
        OutputFormat::Plain => {
            for file in &files {
                println!("{}", file.path.display());
            }
        }
    }

    Ok(())
}

fn print_table(files: &[CacheFile], current: &str) {
    println!(
        "{:<32} {:<12} {:>10} {:<8} {:<16}",
        "BRANCH", "REVISION", "SIZE", "BUILD", "MODIFIED"
    );
    println!("{}", "-".repeat(82));

    for file in files {
        let build = if file.fingerprint.as_str() == current {
            style("current").green().to_string()
        } else {
            style("stale").dim().to_string()
        };
        let modified = file
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<32} {:<12} {:>10} {:<8} {:<16}",
            file.key.branch,
            file.key.revision.get(..12).unwrap_or(&file.key.revision),
            format_bytes(file.size_bytes),
            build,
            modified
        );
    }

    println!();
    let total: u64 = files.iter().map(|f| f.size_bytes).sum();
    println!("Total: {} report(s), {}", files.len(), format_bytes(total));
}

fn print_json(files: &[CacheFile]) -> SuitemapResult<()> {
    #[derive(serde::Serialize)]
    struct CacheJson<'a> {
        branch: &'a str,
        revision: &'a str,
        fingerprint: &'a str,
        path: String,
        size_bytes: u64,
        modified: Option<String>,
    }

    let json_files: Vec<CacheJson<'_>> = files
        .iter()
        .map(|f| CacheJson {
            branch: &f.key.branch,
            revision: &f.key.revision,
            fingerprint: f.fingerprint.as_str(),
            path: f.path.display().to_string(),
            size_bytes: f.size_bytes,
            modified: f.modified.map(|m| m.to_rfc3339()),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json_files)?);
    Ok(())
}

/// Remove every cached report
async fn clear_reports(dir: &Path, yes: bool) -> SuitemapResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let files = ReportCache::scan_dir(dir).await?;

    if files.is_empty() {
        println!("No cached reports to clear.");
        return Ok(());
    }

    let question = format!("Remove {} cached report(s) from {}?", files.len(), dir.display());
    if !ui::confirm(&ctx, &question) {
        println!("Aborted.");
        return Ok(());
    }

    let removed = ReportCache::clear_dir(dir).await?;
    ui::step_ok(&ctx, &format!("Removed {} cached report(s)", removed));
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
