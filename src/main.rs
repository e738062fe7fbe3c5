//! Suitemap - test suite maps per branch
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use suitemap::cli::{Cli, Commands};
use suitemap::config::{Config, ConfigManager};
use suitemap::error::SuitemapResult;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> SuitemapResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Using config {}", config_manager.path().display());

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, cancelling");
            token.cancel();
        }
    });

    match cli.command {
        Commands::Show(args) => suitemap::cli::commands::show(args, &config, cancel).await,
        Commands::Branches(args) => suitemap::cli::commands::branches(args, &config, cancel).await,
        Commands::Cache(args) => suitemap::cli::commands::cache(args, &config).await,
        Commands::Config(args) => {
            suitemap::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// 0 = warn (spinners only), 1 = info, 2+ = debug; logs go to stderr
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("suitemap=warn"),
        1 => EnvFilter::new("suitemap=info"),
        _ => EnvFilter::new("suitemap=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
