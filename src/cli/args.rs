//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Suitemap - test suite maps per branch
///
/// Builds a tree of test suites and their spec counts from a dry run,
/// caching one report per branch and revision.
#[derive(Parser, Debug)]
#[command(name = "suitemap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SUITEMAP_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the suite tree of a local working copy
    Show(ShowArgs),

    /// Summarize suite trees of remote branches
    Branches(BranchesArgs),

    /// Inspect or clear the report cache
    Cache(CacheArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Working copy (defaults to current directory)
    pub path: Option<PathBuf>,

    /// Sort by ascending spec count
    #[arg(long)]
    pub ascending: bool,

    /// Include individual specs
    #[arg(long)]
    pub leaves: bool,

    /// Keep single-child chains below the root
    #[arg(long)]
    pub no_trim: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: TreeFormat,
}

/// Arguments for the branches command
#[derive(Parser, Debug)]
pub struct BranchesArgs {
    /// Branch names or glob patterns on the remote
    #[arg(required = true)]
    pub patterns: Vec<String>,

    /// Local clone used to fetch and check out branches
    #[arg(long)]
    pub repo: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Suite tree output format
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TreeFormat {
    /// Indented outline
    Text,
    /// Full tree as JSON
    Json,
}

/// Listing output format
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cached reports
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the cache directory
    Path,

    /// Remove every cached report
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
