//! Show command - suite tree of a local working copy

use crate::cli::args::{ShowArgs, TreeFormat};
use crate::config::Config;
use crate::error::SuitemapResult;
use crate::ui::{TaskSpinner, UiContext};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Execute the show command
pub async fn execute(args: ShowArgs, config: &Config, cancel: CancellationToken) -> SuitemapResult<()> {
    let ctx = UiContext::detect();
    let repo = super::resolve_repo(args.path)?;
    debug!("Showing suites for {}", repo.display());

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Mapping suites in {}", repo.display()));

    let mut cache = match super::open_cache(&repo, config, cancel).await {
        Ok(cache) => cache,
        Err(e) => {
            spinner.stop_error("Failed to load report cache");
            return Err(e);
        }
    };

    let mut tree = match cache.get_or_create(&repo).await {
        Ok(tree) => tree,
        Err(e) => {
            spinner.stop_error("Failed to map suites");
            return Err(e);
        }
    };
    spinner.stop(&format!("Found {} spec(s)", tree.spec_count));

    cache.save().await?;

    tree.sort(!args.ascending);
    if !args.no_trim {
        tree.trim_root();
    }

    match args.format {
        TreeFormat::Text => print!("{}", tree.render(args.leaves)),
        TreeFormat::Json => println!("{}", serde_json::to_string_pretty(&tree)?),
    }

    Ok(())
}
