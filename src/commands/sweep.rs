//! `gridpack sweep` — evict stale artifacts from the download directory.

use anyhow::Result;
use clap::Args;

use crate::application::services::EvictionSweeper;
use crate::domain::PackagerConfig;

#[derive(Args)]
pub struct SweepArgs {
    /// Remove every artifact regardless of age
    #[arg(long)]
    pub all: bool,

    /// Wipe the directory now, then keep sweeping on the retention interval
    #[arg(long, conflicts_with = "all")]
    pub watch: bool,
}

/// Execute the sweep command.
///
/// With `--watch` this never returns: it performs the startup wipe and
/// then sweeps by age on a fixed delay, the way the embedding
/// controller runs it.
///
/// # Errors
///
/// Currently infallible; sweep failures are logged per file.
pub async fn run(args: &SweepArgs, config: &PackagerConfig, json: bool, quiet: bool) -> Result<()> {
    let sweeper = EvictionSweeper::new(config.download_dir());
    if args.watch {
        sweeper.run_startup_then_periodic().await;
        return Ok(());
    }
    let removed = sweeper.sweep(args.all);
    if json {
        println!("{}", serde_json::json!({ "removed": removed }));
    } else if !quiet {
        println!("removed {removed} artifact(s)");
    }
    Ok(())
}
