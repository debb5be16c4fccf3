//! CLI argument parsing with clap derive.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use crate::infra;

/// Build distributable gridbench agent and monitor packages
#[derive(Parser)]
#[command(
    name = "gridpack",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, env = "GRIDPACK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a package
    #[command(subcommand)]
    Build(commands::build::BuildCommand),

    /// Evict stale artifacts from the download directory
    Sweep(commands::sweep::SweepArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            json,
            quiet,
            config,
            command,
        } = self;
        match command {
            Command::Version => commands::version::run(json),
            Command::Build(build) => {
                let config = infra::config::load(config.as_deref())?;
                commands::build::run(&build, config, json, quiet)
            }
            Command::Sweep(args) => {
                let config = infra::config::load(config.as_deref())?;
                commands::sweep::run(&args, &config, json, quiet).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
