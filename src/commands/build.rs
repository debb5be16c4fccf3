//! `gridpack build` — build an agent or monitor package.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

use crate::application::services::Packager;
use crate::domain::{PackageRequest, PackageVariant, PackagerConfig};
use crate::infra::assets::EmbeddedResources;
use crate::infra::libraries::LibDirCatalog;

#[derive(Subcommand)]
pub enum BuildCommand {
    /// Build an agent package
    Agent(AgentArgs),

    /// Build a monitor package
    Monitor(MonitorArgs),
}

#[derive(Args)]
pub struct AgentArgs {
    /// Cluster region the agent reports into
    #[arg(long)]
    pub region: Option<String>,

    /// Controller address the agent connects back to
    #[arg(long)]
    pub controller_host: Option<String>,

    /// Controller port (defaults to the configured port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Owner of a private agent
    #[arg(long)]
    pub owner: Option<String>,

    /// Name the artifact for Windows downloads (.zip extension)
    #[arg(long)]
    pub windows: bool,
}

#[derive(Args)]
pub struct MonitorArgs {
    /// Monitor binding port (defaults to the configured port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Name the artifact for Windows downloads (.zip extension)
    #[arg(long)]
    pub windows: bool,
}

/// Execute the build command.
///
/// # Errors
///
/// Returns an error if any package build step fails.
pub fn run(command: &BuildCommand, config: PackagerConfig, json: bool, quiet: bool) -> Result<()> {
    let request = request_from(command, &config);
    let libraries = LibDirCatalog::new(config.lib_dir.clone());
    let packager = Packager::new(config, EmbeddedResources, libraries);

    let artifact = packager
        .create_package(&request)
        .context("building package")?;

    if json {
        let modified: DateTime<Utc> = artifact.last_modified.into();
        println!(
            "{}",
            serde_json::json!({
                "path": artifact.path,
                "modified": modified.to_rfc3339(),
            })
        );
    } else if !quiet {
        println!("{}", artifact.path.display());
    }
    Ok(())
}

fn request_from(command: &BuildCommand, config: &PackagerConfig) -> PackageRequest {
    match command {
        BuildCommand::Agent(args) => PackageRequest {
            variant: PackageVariant::Agent,
            region: args.region.clone(),
            controller_host: args.controller_host.clone(),
            controller_port: args.port.unwrap_or(config.controller_port),
            owner: args.owner.clone(),
            for_windows: args.windows,
        },
        BuildCommand::Monitor(args) => PackageRequest {
            variant: PackageVariant::Monitor,
            region: None,
            controller_host: None,
            controller_port: args.port.unwrap_or(config.controller_port),
            owner: None,
            for_windows: args.windows,
        },
    }
}
