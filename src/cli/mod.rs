//! Command-line interface definitions.

pub mod check;
pub mod output;
pub mod provision;
pub mod sync;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Settings;
use crate::error::Result;

/// Edgeward - onboard sites into the edge security service.
#[derive(Parser, Debug)]
#[command(name = "edgeward")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "edgeward.toml", global = true)]
    pub config: PathBuf,

    /// Corp (tenant) name; falls back to config or EDGEWARD_CORP
    #[arg(long, global = true)]
    pub corp: Option<String>,

    /// API user email; falls back to EDGEWARD_USER_EMAIL
    #[arg(long, global = true)]
    pub user_email: Option<String>,

    /// API token; falls back to EDGEWARD_API_TOKEN
    #[arg(long, global = true)]
    pub api_token: Option<String>,

    /// CDN provider write-access token; falls back to EDGEWARD_PROVIDER_TOKEN
    #[arg(long, global = true)]
    pub provider_token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision a site and map it to a CDN service
    Provision(ProvisionArgs),

    /// Synchronize origin backends for mapped services
    Sync(SyncArgs),

    /// Run configuration checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `edgeward check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration and credential presence without remote calls
    Config,
}

/// Arguments for the `provision` subcommand.
#[derive(Parser, Debug)]
pub struct ProvisionArgs {
    /// Site name to provision
    #[arg(long, conflicts_with = "file")]
    pub site: Option<String>,

    /// CDN service identifier to map the site to
    #[arg(long, conflicts_with = "file")]
    pub service_id: Option<String>,

    /// Batch input file of `site,service_id` rows
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Activate the service version after mapping
    #[arg(long)]
    pub activate: bool,

    /// Percentage of traffic to inspect at the edge
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub percent: u8,
}

/// Arguments for the `sync` subcommand.
#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Site name to synchronize
    #[arg(long, conflicts_with = "file")]
    pub site: Option<String>,

    /// CDN service identifier whose backends to pull
    #[arg(long, conflicts_with = "file")]
    pub service_id: Option<String>,

    /// Batch input file of `site,service_id` rows
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Load settings, apply CLI overrides, and run the selected command.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Check(CheckCommand::Config) => check::execute_config(&cli.config),
        Commands::Provision(args) => {
            let settings = load_settings(&cli)?;
            provision::execute(&settings, args).await
        }
        Commands::Sync(args) => {
            let settings = load_settings(&cli)?;
            sync::execute(&settings, args).await
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load_or_default(&cli.config)?;
    apply_overrides(&mut settings, cli);
    settings.init_logging();
    Ok(settings)
}

fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(corp) = &cli.corp {
        settings.api.corp = Some(corp.clone());
    }
    if let Some(user_email) = &cli.user_email {
        settings.credentials.user_email = Some(user_email.clone());
    }
    if let Some(api_token) = &cli.api_token {
        settings.credentials.api_token = Some(api_token.clone());
    }
    if let Some(provider_token) = &cli.provider_token {
        settings.credentials.provider_token = Some(provider_token.clone());
    }
}
