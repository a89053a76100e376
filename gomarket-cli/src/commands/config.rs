//! Config command - manage configuration.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use gomarket_store::{default_config_dir, default_config_path, StoreConfig};
use std::path::PathBuf;
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Write a configuration file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => show_paths(cli),
        ConfigAction::Init { force } => init_config(*force, cli).await,
    }
}

/// Returns the config file path selected on the command line.
pub fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(default_config_path)
}

/// Loads the effective configuration: file, then environment, then flags.
pub fn load_config(cli: &Cli) -> Result<StoreConfig> {
    let path = config_path(cli);
    let config = StoreConfig::load_from(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?
        .with_env_overrides()
        .with_storage_override(cli.storage.clone());
    Ok(config)
}

fn show_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match cli.format {
        OutputFormat::Text => {
            println!("GoMarket Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Storage file:     {}", config.storage_path.display());
            println!("Storage key:      {}", config.storage_key);
            println!("Strict snapshots: {}", config.strict_snapshots);
            println!("Log level:        {}", config.log_level);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&config)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let config_file = config_path(cli);
    let storage_file = load_config(cli)?.storage_path;

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:   {}", config_dir.display());
            println!("Config file:  {}", config_file.display());
            println!("Storage file: {}", storage_file.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "config_file": config_file.display().to_string(),
                "storage_file": storage_file.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn init_config(force: bool, cli: &Cli) -> Result<()> {
    let path = config_path(cli);

    if tokio::fs::try_exists(&path).await? && !force {
        anyhow::bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    StoreConfig::default().save_to(&path)?;
    info!(path = %path.display(), "Config initialized");
    println!("Wrote default configuration to {}", path.display());

    Ok(())
}
