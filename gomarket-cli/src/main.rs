// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! GoMarket CLI - inspect and edit the persisted shopping cart.
//!
//! # Examples
//!
//! ```bash
//! # Show the cart
//! gomarket
//!
//! # Add a product (adding it again bumps its quantity)
//! gomarket add --id 42 --title "Camiseta" --image-url https://img/42.png --price 49.9
//!
//! # Change quantities
//! gomarket increment 42
//! gomarket decrement 42
//!
//! # JSON output
//! gomarket show --format json --pretty
//!
//! # Use a different storage file
//! gomarket --storage /tmp/cart.json show
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use gomarket_store::StoreConfig;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{cart, config};

// ============================================================================
// CLI Definition
// ============================================================================

/// GoMarket CLI - persistent shopping cart.
#[derive(Parser)]
#[command(name = "gomarket")]
#[command(about = "Inspect and edit the GoMarket shopping cart")]
#[command(long_about = r#"
GoMarket keeps a shopping cart on local storage so it survives restarts.

Examples:
  gomarket                                  # Show the cart
  gomarket add --id 1 --title Shirt --price 49.9
  gomarket increment 1                      # One more of product 1
  gomarket decrement 1                      # One fewer; removed at zero
  gomarket --format json show               # JSON output
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'show' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file (defaults to the platform config dir).
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Storage file, overriding config and GOMARKET_STORAGE.
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show the cart (default if no command specified).
    #[command(visible_alias = "s")]
    Show,

    /// Add a product to the cart.
    #[command(visible_alias = "a")]
    Add(cart::AddArgs),

    /// Increase a product's quantity by one.
    #[command(visible_alias = "inc")]
    Increment {
        /// Product id.
        id: String,
    },

    /// Decrease a product's quantity by one, removing it at zero.
    #[command(visible_alias = "dec")]
    Decrement {
        /// Product id.
        id: String,
    },

    /// Remove every product from the cart.
    Clear,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
}

// ============================================================================
// Logging Setup
// ============================================================================

/// Fallback directive when `RUST_LOG` is unset: `--verbose` wins, then the
/// configured `log_level`.
fn default_directive(verbose: bool, config: Option<&StoreConfig>) -> String {
    if verbose {
        return "gomarket=debug,info".to_string();
    }
    config.map_or_else(|| "gomarket=warn".to_string(), StoreConfig::log_directive)
}

fn setup_logging(cli: &Cli) {
    if cli.quiet {
        return;
    }

    // A broken config file is reported by the command itself.
    let config = config::load_config(cli).ok();
    let directive = default_directive(cli.verbose, config.as_ref());

    let filter = if cli.verbose {
        EnvFilter::new(directive)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli);

    let result = match &cli.command {
        Some(Commands::Show) | None => cart::show(&cli).await,
        Some(Commands::Add(args)) => cart::add(args, &cli).await,
        Some(Commands::Increment { id }) => cart::increment(id, &cli).await,
        Some(Commands::Decrement { id }) => cart::decrement(id, &cli).await,
        Some(Commands::Clear) => cart::clear(&cli).await,
        Some(Commands::Config(args)) => config::run(args, &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::Error as i32);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_follows_config_log_level() {
        let config = StoreConfig {
            log_level: "debug".to_string(),
            ..StoreConfig::default()
        };
        assert_eq!(default_directive(false, Some(&config)), "gomarket=debug");
        assert_eq!(default_directive(false, None), "gomarket=warn");
    }

    #[test]
    fn test_verbose_overrides_config_log_level() {
        let config = StoreConfig {
            log_level: "error".to_string(),
            ..StoreConfig::default()
        };
        assert_eq!(default_directive(true, Some(&config)), "gomarket=debug,info");
    }
}
