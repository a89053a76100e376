//! Cart commands - show and edit the persisted cart.

use anyhow::{Context, Result};
use clap::Args;
use gomarket_core::NewCartItem;
use gomarket_store::{CartStore, JsonFileStorage};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::commands::config::load_config;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Product id.
    #[arg(long)]
    pub id: String,

    /// Product title.
    #[arg(long)]
    pub title: String,

    /// Product image URL.
    #[arg(long, default_value = "")]
    pub image_url: String,

    /// Unit price.
    #[arg(long)]
    pub price: f64,
}

impl AddArgs {
    fn to_item(&self) -> NewCartItem {
        NewCartItem::new(&self.id, &self.title, &self.image_url, self.price)
    }
}

/// Opens the cart described by the CLI configuration.
async fn open_cart(cli: &Cli) -> Result<CartStore> {
    let config = load_config(cli)?;
    let storage = Arc::new(JsonFileStorage::new(&config.storage_path));

    CartStore::open(storage, &config)
        .await
        .with_context(|| format!("Failed to load cart from {}", config.storage_path.display()))
}

/// Runs the show command.
pub async fn show(cli: &Cli) -> Result<()> {
    let cart = open_cart(cli).await?;
    print_cart(&cart, cli).await
}

/// Runs the add command.
pub async fn add(args: &AddArgs, cli: &Cli) -> Result<()> {
    let item = args.to_item();
    item.validate()?;

    let cart = open_cart(cli).await?;
    cart.add_to_cart(item).await?;

    info!(id = %args.id, "Added to cart");
    print_cart(&cart, cli).await
}

/// Runs the increment command.
pub async fn increment(id: &str, cli: &Cli) -> Result<()> {
    let cart = open_cart(cli).await?;
    if cart.get(id).await.is_none() {
        warn!(id = %id, "Product not in cart");
    }
    cart.increment(id).await?;
    print_cart(&cart, cli).await
}

/// Runs the decrement command.
pub async fn decrement(id: &str, cli: &Cli) -> Result<()> {
    let cart = open_cart(cli).await?;
    if cart.get(id).await.is_none() {
        warn!(id = %id, "Product not in cart");
    }
    cart.decrement(id).await?;
    print_cart(&cart, cli).await
}

/// Runs the clear command.
///
/// The stored snapshot is overwritten without being read, so a corrupt
/// storage file can be recovered this way.
pub async fn clear(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let storage = Arc::new(JsonFileStorage::new(&config.storage_path));
    let cart = CartStore::new(storage, &config);
    cart.clear()
        .await
        .with_context(|| format!("Failed to clear cart in {}", config.storage_path.display()))?;
    info!("Cart cleared");
    print_cart(&cart, cli).await
}

async fn print_cart(cart: &CartStore, cli: &Cli) -> Result<()> {
    let items = cart.products().await;

    if let Some(saved) = cart.last_saved_at().await {
        let local = saved.with_timezone(&chrono::Local);
        debug!(saved_at = %local.format("%Y-%m-%d %H:%M:%S"), "Cart saved");
    }

    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                let formatter = TextFormatter::new(!cli.no_color);
                println!("{}", formatter.format_cart(&items));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = formatter.format_cart(cart.storage_key(), &items)?;
            println!("{output}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Commands;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli_for(dir: &TempDir, command: &[&str]) -> Cli {
        let config = dir.path().join("config.json");
        let storage = dir.path().join("storage.json");
        let mut args = vec![
            "gomarket",
            "--quiet",
            "--config",
            config.to_str().unwrap(),
            "--storage",
            storage.to_str().unwrap(),
        ];
        args.extend_from_slice(command);
        Cli::try_parse_from(args).unwrap()
    }

    #[tokio::test]
    async fn test_clear_recovers_corrupt_storage_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("storage.json"), "not json").unwrap();

        let show = cli_for(&dir, &["show"]);
        let err = super::show(&show).await.unwrap_err();
        assert!(format!("{err:#}").contains("corrupt"));

        clear(&cli_for(&dir, &["clear"])).await.unwrap();
        super::show(&show).await.unwrap();
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_price() {
        let dir = TempDir::new().unwrap();
        let cli = cli_for(&dir, &["add", "--id", "1", "--title", "Shirt", "--price=-2"]);
        let Some(Commands::Add(args)) = &cli.command else {
            panic!("expected add command");
        };

        assert!(add(args, &cli).await.is_err());
        assert!(!dir.path().join("storage.json").exists());
    }
}
