//! Single-item retrieval and attribute lookups.
//!
//! These go straight to the backend's lookup endpoints and bypass the
//! cache and the engine.
//!
//! # Usage
//!
//! ```bash
//! grocer get 42
//! grocer lookup chain Walmart
//! grocer lookup name "oat milk" --json
//! ```

use anyhow::{Context, Result};

use crate::catalog::{CatalogClient, Lookup};
use crate::config::Config;
use crate::error::FetchError;
use crate::render;

fn exit_with(e: FetchError) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

/// CLI entry point for `grocer get <id>`.
pub async fn run_get(config: &Config, id: &str, json: bool) -> Result<()> {
    let client = CatalogClient::from_config(&config.api).context("invalid catalog API settings")?;
    let item = match client.fetch_by_id(id).await {
        Ok(item) => item,
        Err(e) => exit_with(e),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        print!("{}", render::render_item(&item));
    }
    Ok(())
}

/// CLI entry point for `grocer lookup <by> <value>`.
pub async fn run_lookup(config: &Config, by: Lookup, value: &str, json: bool) -> Result<()> {
    let client = CatalogClient::from_config(&config.api).context("invalid catalog API settings")?;
    let items = match client.lookup(by, value).await {
        Ok(items) => items,
        Err(e) => exit_with(e),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    if items.is_empty() {
        println!("No results.");
        return Ok(());
    }
    for item in &items {
        println!("{}  ({})", render::item_line(item, false), item.chain);
    }
    Ok(())
}
