//! # Grocer CLI (`grocer`)
//!
//! Browse a grocery catalog grouped by store chain, narrow it with local
//! filters, and turn a selection of items into a generated recipe.
//!
//! ## Usage
//!
//! ```bash
//! grocer --config ./config/grocer.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `grocer browse` | Show the catalog grouped by chain, with filters and paging |
//! | `grocer options` | List the chains and food types available for filtering |
//! | `grocer get <id>` | Fetch a single item from the backend |
//! | `grocer lookup <by> <value>` | Look items up by brand, type, name, or chain |
//! | `grocer recipe <id>...` | Select items and generate a recipe from them |
//! | `grocer cache status` | Show the age of the local catalog cache |
//! | `grocer cache clear` | Delete the local catalog cache |
//!
//! ## Examples
//!
//! ```bash
//! # Dairy under $5, second page of the Walmart group
//! grocer browse --type Dairy --max-price 5 --page Walmart=2
//!
//! # Ignore the cache and refetch
//! grocer browse --refresh
//!
//! # Recipe from three items
//! grocer recipe 1 7 12
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use grocer::browse::{self, parse_page_arg, BrowseArgs};
use grocer::catalog::Lookup;
use grocer::{cache_cmd, config, get, recipe};

/// Grocer: a terminal front end for a grocery catalog and recipe service.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/grocer.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "grocer",
    about = "Browse a grocery catalog by chain and generate recipes from selected items",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/grocer.toml`. A missing file means all defaults.
    #[arg(long, global = true, default_value = "./config/grocer.toml")]
    config: PathBuf,

    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Show the catalog grouped by store chain.
    ///
    /// Filters are applied locally to the loaded catalog. Each chain is
    /// paginated on its own; use `--page CHAIN=N` to move a cursor.
    Browse {
        /// Exact food type.
        #[arg(long = "type")]
        item_type: Option<String>,

        /// Exact store chain.
        #[arg(long)]
        chain: Option<String>,

        /// Lower price bound (inclusive).
        #[arg(long)]
        min_price: Option<f64>,

        /// Upper price bound (inclusive).
        #[arg(long)]
        max_price: Option<f64>,

        /// Case-insensitive substring of the item name or type.
        #[arg(long)]
        search: Option<String>,

        /// Page cursor for one chain, as `CHAIN=N`. Repeatable.
        #[arg(long = "page", value_parser = parse_page_arg)]
        pages: Vec<(String, usize)>,

        /// Collapse a chain's group. Repeatable.
        #[arg(long)]
        collapse: Vec<String>,

        /// Skip the cache and refetch from the backend.
        #[arg(long)]
        refresh: bool,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List the distinct chains and food types in the catalog.
    Options {
        #[arg(long)]
        refresh: bool,

        #[arg(long)]
        json: bool,
    },

    /// Fetch one item by id.
    Get {
        /// Item id.
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Look items up by a single attribute.
    Lookup {
        /// Attribute to match on.
        by: LookupArg,

        /// Value to look up.
        value: String,

        #[arg(long)]
        json: bool,
    },

    /// Select items by id and generate a recipe from them.
    ///
    /// Naming an id twice deselects it again.
    Recipe {
        /// Item ids, in selection order.
        #[arg(required = true)]
        ids: Vec<String>,

        #[arg(long)]
        refresh: bool,

        #[arg(long)]
        json: bool,
    },

    /// Inspect or clear the local catalog cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LookupArg {
    Brand,
    Type,
    Name,
    Chain,
}

impl From<LookupArg> for Lookup {
    fn from(arg: LookupArg) -> Self {
        match arg {
            LookupArg::Brand => Lookup::Brand,
            LookupArg::Type => Lookup::Type,
            LookupArg::Name => Lookup::Name,
            LookupArg::Chain => Lookup::Chain,
        }
    }
}

/// Cache subcommands.
#[derive(Subcommand)]
enum CacheAction {
    /// Show whether the cache is empty, fresh, or expired.
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Delete both cache keys.
    Clear,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "grocer=debug,grocer_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Browse {
            item_type,
            chain,
            min_price,
            max_price,
            search,
            pages,
            collapse,
            refresh,
            json,
        } => {
            let args = BrowseArgs {
                item_type,
                chain,
                min_price,
                max_price,
                search,
                pages,
                collapse,
                refresh,
                json,
            };
            browse::run_browse(&cfg, &args).await?;
        }
        Commands::Options { refresh, json } => {
            browse::run_options(&cfg, refresh, json).await?;
        }
        Commands::Get { id, json } => {
            get::run_get(&cfg, &id, json).await?;
        }
        Commands::Lookup { by, value, json } => {
            get::run_lookup(&cfg, by.into(), &value, json).await?;
        }
        Commands::Recipe { ids, refresh, json } => {
            recipe::run_recipe(&cfg, &ids, refresh, json).await?;
        }
        Commands::Cache { action } => match action {
            CacheAction::Status { json } => cache_cmd::run_cache_status(&cfg, json)?,
            CacheAction::Clear => cache_cmd::run_cache_clear(&cfg)?,
        },
    }

    Ok(())
}
