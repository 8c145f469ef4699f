//! `grocer browse` and `grocer options`.
//!
//! Loads the catalog through a [`Session`] (cache first), applies the
//! filter flags client-side, moves any requested page cursors, and prints
//! the grouped view.
//!
//! # Usage
//!
//! ```bash
//! grocer browse --type Dairy --max-price 5
//! grocer browse --chain Walmart --page Walmart=2
//! grocer browse --search milk --collapse Other --json
//! grocer options
//! ```

use anyhow::{Context, Result};
use serde::Serialize;

use grocer_core::engine::{GroupView, ViewStatus};
use grocer_core::filter::FilterCriteria;

use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::file_store::FileStore;
use crate::render;
use crate::session::Session;

/// Parsed `browse` flags.
#[derive(Debug, Clone, Default)]
pub struct BrowseArgs {
    pub item_type: Option<String>,
    pub chain: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
    /// `(chain, page)` cursor moves, applied in order.
    pub pages: Vec<(String, usize)>,
    pub collapse: Vec<String>,
    pub refresh: bool,
    pub json: bool,
}

impl BrowseArgs {
    pub fn criteria(&self) -> Result<FilterCriteria> {
        Ok(FilterCriteria::from_form(
            self.item_type.as_deref(),
            self.chain.as_deref(),
            self.min_price,
            self.max_price,
            self.search.as_deref(),
        )?)
    }
}

/// Parse a `CHAIN=N` page argument.
pub fn parse_page_arg(s: &str) -> Result<(String, usize), String> {
    let pos = s
        .rfind('=')
        .ok_or_else(|| format!("invalid CHAIN=PAGE: no '=' found in '{}'", s))?;
    let page = s[pos + 1..]
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid page number in '{}'", s))?;
    Ok((s[..pos].to_string(), page))
}

#[derive(Serialize)]
struct BrowseReport<'a> {
    status: ViewStatus,
    active_filters: Vec<String>,
    total_filtered: usize,
    groups: Vec<GroupView<'a>>,
}

/// Open a session and load the catalog, exiting with a user-facing message
/// if nothing can be loaded.
pub(crate) async fn load_session(config: &Config, refresh: bool) -> Result<Session<FileStore>> {
    let client = CatalogClient::from_config(&config.api).context("invalid catalog API settings")?;
    let mut session = Session::from_config(config);
    if let Err(e) = session.load(&client, refresh).await {
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
    Ok(session)
}

/// CLI entry point for `grocer browse`.
pub async fn run_browse(config: &Config, args: &BrowseArgs) -> Result<()> {
    let criteria = args.criteria()?;
    let mut session = load_session(config, args.refresh).await?;
    session.apply_filters(criteria);

    let engine = session.engine_mut();
    for (chain, page) in &args.pages {
        if engine.set_page(chain, *page).is_none() {
            tracing::warn!(chain = %chain, "no results for chain, ignoring --page");
        }
    }
    for chain in &args.collapse {
        if engine.group(chain).is_some_and(|g| g.is_expanded()) {
            engine.toggle_expanded(chain);
        }
    }

    if args.json {
        let engine = session.engine();
        let report = BrowseReport {
            status: engine.status(),
            active_filters: engine
                .criteria()
                .active_filters()
                .into_iter()
                .map(|f| f.label)
                .collect(),
            total_filtered: engine.filtered().len(),
            groups: engine.views(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!(
            "{}",
            render::render_browse(session.engine(), session.selection())
        );
    }
    Ok(())
}

/// CLI entry point for `grocer options`.
pub async fn run_options(config: &Config, refresh: bool, json: bool) -> Result<()> {
    let session = load_session(config, refresh).await?;
    let options = session.engine().filter_options();
    if json {
        println!("{}", serde_json::to_string_pretty(&options)?);
    } else {
        print!("{}", render::render_options(&options));
    }
    Ok(())
}
