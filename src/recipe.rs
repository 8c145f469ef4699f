//! `grocer recipe <id>...`: select items and generate a recipe.
//!
//! Ids are resolved against the loaded catalog; an id the catalog does not
//! contain is fetched from the backend's `/id/{id}` endpoint before giving
//! up. Repeating an id toggles it back out, exactly like clicking an item
//! card twice.

use anyhow::{bail, Context, Result};
use serde::Serialize;

use grocer_core::models::{GroceryItem, Recipe};

use crate::browse::load_session;
use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::llm::RecipeClient;
use crate::render;

#[derive(Serialize)]
struct RecipeReport<'a> {
    selected: &'a [GroceryItem],
    recipe: &'a Recipe,
    steps: Vec<&'a str>,
}

/// CLI entry point for `grocer recipe`.
pub async fn run_recipe(config: &Config, ids: &[String], refresh: bool, json: bool) -> Result<()> {
    let mut session = load_session(config, refresh).await?;
    let catalog = CatalogClient::from_config(&config.api).context("invalid catalog API settings")?;

    for id in ids {
        if session.toggle_item_str(id).is_some() {
            continue;
        }
        match catalog.fetch_by_id(id).await {
            Ok(item) => {
                session.toggle(&item);
            }
            Err(e) => bail!("unknown item id '{}': {}", id, e),
        }
    }

    let recipes = RecipeClient::from_config(&config.api).context("invalid recipe service settings")?;
    let recipe = match session.generate_recipe(&recipes).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            std::process::exit(1);
        }
    };

    if json {
        let report = RecipeReport {
            selected: session.selection().items(),
            recipe: &recipe,
            steps: recipe.steps(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::render_recipe(session.selection(), &recipe));
    }
    Ok(())
}
