//! Plain-text rendering for the CLI.
//!
//! Each function returns a `String` so the command runners stay thin and
//! the layout can be unit-tested without capturing stdout.

use std::fmt::Write;

use grocer_core::engine::{CatalogEngine, FilterOptions, ViewStatus};
use grocer_core::models::{GroceryItem, Recipe};
use grocer_core::selection::SelectionSet;

/// Shown when the filters leave nothing.
pub const EMPTY_MESSAGE: &str = "No grocery items found matching your filters.";

/// One catalog line: `  [id] name | type | price`.
pub fn item_line(item: &GroceryItem, selected: bool) -> String {
    format!(
        "{} [{}] {} | {} | {}",
        if selected { "*" } else { " " },
        item.id,
        item.name,
        item.item_type,
        item.price_label()
    )
}

/// The grouped, paginated view including the active filter chips.
pub fn render_browse(engine: &CatalogEngine, selection: &SelectionSet) -> String {
    let mut out = String::new();

    let chips = engine.criteria().active_filters();
    if !chips.is_empty() {
        let labels: Vec<&str> = chips.iter().map(|c| c.label.as_str()).collect();
        let _ = writeln!(out, "Active filters: {}", labels.join(" | "));
        out.push('\n');
    }

    match engine.status() {
        ViewStatus::Loading => {
            out.push_str("Loading grocery items...\n");
            return out;
        }
        ViewStatus::Failed(msg) => {
            let _ = writeln!(out, "{}", msg);
            return out;
        }
        ViewStatus::Empty => {
            let _ = writeln!(out, "{}", EMPTY_MESSAGE);
            return out;
        }
        ViewStatus::Ready => {}
    }

    let _ = writeln!(
        out,
        "{} items in {} chains",
        engine.filtered().len(),
        engine.groups().len()
    );

    for view in engine.views() {
        out.push('\n');
        if !view.expanded {
            let _ = writeln!(out, "== {} ({} items) [collapsed]", view.chain, view.total_items);
            continue;
        }
        let _ = writeln!(
            out,
            "== {} ({} items, page {}/{})",
            view.chain, view.total_items, view.page, view.total_pages
        );
        for item in &view.items {
            let _ = writeln!(out, "{}", item_line(item, selection.is_selected(item)));
        }
    }
    out
}

/// Drop-down values for the filter form.
pub fn render_options(options: &FilterOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Store chains ({}):", options.chains.len());
    for c in &options.chains {
        let _ = writeln!(out, "  {}", c);
    }
    let _ = writeln!(out, "Food types ({}):", options.types.len());
    for t in &options.types {
        let _ = writeln!(out, "  {}", t);
    }
    out
}

/// Full detail block for a single item.
pub fn render_item(item: &GroceryItem) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "id:    {}", item.id);
    let _ = writeln!(out, "name:  {}", item.name);
    let _ = writeln!(out, "type:  {}", item.item_type);
    let _ = writeln!(out, "chain: {}", item.chain);
    let _ = writeln!(out, "price: {}", item.price_label());
    out
}

/// The recipe card, preceded by the selected-item chips.
pub fn render_recipe(selection: &SelectionSet, recipe: &Recipe) -> String {
    let mut out = String::new();
    let chips: Vec<String> = selection.items().iter().map(|i| i.chip_label()).collect();
    let _ = writeln!(out, "Selected Items ({}): {}", selection.len(), chips.join(", "));
    out.push('\n');

    let _ = writeln!(out, "{}", recipe.title);
    let _ = writeln!(out, "{}", "=".repeat(recipe.title.chars().count().max(1)));
    out.push('\n');

    out.push_str("Ingredients:\n");
    for ingredient in &recipe.ingredients {
        let _ = writeln!(out, "  - {}", ingredient);
    }
    out.push('\n');

    out.push_str("Instructions:\n");
    for (n, step) in recipe.steps().iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", n + 1, step);
    }

    if let Some(ref tips) = recipe.tips {
        out.push('\n');
        out.push_str("Tips:\n");
        let _ = writeln!(out, "  {}", tips);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use grocer_core::filter::FilterCriteria;
    use grocer_core::models::ItemId;

    fn item(id: i64, name: &str, ty: &str, chain: &str, price: Option<f64>) -> GroceryItem {
        GroceryItem {
            id: ItemId::Int(id),
            name: name.to_string(),
            item_type: ty.to_string(),
            chain: chain.to_string(),
            price,
            unit: None,
        }
    }

    fn engine() -> CatalogEngine {
        let mut engine = CatalogEngine::new(10);
        engine.set_catalog(vec![
            item(1, "Milk", "Dairy", "A", Some(3.5)),
            item(2, "Bread", "Bakery", "B", Some(2.0)),
        ]);
        engine
    }

    #[test]
    fn test_browse_lists_groups() {
        let mut sel = SelectionSet::new();
        sel.toggle(&item(2, "Bread", "Bakery", "B", Some(2.0)));
        let text = render_browse(&engine(), &sel);
        assert!(text.contains("2 items in 2 chains"));
        assert!(text.contains("== A (1 items, page 1/1)"));
        assert!(text.contains("  [1] Milk | Dairy | $3.50"));
        assert!(text.contains("* [2] Bread | Bakery | $2.00"));
    }

    #[test]
    fn test_browse_empty_and_chips() {
        let mut e = engine();
        e.apply_filters(FilterCriteria {
            item_type: Some("Frozen".into()),
            ..Default::default()
        });
        let text = render_browse(&e, &SelectionSet::new());
        assert!(text.contains("Active filters: Type: Frozen"));
        assert!(text.contains(EMPTY_MESSAGE));
    }

    #[test]
    fn test_browse_collapsed_group() {
        let mut e = engine();
        e.toggle_expanded("B");
        let text = render_browse(&e, &SelectionSet::new());
        assert!(text.contains("== B (1 items) [collapsed]"));
        assert!(!text.contains("Bread"));
    }

    #[test]
    fn test_recipe_card() {
        let mut sel = SelectionSet::new();
        sel.toggle(&item(1, "Milk", "Dairy", "A", Some(3.5)));
        sel.toggle(&item(2, "Bread", "Bakery", "B", None));
        let recipe = Recipe {
            title: "Toast".into(),
            ingredients: vec!["Milk".into(), "Bread".into()],
            instructions: "Mix\nServe".into(),
            tips: Some("Serve warm".into()),
        };
        let text = render_recipe(&sel, &recipe);
        assert!(text.contains("Selected Items (2): Milk ($3.50), Bread"));
        assert!(text.contains("  1. Mix\n  2. Serve\n"));
        assert!(text.contains("Tips:\n  Serve warm"));
    }
}
