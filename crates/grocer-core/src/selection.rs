//! Selected-item set, keyed by item id.
//!
//! Membership is independent of filtering and paging: items stay selected
//! when they drop out of the current view.

use serde::Serialize;

use crate::models::{GroceryItem, ItemId};

/// Items picked for recipe generation, in the order they were selected.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SelectionSet {
    items: Vec<GroceryItem>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the item if absent, remove it if present. Returns whether the
    /// item is selected afterwards.
    pub fn toggle(&mut self, item: &GroceryItem) -> bool {
        match self.position(&item.id) {
            Some(pos) => {
                self.items.remove(pos);
                false
            }
            None => {
                self.items.push(item.clone());
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_selected(&self, item: &GroceryItem) -> bool {
        self.contains_id(&item.id)
    }

    pub fn contains_id(&self, id: &ItemId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|i| i.id == *id)
    }

    pub fn items(&self) -> &[GroceryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str) -> GroceryItem {
        GroceryItem {
            id: ItemId::Int(id),
            name: name.to_string(),
            item_type: "Dairy".to_string(),
            chain: "A".to_string(),
            price: Some(1.0),
            unit: None,
        }
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let mut sel = SelectionSet::new();
        sel.toggle(&item(1, "Milk"));
        let before: Vec<ItemId> = sel.items().iter().map(|i| i.id.clone()).collect();

        let bread = item(2, "Bread");
        assert!(sel.toggle(&bread));
        assert!(!sel.toggle(&bread));

        let after: Vec<ItemId> = sel.items().iter().map(|i| i.id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_membership_is_by_id() {
        let mut sel = SelectionSet::new();
        sel.toggle(&item(1, "Milk"));
        let renamed = item(1, "Whole Milk");
        assert!(sel.is_selected(&renamed));
        sel.toggle(&renamed);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_keeps_selection_order() {
        let mut sel = SelectionSet::new();
        sel.toggle(&item(3, "C"));
        sel.toggle(&item(1, "A"));
        sel.toggle(&item(2, "B"));
        let names: Vec<&str> = sel.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_clear() {
        let mut sel = SelectionSet::new();
        sel.toggle(&item(1, "Milk"));
        sel.toggle(&item(2, "Bread"));
        assert_eq!(sel.len(), 2);
        sel.clear();
        assert!(sel.is_empty());
        assert!(!sel.contains_id(&ItemId::Int(1)));
    }
}
