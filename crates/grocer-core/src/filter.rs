//! Filter criteria and the item predicate.
//!
//! Each dimension is optional; an absent dimension places no constraint on
//! the catalog. The checks run in a fixed order:
//!
//! 1. `item_type`: exact match on the item's type.
//! 2. `chain`: exact match on the (normalized) chain.
//! 3. `price_range`: inclusive `[min, max]`; items with unknown price never match.
//! 4. `search_term`: case-insensitive substring of name or type.
//!
//! [`apply_filters`] keeps catalog order, so the result is a pure function
//! of `(catalog, criteria)`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::GroceryItem;

/// Lower bound of the price slider.
pub const DEFAULT_PRICE_MIN: f64 = 0.0;
/// Upper bound of the price slider.
pub const DEFAULT_PRICE_MAX: f64 = 50.0;

/// Closed price interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("price bounds must be non-negative numbers (got {min} - {max})")]
    InvalidBound { min: f64, max: f64 },
    #[error("minimum price {min} is greater than maximum price {max}")]
    InvertedRange { min: f64, max: f64 },
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Result<Self, FilterError> {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 {
            return Err(FilterError::InvalidBound { min, max });
        }
        if min > max {
            return Err(FilterError::InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// The slider's full range, which means "no price constraint".
    pub fn slider_default() -> Self {
        Self {
            min: DEFAULT_PRICE_MIN,
            max: DEFAULT_PRICE_MAX,
        }
    }

    pub fn is_slider_default(&self) -> bool {
        (self.min - DEFAULT_PRICE_MIN).abs() < f64::EPSILON
            && (self.max - DEFAULT_PRICE_MAX).abs() < f64::EPSILON
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

/// A single filter dimension, used to remove one active constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Type,
    Chain,
    Price,
    Search,
}

/// An active constraint rendered as a removable chip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveFilter {
    #[serde(skip)]
    pub field: FilterField,
    pub label: String,
}

/// User-edited filter state. `None` means no constraint on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

impl FilterCriteria {
    /// Build criteria from raw form input.
    ///
    /// Empty strings become `None`. A price range equal to the slider's
    /// full `[0, 50]` range is treated as no constraint; a single missing
    /// bound falls back to the slider's bound on that side.
    pub fn from_form(
        item_type: Option<&str>,
        chain: Option<&str>,
        min_price: Option<f64>,
        max_price: Option<f64>,
        search_term: Option<&str>,
    ) -> Result<Self, FilterError> {
        let price_range = match (min_price, max_price) {
            (None, None) => None,
            (min, max) => {
                let range = PriceRange::new(
                    min.unwrap_or(DEFAULT_PRICE_MIN),
                    max.unwrap_or(DEFAULT_PRICE_MAX.max(min.unwrap_or(DEFAULT_PRICE_MIN))),
                )?;
                if range.is_slider_default() {
                    None
                } else {
                    Some(range)
                }
            }
        };

        Ok(Self {
            item_type: non_empty(item_type),
            chain: non_empty(chain),
            price_range,
            search_term: search_term
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string),
        })
    }

    /// Back to no constraints.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.item_type.is_some()
            || self.chain.is_some()
            || self.price_range.is_some()
            || self.search_term.is_some()
    }

    /// Remove a single constraint.
    pub fn clear_field(&mut self, field: FilterField) {
        match field {
            FilterField::Type => self.item_type = None,
            FilterField::Chain => self.chain = None,
            FilterField::Price => self.price_range = None,
            FilterField::Search => self.search_term = None,
        }
    }

    /// Active constraints as labelled chips, in form order.
    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        let mut chips = Vec::new();
        if let Some(ref t) = self.item_type {
            chips.push(ActiveFilter {
                field: FilterField::Type,
                label: format!("Type: {}", t),
            });
        }
        if let Some(ref c) = self.chain {
            chips.push(ActiveFilter {
                field: FilterField::Chain,
                label: format!("Chain: {}", c),
            });
        }
        if let Some(ref s) = self.search_term {
            chips.push(ActiveFilter {
                field: FilterField::Search,
                label: format!("Search: {}", s),
            });
        }
        if let Some(range) = self.price_range {
            chips.push(ActiveFilter {
                field: FilterField::Price,
                label: format!("Price: ${} - ${}", range.min, range.max),
            });
        }
        chips
    }

    /// Whether `item` passes every active constraint.
    pub fn matches(&self, item: &GroceryItem) -> bool {
        if let Some(ref t) = self.item_type {
            if item.item_type != *t {
                return false;
            }
        }
        if let Some(ref c) = self.chain {
            if item.chain != *c {
                return false;
            }
        }
        if let Some(range) = self.price_range {
            match item.price {
                Some(p) if range.contains(p) => {}
                _ => return false,
            }
        }
        if let Some(ref term) = self.search_term {
            let needle = term.to_lowercase();
            if !item.name.to_lowercase().contains(&needle)
                && !item.item_type.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Filter the catalog, preserving source order.
pub fn apply_filters<'a>(
    catalog: &'a [GroceryItem],
    criteria: &FilterCriteria,
) -> Vec<&'a GroceryItem> {
    catalog.iter().filter(|item| criteria.matches(item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemId;

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

    fn catalog() -> Vec<GroceryItem> {
        vec![
            item(1, "Milk", "Dairy", "A", Some(3.5)),
            item(2, "Bread", "Bakery", "B", Some(2.0)),
        ]
    }

    fn ids(items: &[&GroceryItem]) -> Vec<ItemId> {
        items.iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn test_type_filter() {
        let c = catalog();
        let criteria = FilterCriteria {
            item_type: Some("Dairy".into()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&c, &criteria)), vec![ItemId::Int(1)]);
    }

    #[test]
    fn test_price_range_inclusive() {
        let c = catalog();
        let criteria = FilterCriteria {
            price_range: Some(PriceRange::new(0.0, 3.0).unwrap()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&c, &criteria)), vec![ItemId::Int(2)]);

        let exact = FilterCriteria {
            price_range: Some(PriceRange::new(2.0, 3.5).unwrap()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&c, &exact).len(), 2);
    }

    #[test]
    fn test_unknown_price_excluded_only_by_price_filter() {
        let c = vec![item(1, "Mystery", "Misc", "A", None)];
        assert_eq!(apply_filters(&c, &FilterCriteria::default()).len(), 1);

        let priced = FilterCriteria {
            price_range: Some(PriceRange::new(0.0, 100.0).unwrap()),
            ..Default::default()
        };
        assert!(apply_filters(&c, &priced).is_empty());
    }

    #[test]
    fn test_search_matches_name_or_type_case_insensitive() {
        let c = catalog();
        let by_name = FilterCriteria {
            search_term: Some("mIL".into()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&c, &by_name)), vec![ItemId::Int(1)]);

        let by_type = FilterCriteria {
            search_term: Some("bake".into()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&c, &by_type)), vec![ItemId::Int(2)]);
    }

    #[test]
    fn test_chain_filter_is_exact() {
        let c = catalog();
        let criteria = FilterCriteria {
            chain: Some("a".into()),
            ..Default::default()
        };
        assert!(apply_filters(&c, &criteria).is_empty());
    }

    #[test]
    fn test_filters_are_deterministic() {
        let c = catalog();
        let criteria = FilterCriteria {
            search_term: Some("a".into()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&c, &criteria), apply_filters(&c, &criteria));
    }

    #[test]
    fn test_from_form_normalizes_empty_and_default_range() {
        let criteria =
            FilterCriteria::from_form(Some(""), Some("  "), Some(0.0), Some(50.0), Some("")).unwrap();
        assert_eq!(criteria, FilterCriteria::default());
        assert!(!criteria.is_active());
    }

    #[test]
    fn test_from_form_single_bound() {
        let criteria = FilterCriteria::from_form(None, None, None, Some(3.0), None).unwrap();
        assert_eq!(criteria.price_range, Some(PriceRange { min: 0.0, max: 3.0 }));

        let above = FilterCriteria::from_form(None, None, Some(60.0), None, None).unwrap();
        assert_eq!(above.price_range, Some(PriceRange { min: 60.0, max: 60.0 }));
    }

    #[test]
    fn test_from_form_rejects_inverted_range() {
        let err = FilterCriteria::from_form(None, None, Some(5.0), Some(1.0), None).unwrap_err();
        assert!(matches!(err, FilterError::InvertedRange { .. }));
    }

    #[test]
    fn test_active_filters_and_clear_field() {
        let mut criteria =
            FilterCriteria::from_form(Some("Dairy"), Some("A"), Some(1.0), Some(4.0), Some("milk"))
                .unwrap();
        let labels: Vec<String> = criteria.active_filters().into_iter().map(|f| f.label).collect();
        assert_eq!(
            labels,
            vec!["Type: Dairy", "Chain: A", "Search: milk", "Price: $1 - $4"]
        );

        criteria.clear_field(FilterField::Chain);
        assert!(criteria.chain.is_none());
        assert_eq!(criteria.active_filters().len(), 3);

        criteria.reset();
        assert!(criteria.active_filters().is_empty());
    }
}
