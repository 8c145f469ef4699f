//! Core data models shared by the engine, the clients, and the cache.
//!
//! The backend's item shape is loose: ids may be numbers or strings, prices
//! may be numbers, numeric strings, or `null`, and `chain` may be missing.
//! [`RawGroceryItem`] mirrors that wire shape and [`RawGroceryItem::validate`]
//! turns it into a fixed-field [`GroceryItem`] before anything reaches the
//! engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Chain label used for items the backend reports without a retailer.
pub const OTHER_CHAIN: &str = "Other";

/// Category label used for items the backend reports without a type.
pub const UNCATEGORIZED_TYPE: &str = "Uncategorized";

/// Stable item identifier. The backend uses integers, but string ids are
/// accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Text(String),
}

impl ItemId {
    /// Parse a user-supplied id. Numeric input becomes [`ItemId::Int`].
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => ItemId::Int(n),
            Err(_) => ItemId::Text(trimmed.to_string()),
        }
    }

    /// Textual comparison, so `"7"` matches both `7` and `"7"`.
    pub fn matches_str(&self, s: &str) -> bool {
        self.to_string() == s.trim()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Int(n) => write!(f, "{}", n),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId::Int(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Text(s.to_string())
    }
}

/// A validated catalog item. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroceryItem {
    pub id: ItemId,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    /// Retailer label, normalized to [`OTHER_CHAIN`] when absent.
    pub chain: String,
    /// `None` when the backend does not know the price.
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl GroceryItem {
    /// Human-readable price, e.g. `$3.50/kg` or `Price not available`.
    pub fn price_label(&self) -> String {
        format_price(self.price, self.unit.as_deref())
    }

    /// Short label used for selected-item chips: `Milk ($3.50)` or `Milk`.
    pub fn chip_label(&self) -> String {
        match self.price {
            Some(p) => format!("{} (${:.2})", self.name, p),
            None => self.name.clone(),
        }
    }
}

/// Format a price with an optional unit suffix.
pub fn format_price(price: Option<f64>, unit: Option<&str>) -> String {
    match (price, unit) {
        (Some(p), Some(u)) if !u.is_empty() => format!("${:.2}/{}", p, u),
        (Some(p), _) => format!("${:.2}", p),
        (None, _) => "Price not available".to_string(),
    }
}

/// Reasons a wire item is rejected at the client boundary.
#[derive(Debug, Error, PartialEq)]
pub enum ItemValidationError {
    #[error("item is missing an id")]
    MissingId,
    #[error("item {0} is missing a name")]
    MissingName(String),
    #[error("item {id} has an invalid price: {value}")]
    InvalidPrice { id: String, value: String },
}

/// Item as it arrives from the backend, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGroceryItem {
    #[serde(default)]
    pub id: Option<ItemId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default)]
    pub price: Option<serde_json::Value>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl RawGroceryItem {
    /// Convert into a [`GroceryItem`], normalizing absent labels.
    pub fn validate(self) -> Result<GroceryItem, ItemValidationError> {
        let id = self.id.ok_or(ItemValidationError::MissingId)?;
        let name = non_blank(self.name)
            .ok_or_else(|| ItemValidationError::MissingName(id.to_string()))?;
        let price = parse_price(self.price.as_ref()).map_err(|value| {
            ItemValidationError::InvalidPrice {
                id: id.to_string(),
                value,
            }
        })?;

        Ok(GroceryItem {
            id,
            name,
            item_type: non_blank(self.item_type).unwrap_or_else(|| UNCATEGORIZED_TYPE.to_string()),
            chain: non_blank(self.chain).unwrap_or_else(|| OTHER_CHAIN.to_string()),
            price,
            unit: non_blank(self.unit),
        })
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Accepts numbers, numeric strings, and `null`. Negative or non-finite
/// values are rejected.
fn parse_price(value: Option<&serde_json::Value>) -> Result<Option<f64>, String> {
    let parsed = match value {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(serde_json::Value::String(s)) => s.trim().trim_start_matches('$').parse::<f64>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(p) if p.is_finite() && p >= 0.0 => Ok(Some(p)),
        _ => Err(value.map(|v| v.to_string()).unwrap_or_default()),
    }
}

/// Validate a batch of wire items, dropping (and logging) the invalid ones.
pub fn validate_items(raw: Vec<RawGroceryItem>) -> Vec<GroceryItem> {
    let total = raw.len();
    let items: Vec<GroceryItem> = raw
        .into_iter()
        .filter_map(|r| match r.validate() {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(error = %e, "dropping invalid catalog item");
                None
            }
        })
        .collect();
    if items.len() < total {
        tracing::warn!(kept = items.len(), total, "catalog contained invalid items");
    }
    items
}

/// Catalog response body: a bare array, an object wrapping the array
/// (optionally with a `total`), or a single item from a lookup endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CatalogPayload {
    List(Vec<RawGroceryItem>),
    Wrapped {
        #[serde(alias = "data")]
        items: Vec<RawGroceryItem>,
        #[serde(default)]
        total: Option<u64>,
    },
    Single(RawGroceryItem),
}

impl CatalogPayload {
    /// Total reported by the backend, falling back to the item count.
    pub fn total(&self) -> usize {
        match self {
            CatalogPayload::List(items) => items.len(),
            CatalogPayload::Wrapped { items, total } => {
                total.map(|t| t as usize).unwrap_or(items.len())
            }
            CatalogPayload::Single(_) => 1,
        }
    }

    pub fn into_raw(self) -> Vec<RawGroceryItem> {
        match self {
            CatalogPayload::List(items) => items,
            CatalogPayload::Wrapped { items, .. } => items,
            CatalogPayload::Single(item) => vec![item],
        }
    }
}

/// AI-generated recipe returned by the recipe service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Free text; steps are separated by newlines.
    #[serde(default)]
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
}

impl Recipe {
    /// Instruction steps split on `\n`, with blank lines dropped.
    pub fn steps(&self) -> Vec<&str> {
        self.instructions
            .split('\n')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}
