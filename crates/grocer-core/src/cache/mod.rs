//! Expiring catalog cache over a key/value store.
//!
//! The [`KeyValueStore`] trait abstracts the persistent string storage
//! (a JSON file for the CLI, a `HashMap` in tests). [`CatalogCache`] keeps
//! two keys in it:
//!
//! | Key | Value |
//! |-----|-------|
//! | [`ITEMS_KEY`] | JSON array of [`GroceryItem`] |
//! | [`TIMESTAMP_KEY`] | fetch time, epoch milliseconds as a decimal string |
//!
//! An entry is valid while `now - fetched_at < 24h`. Expired entries are
//! left in place and reported absent until overwritten. Storage failures
//! never propagate: reads degrade to a miss and writes to a no-op.

pub mod memory;

use anyhow::Result;
use serde::Serialize;

use crate::models::GroceryItem;

/// Storage key for the serialized catalog.
pub const ITEMS_KEY: &str = "groceryItems";
/// Storage key for the fetch timestamp.
pub const TIMESTAMP_KEY: &str = "groceryItemsTimestamp";
/// Expiration window: 24 hours.
pub const CACHE_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// String key/value storage, in the manner of browser local storage.
///
/// Implementations must be `Send + Sync`; interior mutability is expected.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// A cached catalog snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub items: Vec<GroceryItem>,
    pub fetched_at_ms: i64,
}

/// Freshness report, used by `grocer cache status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CacheStatus {
    Missing,
    Fresh { items: usize, age_ms: i64 },
    Expired { items: usize, age_ms: i64 },
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A timestamp from the future can only come from a damaged file or a
/// clock change, so it counts as expired.
fn is_expired(age_ms: i64) -> bool {
    !(0..CACHE_TTL_MS).contains(&age_ms)
}

/// The catalog cache. Holds its store by value.
pub struct CatalogCache<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> CatalogCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the entry if present and unexpired.
    pub fn read(&self) -> Option<CacheEntry> {
        self.read_at(now_ms())
    }

    pub fn read_at(&self, now_ms: i64) -> Option<CacheEntry> {
        let fetched_at_ms = self.read_timestamp()?;
        let age_ms = now_ms.saturating_sub(fetched_at_ms);
        if is_expired(age_ms) {
            tracing::debug!(age_ms, "catalog cache expired");
            return None;
        }
        let items = self.read_items()?;
        tracing::debug!(items = items.len(), "catalog cache hit");
        Some(CacheEntry {
            items,
            fetched_at_ms,
        })
    }

    /// Store `items` stamped with the current time.
    pub fn write(&self, items: &[GroceryItem]) {
        self.write_at(items, now_ms())
    }

    pub fn write_at(&self, items: &[GroceryItem], now_ms: i64) {
        let serialized = match serde_json::to_string(items) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "could not serialize catalog for cache");
                return;
            }
        };
        if let Err(e) = self.store.set(ITEMS_KEY, &serialized) {
            tracing::warn!(error = %e, "catalog cache write failed");
            return;
        }
        if let Err(e) = self.store.set(TIMESTAMP_KEY, &now_ms.to_string()) {
            tracing::warn!(error = %e, "catalog cache timestamp write failed");
        }
    }

    /// Remove both keys.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(ITEMS_KEY)?;
        self.store.remove(TIMESTAMP_KEY)?;
        Ok(())
    }

    pub fn status_at(&self, now_ms: i64) -> CacheStatus {
        let (Some(fetched_at_ms), Some(items)) = (self.read_timestamp(), self.read_items()) else {
            return CacheStatus::Missing;
        };
        let age_ms = now_ms.saturating_sub(fetched_at_ms);
        if is_expired(age_ms) {
            CacheStatus::Expired {
                items: items.len(),
                age_ms,
            }
        } else {
            CacheStatus::Fresh {
                items: items.len(),
                age_ms,
            }
        }
    }

    fn read_timestamp(&self) -> Option<i64> {
        let raw = match self.store.get(TIMESTAMP_KEY) {
            Ok(v) => v?,
            Err(e) => {
                tracing::warn!(error = %e, "catalog cache unavailable");
                return None;
            }
        };
        match raw.trim().parse::<i64>() {
            Ok(ts) => Some(ts),
            Err(_) => {
                tracing::warn!(value = %raw, "ignoring malformed cache timestamp");
                None
            }
        }
    }

    fn read_items(&self) -> Option<Vec<GroceryItem>> {
        let raw = match self.store.get(ITEMS_KEY) {
            Ok(v) => v?,
            Err(e) => {
                tracing::warn!(error = %e, "catalog cache unavailable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(items) => Some(items),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable cached catalog");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::InMemoryStore;
    use super::*;
    use crate::models::ItemId;

    const MINUTE_MS: i64 = 60 * 1000;
    const HOUR_MS: i64 = 60 * MINUTE_MS;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            anyhow::bail!("storage unavailable")
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            anyhow::bail!("storage unavailable")
        }
        fn remove(&self, _key: &str) -> Result<()> {
            anyhow::bail!("storage unavailable")
        }
    }

    fn items() -> Vec<GroceryItem> {
        vec![GroceryItem {
            id: ItemId::Int(1),
            name: "Milk".into(),
            item_type: "Dairy".into(),
            chain: "A".into(),
            price: Some(3.5),
            unit: Some("l".into()),
        }]
    }

    #[test]
    fn test_read_within_ttl() {
        let cache = CatalogCache::new(InMemoryStore::new());
        let t = 1_700_000_000_000;
        cache.write_at(&items(), t);

        let entry = cache.read_at(t + 23 * HOUR_MS + 59 * MINUTE_MS).unwrap();
        assert_eq!(entry.items, items());
        assert_eq!(entry.fetched_at_ms, t);
    }

    #[test]
    fn test_read_after_ttl_is_absent() {
        let cache = CatalogCache::new(InMemoryStore::new());
        let t = 1_700_000_000_000;
        cache.write_at(&items(), t);

        assert!(cache.read_at(t + 24 * HOUR_MS + MINUTE_MS).is_none());
        assert!(cache.read_at(t + CACHE_TTL_MS).is_none());
        // Expired entries are not deleted.
        assert!(cache.store().get(ITEMS_KEY).unwrap().is_some());
    }

    #[test]
    fn test_extreme_timestamps_are_expired() {
        let cache = CatalogCache::new(InMemoryStore::new());
        cache.write_at(&items(), 0);
        let now = 1_700_000_000_000;

        for stamp in [i64::MIN, i64::MAX, now + HOUR_MS] {
            cache.store().set(TIMESTAMP_KEY, &stamp.to_string()).unwrap();
            assert!(cache.read_at(now).is_none(), "timestamp {}", stamp);
            assert!(
                matches!(cache.status_at(now), CacheStatus::Expired { items: 1, .. }),
                "timestamp {}",
                stamp
            );
        }
    }

    #[test]
    fn test_write_replaces_prior_entry() {
        let cache = CatalogCache::new(InMemoryStore::new());
        cache.write_at(&items(), 0);
        cache.write_at(&[], 10 * HOUR_MS);
        let entry = cache.read_at(11 * HOUR_MS).unwrap();
        assert!(entry.items.is_empty());
        assert_eq!(entry.fetched_at_ms, 10 * HOUR_MS);
    }

    #[test]
    fn test_storage_keys_and_format() {
        let cache = CatalogCache::new(InMemoryStore::new());
        cache.write_at(&items(), 42);
        let store = cache.store();
        assert_eq!(store.get(TIMESTAMP_KEY).unwrap().as_deref(), Some("42"));
        let raw = store.get(ITEMS_KEY).unwrap().unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v[0]["name"], "Milk");
    }

    #[test]
    fn test_malformed_entries_are_misses() {
        let store = InMemoryStore::new();
        store.set(TIMESTAMP_KEY, "yesterday").unwrap();
        store.set(ITEMS_KEY, "[]").unwrap();
        let cache = CatalogCache::new(store);
        assert!(cache.read_at(0).is_none());

        cache.store().set(TIMESTAMP_KEY, "0").unwrap();
        cache.store().set(ITEMS_KEY, "{not json").unwrap();
        assert!(cache.read_at(1).is_none());
    }

    #[test]
    fn test_broken_store_degrades_silently() {
        let cache = CatalogCache::new(BrokenStore);
        cache.write_at(&items(), 0);
        assert!(cache.read_at(0).is_none());
        assert_eq!(cache.status_at(0), CacheStatus::Missing);
    }

    #[test]
    fn test_status_and_clear() {
        let cache = CatalogCache::new(InMemoryStore::new());
        assert_eq!(cache.status_at(0), CacheStatus::Missing);

        cache.write_at(&items(), 0);
        assert_eq!(
            cache.status_at(HOUR_MS),
            CacheStatus::Fresh {
                items: 1,
                age_ms: HOUR_MS
            }
        );
        assert!(matches!(
            cache.status_at(25 * HOUR_MS),
            CacheStatus::Expired { items: 1, .. }
        ));

        cache.clear().unwrap();
        assert_eq!(cache.status_at(HOUR_MS), CacheStatus::Missing);
    }
}
