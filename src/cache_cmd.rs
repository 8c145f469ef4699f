//! `grocer cache status` and `grocer cache clear`.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};

use grocer_core::cache::{now_ms, CacheStatus, CatalogCache, CACHE_TTL_MS};

use crate::config::Config;
use crate::file_store::FileStore;

fn format_age(ms: i64) -> String {
    let mins = ms.max(0) / 60_000;
    format!("{}h {}m", mins / 60, mins % 60)
}

/// Describe a cache status for humans.
pub fn describe(status: &CacheStatus) -> String {
    match status {
        CacheStatus::Missing => "empty".to_string(),
        CacheStatus::Fresh { items, age_ms } => format!(
            "fresh: {} items, fetched {} ago, expires in {}",
            items,
            format_age(*age_ms),
            format_age(CACHE_TTL_MS - age_ms)
        ),
        CacheStatus::Expired { items, age_ms } => format!(
            "expired: {} items, fetched {} ago",
            items,
            format_age(*age_ms)
        ),
    }
}

/// CLI entry point for `grocer cache status`.
pub fn run_cache_status(config: &Config, json: bool) -> Result<()> {
    let cache = CatalogCache::new(FileStore::new(&config.cache.path));
    let now = now_ms();
    let status = cache.status_at(now);
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }
    println!("path:    {}", config.cache.path.display());
    println!("enabled: {}", config.cache.enabled);
    println!("status:  {}", describe(&status));
    if let CacheStatus::Fresh { age_ms, .. } | CacheStatus::Expired { age_ms, .. } = status {
        if let Some(at) = DateTime::<Utc>::from_timestamp_millis(now.saturating_sub(age_ms)) {
            println!("fetched: {}", at.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
    }
    Ok(())
}

/// CLI entry point for `grocer cache clear`.
pub fn run_cache_clear(config: &Config) -> Result<()> {
    let cache = CatalogCache::new(FileStore::new(&config.cache.path));
    cache.clear()?;
    println!("Cache cleared.");
    Ok(())
}
