//! # Grocer
//!
//! A terminal front end for a grocery catalog service and a recipe
//! generation service.
//!
//! The catalog is fetched once, cached locally for 24 hours, and then
//! filtered, grouped by store chain, and paginated entirely client-side by
//! the [`grocer_core`] engine. Selected items can be sent to the recipe
//! service, which answers with a structured recipe.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Catalog API  │──▶│   Session    │──▶│  CLI render  │
//! │  (reqwest)   │   │ engine+cache │   │ text / JSON  │
//! └──────────────┘   └──────┬───────┘   └──────────────┘
//!                           │
//!                           ▼
//!                    ┌──────────────┐
//!                    │  Recipe API  │
//!                    └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Fetch and recipe request errors |
//! | [`catalog`] | Catalog HTTP client |
//! | [`llm`] | Recipe HTTP client |
//! | [`file_store`] | File-backed key/value store for the cache |
//! | [`session`] | Engine, selection, cache, and recipe panel in one place |
//! | [`render`] | Plain-text output |
//! | [`browse`] | `browse` and `options` commands |
//! | [`get`] | `get` and `lookup` commands |
//! | [`recipe`] | `recipe` command |
//! | [`cache_cmd`] | `cache status` and `cache clear` commands |

pub mod browse;
pub mod cache_cmd;
pub mod catalog;
pub mod config;
pub mod error;
pub mod file_store;
pub mod get;
pub mod llm;
pub mod recipe;
pub mod render;
pub mod session;
