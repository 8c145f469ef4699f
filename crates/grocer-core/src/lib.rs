//! # Grocer Core
//!
//! Shared, I/O-free logic for Grocer: grocery item models, the filter
//! predicate, the chain-grouping/pagination engine, the selection model,
//! the expiring catalog cache, and the request sequencer that guards
//! against stale responses.
//!
//! This crate contains no tokio, reqwest, filesystem I/O, or other
//! native-only dependencies. Storage is reached through the
//! [`cache::KeyValueStore`] trait; the application crate supplies a
//! file-backed implementation and tests use [`cache::memory::InMemoryStore`].

pub mod cache;
pub mod engine;
pub mod filter;
pub mod models;
pub mod selection;
pub mod sequence;
