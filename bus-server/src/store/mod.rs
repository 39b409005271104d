//! Schedule storage.
//!
//! The search core reads stops, buses and trips through the `TripStore`
//! trait. This module provides the SQLite implementation used in
//! production, an in-memory one for tests and demos, and a caching
//! wrapper for reference data.

mod cache;
mod config;
mod dataset;
mod error;
mod memory;
mod schema;
mod sqlite;

pub use cache::{CacheConfig, CachedStore};
pub use config::StoreConfig;
pub use dataset::{Dataset, slug};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use schema::{create_schema, import};
pub use sqlite::SqliteStore;
