//! SQLite view store for colkeeper.
//!
//! Persists saved views, analysis caches and suggestion decisions in a
//! single key-value table.

mod schema;
mod store;

pub use store::SqliteViewStore;
