//! # colkeeper core
//!
//! Finds the tables of a page, gives each a stable identity, reads their
//! columns through whichever API the table exposes, reconciles the live
//! columns with a saved view and writes the result back.
//!
//! ## Pipeline
//!
//! ```text
//! roots ─► locator ─► identity ─► adapters (extract) ─► reconcile ─► adapters (apply)
//!                                        ▲                   ▲
//!                                        └──── ViewEngine ───┴── ViewStore
//! ```

pub mod adapters;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod identity;
pub mod keys;
pub mod locator;
pub mod reconcile;
pub mod roots;
pub mod store;

pub use adapters::{AdapterChain, AdapterError, AdapterKind, TableAdapter};
pub use discovery::{TableDescriptor, describe_tables, primary_table};
pub use engine::{ApplyOutcome, SavedView, ViewEngine};
pub use error::CoreError;
pub use locator::Strategy;
pub use reconcile::{is_applied, reconcile};
pub use store::MemoryViewStore;
