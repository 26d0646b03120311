//! Error types for the colkeeper protocol layer.

mod analysis;
mod storage;

pub use analysis::*;
pub use storage::*;
