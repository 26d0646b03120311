//! Shared data types.

mod column;
mod saved;

pub use column::*;
pub use saved::*;
