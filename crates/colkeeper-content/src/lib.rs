//! # colkeeper content
//!
//! The content context of one page: the dispatch entry point used by host
//! surfaces, the page snapshot sent for analysis, and analysis suggestions.
//!
//! ## Actions
//!
//! | Action | Effect |
//! |--------|--------|
//! | `scan` | Columns of the target table, merged with its saved view |
//! | `save_config` | Persist a view and reapply it |
//! | `debug` | Diagnostics of the target table |
//! | `analyze_page` | Remote analysis and derived suggestions |
//! | `preview_suggestion` / `apply_suggestion` / `dismiss_suggestion` | Suggestion workflow |
//! | `restore` | Reapply saved views |
//! | `invert` | Accepted for compatibility, does nothing |

mod action;
mod columns;
mod context;
mod error;
pub mod messages;
pub mod snapshot;
pub mod suggestions;

pub use action::Action;
pub use columns::{merge_saved, parse_saved_columns};
pub use context::ContentContext;
pub use error::ContentError;
pub use suggestions::{DecisionStatus, Suggestion, SuggestionCommand, SuggestionDecision, SuggestionPlan};
