//! # colkeeper protocols
//!
//! Interface definitions shared by every colkeeper crate.
//! Contains only traits, data types and error enums - no implementations.
//!
//! ## Core Traits
//!
//! - [`ViewStore`] - Key-value persistence for saved views and caches
//! - [`PageAnalyzer`] - Remote model that analyzes a reduced page snapshot

pub mod analysis;
pub mod error;
pub mod storage;
pub mod types;

pub use analysis::{
    Analysis, AnalysisPolicy, AnalysisReply, AnalysisRequest, AnalysisSource, ColumnMetadata,
    DomSummaryNode, PageAnalyzer, PageInfo, PageSnapshot, TableMetadata, analysis_cache_key,
};
pub use error::{AnalysisError, StorageError};
pub use storage::ViewStore;
pub use types::*;
