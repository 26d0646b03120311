//! # colkeeper dom
//!
//! In-process model of a host web page.
//!
//! A [`Page`] is a cloneable handle over an arena [`Document`]. Elements can
//! carry shadow roots, live object properties and a bound grid-library
//! instance ([`GridInstance`]). Every structural or attribute change is
//! published as a [`PageEvent`] so observers can react the way a page-level
//! mutation observer would.
//!
//! [`NodeId`] values are transient handles: valid for the page that issued
//! them, never meaningful across pages or runs.

mod document;
mod document_query;
mod error;
mod event;
mod grid;
mod html;
mod node;
mod page;
mod serialize;

pub use document::Document;
pub use document_query::collapse_whitespace;
pub use error::DomError;
pub use event::{MutationKind, MutationRecord, PageEvent};
pub use grid::{GridColumn, GridError, GridInstance, InMemoryColumn, InMemoryGrid};
pub use node::{ElementData, NodeId, NodeKind};
pub use page::Page;
