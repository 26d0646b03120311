//! # colkeeper runloop
//!
//! Keeps saved views applied while the host page re-renders.
//!
//! - [`Reapplier`]: bounded reapplication loop with a re-entrancy guard
//!   (`Idle` → `Running` → `Idle`).
//! - [`PageWatcher`]: listens to page events, debounces relevant mutations,
//!   refreshes the observed roots and triggers the reapplier.
//!
//! A run never exceeds `scheduler.max_iterations` iterations, whatever the
//! page does. A trigger while a run is active is ignored.

mod reapplier;
mod watcher;

pub use reapplier::{Reapplier, RunReport, SchedulerState};
pub use tokio_util::sync::CancellationToken;
pub use watcher::{PageWatcher, WatcherHandle, is_relevant};
