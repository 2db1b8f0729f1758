// src/watch/mod.rs

//! Debounced filesystem change watching.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`), with a timed
//!   polling fallback when native notification cannot be established.
//! - Coalescing rapid successive events per path into a single delivered
//!   event after a quiet window (editors that write via temp-file-then-rename
//!   would otherwise cause reload storms).
//!
//! It does **not** know about the registry or workflow definitions; it only
//! turns raw filesystem activity into [`ChangeEvent`]s.

pub mod debounce;
pub mod poller;
pub mod watcher;

pub use debounce::DebounceState;
pub use watcher::{spawn_watcher, WatcherHandle, WatcherOptions};

use std::path::PathBuf;

/// Kind of filesystem change, normalized across backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
    Renamed,
}

/// A coalesced filesystem change delivered to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}
