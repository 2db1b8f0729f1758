// src/watch/debounce.rs

//! Pure per-path event coalescing.
//!
//! [`DebounceState`] holds the debounce semantics with no timers or channels
//! of its own; the async loop in [`crate::watch::watcher`] feeds it raw
//! events and sleeps until its next deadline. Keeping the state pure makes
//! the coalescing rules testable without real time.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;

use super::{ChangeEvent, ChangeKind};

#[derive(Debug)]
struct Pending {
    kind: ChangeKind,
    deadline: Instant,
}

/// Per-path pending-event bookkeeping.
///
/// Each raw event (re)arms its path's deadline one quiet window into the
/// future and overwrites the pending kind, so the **last** kind observed
/// within the window is what gets delivered. Distinct paths are independent.
#[derive(Debug)]
pub struct DebounceState {
    window: Duration,
    pending: HashMap<PathBuf, Pending>,
}

impl DebounceState {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
        }
    }

    /// Record a raw event observed at `now`.
    pub fn record(&mut self, path: PathBuf, kind: ChangeKind, now: Instant) {
        self.pending.insert(
            path,
            Pending {
                kind,
                deadline: now + self.window,
            },
        );
    }

    /// Earliest pending deadline, if anything is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    /// Remove and return all events whose quiet window has elapsed at `now`.
    pub fn drain_due(&mut self, now: Instant) -> Vec<ChangeEvent> {
        let due: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(path, _)| path.clone())
            .collect();

        due.into_iter()
            .filter_map(|path| {
                self.pending.remove(&path).map(|p| ChangeEvent {
                    path,
                    kind: p.kind,
                })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
