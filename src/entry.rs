// src/entry.rs

//! Schedule entries and their production from a registry snapshot.
//!
//! An [`Entry`] is the spec'd "action": one due schedule occurrence for one
//! workflow, carrying the kind (start/stop/restart), the concrete timestamp
//! it was computed for, and the job handle to dispatch to. Entries are
//! produced fresh on every tick and consumed immediately by the caller.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::errors::Result;
use crate::head::WorkflowHead;
use crate::schedule::ScheduleExpr;

/// What an entry asks its job to do when invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Start,
    Stop,
    Restart,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryKind::Start => "start",
            EntryKind::Stop => "stop",
            EntryKind::Restart => "restart",
        };
        write!(f, "{s}")
    }
}

/// Handle to a runnable workflow.
///
/// Constructed externally (via [`JobFactory`]) from a [`WorkflowHead`] plus
/// whatever ambient configuration the embedding process carries; this crate
/// only holds and invokes it.
pub trait Job: Send + Sync {
    fn start(&self) -> Result<()>;
    fn stop(&self) -> Result<()>;
    fn restart(&self) -> Result<()>;
    /// Identity used in audit log lines.
    fn name(&self) -> &str;
}

/// Builds the job handle attached to each produced entry.
pub trait JobFactory: Send + Sync {
    fn job_for(&self, head: &WorkflowHead, next: DateTime<Utc>) -> Arc<dyn Job>;
}

/// Per-workflow suspension predicate.
///
/// Consulted once per registry entry per production call; must be cheap
/// (file-existence-class cost) and must never block on the network.
pub trait SuspendChecker: Send + Sync {
    fn is_suspended(&self, name: &str) -> bool;
}

/// One due schedule occurrence for a workflow.
#[derive(Clone)]
pub struct Entry {
    /// Workflow identity.
    pub name: String,
    pub kind: EntryKind,
    /// The occurrence this entry was computed for.
    pub next: DateTime<Utc>,
    pub job: Option<Arc<dyn Job>>,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("next", &self.next)
            .field("job", &self.job.is_some())
            .finish()
    }
}

impl Entry {
    /// Dispatch this entry to its job.
    ///
    /// A missing job handle is a no-op `Ok(())`. Otherwise an audit line is
    /// logged before delegating, and the job's error (if any) is returned
    /// unmodified.
    pub fn invoke(&self) -> Result<()> {
        let Some(job) = &self.job else {
            return Ok(());
        };

        info!(
            at = %self.next.format("%Y-%m-%d %H:%M:%S"),
            kind = %self.kind,
            workflow = %job.name(),
            "invoking schedule entry"
        );

        match self.kind {
            EntryKind::Start => job.start(),
            EntryKind::Stop => job.stop(),
            EntryKind::Restart => job.restart(),
        }
    }
}

/// Produce the entries due relative to `now` from a registry snapshot.
///
/// Suspended workflows are skipped entirely. Otherwise one entry is emitted
/// per schedule expression across the three groups; an expression with no
/// future occurrence emits nothing and never aborts the batch. No ordering
/// or deduplication is imposed.
///
/// Pure over the snapshot: no mutation, no I/O, safe to call concurrently
/// with registry mutation.
pub fn produce(
    now: DateTime<Utc>,
    snapshot: &[(String, WorkflowHead)],
    suspend: &dyn SuspendChecker,
    jobs: &dyn JobFactory,
) -> Vec<Entry> {
    let mut entries = Vec::new();

    for (_file, head) in snapshot {
        if suspend.is_suspended(&head.name) {
            debug!(workflow = %head.name, "workflow suspended; skipping");
            continue;
        }

        let groups: [(&[ScheduleExpr], EntryKind); 3] = [
            (&head.start, EntryKind::Start),
            (&head.stop, EntryKind::Stop),
            (&head.restart, EntryKind::Restart),
        ];

        for (exprs, kind) in groups {
            for expr in exprs {
                let Some(next) = expr.next_after(now) else {
                    debug!(
                        workflow = %head.name,
                        expr = %expr,
                        "expression has no future occurrence; skipping"
                    );
                    continue;
                };
                entries.push(Entry {
                    name: head.name.clone(),
                    kind,
                    next,
                    job: Some(jobs.job_for(head, next)),
                });
            }
        }
    }

    entries
}
