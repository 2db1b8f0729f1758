// src/lib.rs

//! `dagsched` — the scheduling front-end of a workflow orchestrator.
//!
//! Watches a directory of workflow ("DAG") definition files, keeps a
//! concurrently-readable registry of their schedule heads, and on each tick
//! produces the due start/stop/restart entries, honoring a per-workflow
//! suspension flag. Executing workflows, parsing full definitions, and the
//! outer tick loop are the embedding process's business, reached through the
//! [`DefinitionLoader`], [`SuspendChecker`], [`JobFactory`] and [`Job`]
//! seams.

pub mod config;
pub mod entry;
pub mod errors;
pub mod head;
pub mod logging;
pub mod registry;
pub mod schedule;
pub mod service;
pub mod watch;

pub use config::SchedulerConfig;
pub use entry::{produce, Entry, EntryKind, Job, JobFactory, SuspendChecker};
pub use errors::{DagschedError, Result};
pub use head::{base_name, matches_extension, DefinitionLoader, WorkflowHead};
pub use registry::Registry;
pub use schedule::ScheduleExpr;
pub use service::EntryService;
pub use watch::{spawn_watcher, ChangeEvent, ChangeKind, WatcherHandle, WatcherOptions};
