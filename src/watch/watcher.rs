// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::{DagschedError, Result};
use crate::watch::debounce::DebounceState;
use crate::watch::poller::spawn_poller;
use crate::watch::{ChangeEvent, ChangeKind};

/// Tunables for [`spawn_watcher`].
#[derive(Debug, Clone, Copy)]
pub struct WatcherOptions {
    /// Quiet window for per-path event coalescing.
    pub debounce_window: Duration,
    /// Poll interval for the fallback backend.
    pub poll_interval: Duration,
}

impl Default for WatcherOptions {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_millis(500),
            poll_interval: Duration::from_secs(60),
        }
    }
}

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive (when the native backend
/// is in use). [`close`](WatcherHandle::close) — or dropping the handle —
/// stops event delivery and releases native handles and timers.
pub struct WatcherHandle {
    native: Option<RecommendedWatcher>,
    shutdown_tx: watch::Sender<bool>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("native", &self.native.is_some())
            .finish()
    }
}

impl WatcherHandle {
    /// Stop event delivery. Idempotent, and safe to call whether or not the
    /// consuming loop is currently receiving.
    pub fn close(&mut self) {
        let _ = self.shutdown_tx.send(true);
        // Dropping the native watcher releases its OS handles now rather
        // than whenever the handle itself is dropped.
        self.native = None;
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Spawn a debounced filesystem watcher over `dir`.
///
/// Tries the native notify backend first; if it cannot be established the
/// timed polling fallback is used instead. A missing directory is a fatal
/// setup error either way.
///
/// Returns the handle plus the channel on which coalesced [`ChangeEvent`]s
/// are delivered. Delivery is unordered across distinct paths; per-path
/// ordering is preserved.
pub fn spawn_watcher(
    dir: impl Into<PathBuf>,
    options: WatcherOptions,
) -> Result<(WatcherHandle, mpsc::Receiver<ChangeEvent>)> {
    let dir = dir.into();
    if !dir.is_dir() {
        return Err(DagschedError::ConfigError(format!(
            "watch directory {:?} does not exist or is not a directory",
            dir
        )));
    }

    // Channel from the blocking notify callback (or the poller) into the
    // debounce loop.
    let (raw_tx, raw_rx) = mpsc::unbounded_channel::<ChangeEvent>();
    let (out_tx, out_rx) = mpsc::channel::<ChangeEvent>(64);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let native = match native_watcher(&dir, raw_tx.clone()) {
        Ok(w) => Some(w),
        Err(err) => {
            warn!(
                error = %err,
                dir = ?dir,
                "native file notification unavailable; falling back to polling"
            );
            spawn_poller(
                dir.clone(),
                options.poll_interval,
                raw_tx.clone(),
                shutdown_rx.clone(),
            );
            None
        }
    };

    spawn_debounce_loop(raw_rx, out_tx, shutdown_rx, options.debounce_window);

    info!(dir = ?dir, native = native.is_some(), "file watcher started");

    Ok((
        WatcherHandle {
            native,
            shutdown_tx,
        },
        out_rx,
    ))
}

/// Build the native notify watcher, forwarding its events into `raw_tx`.
fn native_watcher(
    dir: &Path,
    raw_tx: mpsc::UnboundedSender<ChangeEvent>,
) -> notify::Result<RecommendedWatcher> {
    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for change in normalize_event(event) {
                    if raw_tx.send(change).is_err() {
                        // Debounce loop is gone; nothing useful to do here.
                        return;
                    }
                }
            }
            Err(err) => {
                // We can't log via tracing here easily, so fallback to stderr.
                // Transport errors are not fatal; the stream keeps running.
                eprintln!("dagsched: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

/// Normalize one notify event into per-path [`ChangeEvent`]s.
///
/// Renames need path-level treatment, not just kind-level: on Linux an
/// in-directory rename arrives as a single `Modify(Name(Both))` event
/// carrying `[from, to]`, and the two paths mean opposite things. The
/// rename-away side behaves like a removal of that name; the destination
/// is a creation.
fn normalize_event(event: Event) -> Vec<ChangeEvent> {
    let kind = match event.kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Remove(_) => ChangeKind::Removed,
        EventKind::Modify(ModifyKind::Name(mode)) => {
            return normalize_rename(mode, event.paths);
        }
        EventKind::Modify(_) => ChangeKind::Modified,
        _ => return Vec::new(),
    };
    event
        .paths
        .into_iter()
        .map(|path| ChangeEvent { path, kind })
        .collect()
}

/// Split a rename event into per-path changes.
///
/// `Both` pairs `[from, to]` in path order. `Any`/`Other` (and a malformed
/// `Both`) don't say which side each path is, so the filesystem is asked: a
/// path that still exists was renamed to, one that doesn't was renamed away.
fn normalize_rename(mode: RenameMode, paths: Vec<PathBuf>) -> Vec<ChangeEvent> {
    match mode {
        RenameMode::From => paths
            .into_iter()
            .map(|path| ChangeEvent {
                path,
                kind: ChangeKind::Renamed,
            })
            .collect(),
        RenameMode::To => paths
            .into_iter()
            .map(|path| ChangeEvent {
                path,
                kind: ChangeKind::Created,
            })
            .collect(),
        RenameMode::Both if paths.len() == 2 => {
            let mut iter = paths.into_iter();
            let mut changes = Vec::with_capacity(2);
            if let Some(path) = iter.next() {
                changes.push(ChangeEvent {
                    path,
                    kind: ChangeKind::Renamed,
                });
            }
            if let Some(path) = iter.next() {
                changes.push(ChangeEvent {
                    path,
                    kind: ChangeKind::Created,
                });
            }
            changes
        }
        _ => paths
            .into_iter()
            .map(|path| {
                let kind = if path.exists() {
                    ChangeKind::Created
                } else {
                    ChangeKind::Renamed
                };
                ChangeEvent { path, kind }
            })
            .collect(),
    }
}

/// Async loop that owns the [`DebounceState`]: records raw events, sleeps
/// until the earliest pending deadline, and delivers whatever has gone quiet.
fn spawn_debounce_loop(
    mut raw_rx: mpsc::UnboundedReceiver<ChangeEvent>,
    out_tx: mpsc::Sender<ChangeEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
    window: Duration,
) {
    tokio::spawn(async move {
        let mut state = DebounceState::new(window);

        loop {
            let deadline = state.next_deadline();

            tokio::select! {
                _ = shutdown_rx.changed() => {
                    debug!("watcher closed; stopping debounce loop");
                    break;
                }
                raw = raw_rx.recv() => match raw {
                    Some(event) => {
                        debug!(?event, "received raw filesystem event");
                        state.record(event.path, event.kind, Instant::now());
                    }
                    None => {
                        debug!("raw event channel closed; stopping debounce loop");
                        break;
                    }
                },
                _ = sleep_until_opt(deadline) => {
                    for event in state.drain_due(Instant::now()) {
                        debug!(?event, "delivering debounced event");
                        if out_tx.send(event).await.is_err() {
                            debug!("change event receiver dropped; stopping debounce loop");
                            return;
                        }
                    }
                }
            }
        }
    });
}

/// Sleep until `deadline`, or forever when nothing is pending.
async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending().await,
    }
}
