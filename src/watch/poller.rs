// src/watch/poller.rs

//! Timed full-directory polling fallback.
//!
//! Used when the native notify backend cannot be established. Each tick
//! compares the directory's (path -> mtime) map against the previous tick
//! and synthesizes Created/Modified/Removed events for the differences.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::{ChangeEvent, ChangeKind};

/// Spawn the polling loop. Events go into `raw_tx` (pre-debounce); the loop
/// exits when `shutdown_rx` flips or the receiving side goes away.
pub(crate) fn spawn_poller(
    dir: PathBuf,
    interval: Duration,
    raw_tx: mpsc::UnboundedSender<ChangeEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        let mut seen = match scan_mtimes(&dir) {
            Ok(s) => s,
            Err(err) => {
                warn!(error = %err, dir = ?dir, "initial poll scan failed; starting empty");
                HashMap::new()
            }
        };

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; skip it so the first real
        // comparison happens one full interval after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => break,
                _ = ticker.tick() => {
                    let current = match scan_mtimes(&dir) {
                        Ok(c) => c,
                        Err(err) => {
                            warn!(error = %err, dir = ?dir, "poll scan failed; retrying next tick");
                            continue;
                        }
                    };
                    if !emit_diff(&seen, &current, &raw_tx) {
                        break;
                    }
                    seen = current;
                }
            }
        }
        debug!("poller loop finished");
    });
}

/// Send one event per difference between `old` and `new`.
///
/// Returns `false` when the receiving side is gone and polling should stop.
fn emit_diff(
    old: &HashMap<PathBuf, SystemTime>,
    new: &HashMap<PathBuf, SystemTime>,
    raw_tx: &mpsc::UnboundedSender<ChangeEvent>,
) -> bool {
    for (path, mtime) in new {
        let kind = match old.get(path) {
            None => ChangeKind::Created,
            Some(prev) if prev != mtime => ChangeKind::Modified,
            Some(_) => continue,
        };
        let event = ChangeEvent {
            path: path.clone(),
            kind,
        };
        if raw_tx.send(event).is_err() {
            return false;
        }
    }

    for path in old.keys() {
        if !new.contains_key(path) {
            let event = ChangeEvent {
                path: path.clone(),
                kind: ChangeKind::Removed,
            };
            if raw_tx.send(event).is_err() {
                return false;
            }
        }
    }

    true
}

fn scan_mtimes(dir: &Path) -> std::io::Result<HashMap<PathBuf, SystemTime>> {
    let mut mtimes = HashMap::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "failed to read directory entry while polling");
                continue;
            }
        };
        let path = entry.path();
        let metadata = match entry.metadata() {
            Ok(m) => m,
            // The file may have vanished between read_dir and stat.
            Err(_) => continue,
        };
        if !metadata.is_file() {
            continue;
        }
        let mtime = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        mtimes.insert(path, mtime);
    }
    Ok(mtimes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mtime(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn map(entries: &[(&str, u64)]) -> HashMap<PathBuf, SystemTime> {
        entries
            .iter()
            .map(|(path, secs)| (PathBuf::from(path), mtime(*secs)))
            .collect()
    }

    fn diff(
        old: &HashMap<PathBuf, SystemTime>,
        new: &HashMap<PathBuf, SystemTime>,
    ) -> Vec<ChangeEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(emit_diff(old, new, &tx));
        drop(tx);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events.sort_by(|a, b| a.path.cmp(&b.path));
        events
    }

    #[test]
    fn new_path_is_reported_created() {
        let events = diff(&map(&[]), &map(&[("/dags/a.dag", 1)]));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].path, PathBuf::from("/dags/a.dag"));
        assert_eq!(events[0].kind, ChangeKind::Created);
    }

    #[test]
    fn changed_mtime_is_reported_modified() {
        let events = diff(&map(&[("/dags/a.dag", 1)]), &map(&[("/dags/a.dag", 2)]));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ChangeKind::Modified);
    }

    #[test]
    fn vanished_path_is_reported_removed() {
        let events = diff(&map(&[("/dags/a.dag", 1)]), &map(&[]));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].path, PathBuf::from("/dags/a.dag"));
        assert_eq!(events[0].kind, ChangeKind::Removed);
    }

    #[test]
    fn unchanged_paths_emit_nothing() {
        let snapshot = map(&[("/dags/a.dag", 1), ("/dags/b.dag", 7)]);
        assert!(diff(&snapshot, &snapshot).is_empty());
    }

    #[test]
    fn mixed_tick_reports_each_difference_once() {
        let old = map(&[("/dags/keep.dag", 1), ("/dags/touch.dag", 1), ("/dags/drop.dag", 1)]);
        let new = map(&[("/dags/keep.dag", 1), ("/dags/touch.dag", 5), ("/dags/new.dag", 9)]);

        let events = diff(&old, &new);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].path, PathBuf::from("/dags/drop.dag"));
        assert_eq!(events[0].kind, ChangeKind::Removed);
        assert_eq!(events[1].path, PathBuf::from("/dags/new.dag"));
        assert_eq!(events[1].kind, ChangeKind::Created);
        assert_eq!(events[2].path, PathBuf::from("/dags/touch.dag"));
        assert_eq!(events[2].kind, ChangeKind::Modified);
    }

    #[test]
    fn diff_stops_when_the_receiver_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        assert!(!emit_diff(&map(&[]), &map(&[("/dags/a.dag", 1)]), &tx));
    }

    #[test]
    fn scan_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.dag"), "name a\n").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let mtimes = scan_mtimes(dir.path()).unwrap();
        assert_eq!(mtimes.len(), 1);
        assert!(mtimes.contains_key(&dir.path().join("a.dag")));
    }
}
