// tests/debounce_state.rs

//! Deterministic tests for the pure debounce core. Real-clock watcher
//! behaviour is covered separately in `watch_service.rs`.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;

use dagsched::watch::{ChangeKind, DebounceState};

const WINDOW: Duration = Duration::from_millis(500);

fn path(name: &str) -> PathBuf {
    PathBuf::from(format!("/dags/{name}"))
}

#[test]
fn nothing_is_due_before_the_window_elapses() {
    let mut state = DebounceState::new(WINDOW);
    let t0 = Instant::now();

    state.record(path("a.dag"), ChangeKind::Created, t0);

    assert!(state.drain_due(t0 + WINDOW / 2).is_empty());
    assert!(!state.is_empty());
}

#[test]
fn a_quiet_path_is_delivered_once_after_the_window() {
    let mut state = DebounceState::new(WINDOW);
    let t0 = Instant::now();

    state.record(path("a.dag"), ChangeKind::Modified, t0);

    let due = state.drain_due(t0 + WINDOW);
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].kind, ChangeKind::Modified);
    assert_eq!(due[0].path, path("a.dag"));

    // Delivered exactly once.
    assert!(state.drain_due(t0 + WINDOW * 2).is_empty());
    assert!(state.is_empty());
}

#[test]
fn last_kind_within_the_window_wins() {
    let mut state = DebounceState::new(WINDOW);
    let t0 = Instant::now();

    state.record(path("a.dag"), ChangeKind::Created, t0);
    state.record(path("a.dag"), ChangeKind::Modified, t0 + Duration::from_millis(10));
    state.record(path("a.dag"), ChangeKind::Removed, t0 + Duration::from_millis(20));

    let due = state.drain_due(t0 + Duration::from_millis(20) + WINDOW);
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].kind, ChangeKind::Removed);
}

#[test]
fn a_new_event_resets_the_paths_deadline() {
    let mut state = DebounceState::new(WINDOW);
    let t0 = Instant::now();

    state.record(path("a.dag"), ChangeKind::Created, t0);
    // Just before the first deadline, another event arrives.
    let t1 = t0 + WINDOW - Duration::from_millis(1);
    state.record(path("a.dag"), ChangeKind::Modified, t1);

    // The original deadline has passed but the window was re-armed.
    assert!(state.drain_due(t0 + WINDOW).is_empty());

    let due = state.drain_due(t1 + WINDOW);
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].kind, ChangeKind::Modified);
}

#[test]
fn distinct_paths_are_debounced_independently() {
    let mut state = DebounceState::new(WINDOW);
    let t0 = Instant::now();

    state.record(path("a.dag"), ChangeKind::Created, t0);
    state.record(path("b.dag"), ChangeKind::Removed, t0 + Duration::from_millis(100));

    // Only a.dag has gone quiet for a full window at this point.
    let due = state.drain_due(t0 + WINDOW);
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].path, path("a.dag"));

    let due = state.drain_due(t0 + Duration::from_millis(100) + WINDOW);
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].path, path("b.dag"));
}

#[test]
fn next_deadline_tracks_the_earliest_pending_path() {
    let mut state = DebounceState::new(WINDOW);
    let t0 = Instant::now();

    assert!(state.next_deadline().is_none());

    state.record(path("b.dag"), ChangeKind::Created, t0 + Duration::from_millis(50));
    state.record(path("a.dag"), ChangeKind::Created, t0);

    assert_eq!(state.next_deadline(), Some(t0 + WINDOW));
}
