// tests/debounce_property.rs

//! Property test for the debounce coalescing rule: any burst of raw events
//! for one path within the window nets to exactly one delivered event whose
//! kind is the last one observed.

use std::path::PathBuf;
use std::time::Duration;

use proptest::prelude::*;
use tokio::time::Instant;

use dagsched::watch::{ChangeKind, DebounceState};

const WINDOW: Duration = Duration::from_millis(500);

fn kind_strategy() -> impl Strategy<Value = ChangeKind> {
    prop_oneof![
        Just(ChangeKind::Created),
        Just(ChangeKind::Modified),
        Just(ChangeKind::Removed),
        Just(ChangeKind::Renamed),
    ]
}

proptest! {
    #[test]
    fn burst_on_one_path_collapses_to_last_kind(
        kinds in proptest::collection::vec(kind_strategy(), 1..20),
        // Gaps between events, each well inside the window.
        gaps_ms in proptest::collection::vec(0u64..100, 1..20),
    ) {
        let mut state = DebounceState::new(WINDOW);
        let path = PathBuf::from("/dags/burst.dag");
        let t0 = Instant::now();

        let mut t = t0;
        let mut last = None;
        for (kind, gap) in kinds.iter().zip(gaps_ms.iter().cycle()) {
            t += Duration::from_millis(*gap);
            state.record(path.clone(), *kind, t);
            last = Some(*kind);
        }

        // Nothing may be delivered while the window is still open.
        prop_assert!(state.drain_due(t + WINDOW - Duration::from_millis(1)).is_empty());

        let due = state.drain_due(t + WINDOW);
        prop_assert_eq!(due.len(), 1);
        prop_assert_eq!(due[0].kind, last.unwrap());
        prop_assert_eq!(&due[0].path, &path);

        // And exactly once.
        prop_assert!(state.drain_due(t + WINDOW * 2).is_empty());
    }

    #[test]
    fn bursts_on_distinct_paths_deliver_one_event_each(
        per_path_kinds in proptest::collection::vec(
            proptest::collection::vec(kind_strategy(), 1..5),
            1..6,
        ),
    ) {
        let mut state = DebounceState::new(WINDOW);
        let t0 = Instant::now();

        for (i, kinds) in per_path_kinds.iter().enumerate() {
            let path = PathBuf::from(format!("/dags/wf{i}.dag"));
            for kind in kinds {
                state.record(path.clone(), *kind, t0);
            }
        }

        let mut due = state.drain_due(t0 + WINDOW);
        due.sort_by(|a, b| a.path.cmp(&b.path));

        prop_assert_eq!(due.len(), per_path_kinds.len());
        for (i, kinds) in per_path_kinds.iter().enumerate() {
            prop_assert_eq!(due[i].kind, *kinds.last().unwrap());
        }
    }
}
