// tests/scan_behaviour.rs

use std::error::Error;
use std::fs;

use dagsched_test_utils::fakes::LineLoader;
use dagsched_test_utils::init_tracing;

use dagsched::Registry;

type TestResult = Result<(), Box<dyn Error>>;

fn extensions() -> Vec<String> {
    vec!["dag".to_string()]
}

#[test]
fn scan_populates_valid_and_skips_malformed() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("a.dag"), "name a\nstart * * * * *\n")?;
    fs::write(dir.path().join("b.dag"), "name b\nstop 0 0 * * *\n")?;
    fs::write(dir.path().join("broken.dag"), "!!! not a definition\n")?;
    // Wrong extension: must be ignored entirely, not treated as malformed.
    fs::write(dir.path().join("notes.txt"), "just some notes\n")?;

    let registry = Registry::new();
    registry.scan(dir.path(), &LineLoader, &extensions())?;

    let mut keys: Vec<String> = registry
        .snapshot()
        .into_iter()
        .map(|(k, _)| k)
        .collect();
    keys.sort();
    assert_eq!(keys, vec!["a.dag".to_string(), "b.dag".to_string()]);

    Ok(())
}

#[test]
fn scan_of_missing_directory_is_fatal() {
    init_tracing();

    let registry = Registry::new();
    let result = registry.scan(
        std::path::Path::new("/nonexistent/dagsched-test-dir"),
        &LineLoader,
        &extensions(),
    );

    assert!(result.is_err());
    assert!(registry.is_empty());
}

#[test]
fn scan_matches_extensions_case_insensitively() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("upper.DAG"), "name upper\nstart 0 * * * *\n")?;

    let registry = Registry::new();
    registry.scan(dir.path(), &LineLoader, &extensions())?;

    assert_eq!(registry.len(), 1);
    Ok(())
}

#[test]
fn rescan_replaces_entries_wholesale() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("a.dag");
    fs::write(&path, "name a\nstart * * * * *\n")?;

    let registry = Registry::new();
    registry.scan(dir.path(), &LineLoader, &extensions())?;

    fs::write(&path, "name a\nstart * * * * *\nstop 0 0 * * *\n")?;
    registry.scan(dir.path(), &LineLoader, &extensions())?;

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.len(), 1);
    let (_, head) = &snapshot[0];
    assert_eq!(head.start.len(), 1);
    assert_eq!(head.stop.len(), 1);

    Ok(())
}
