mod common;

use common::{read, registry_at, CountingRefresh, StubLiveness};
use std::fs;
use std::sync::Arc;
use tim::prelude::*;

#[test]
fn upsert_prunes_dead_and_keeps_live_entries_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timers.org");
    fs::write(&path, "100 foo\n200 bar\n").unwrap();

    let liveness = StubLiveness::with(&[200, 300]);
    let registry = registry_at(&path, 300, liveness, Arc::new(CountingRefresh::default()));
    registry.upsert_self("baz").unwrap();

    assert_eq!(read(&path), "200 bar\n300 baz\n");
}

#[test]
fn upsert_never_removes_a_live_neighbour() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timers.org");
    let liveness = StubLiveness::with(&[1, 2]);
    let refresh = Arc::new(CountingRefresh::default());

    let first = registry_at(&path, 1, liveness.clone(), refresh.clone());
    let second = registry_at(&path, 2, liveness.clone(), refresh.clone());

    first.upsert_self("501").unwrap();
    second.upsert_self("tea 300").unwrap();
    first.upsert_self("459").unwrap();
    assert_eq!(read(&path), "2 tea 300\n1 459\n");

    liveness.kill(2);
    first.upsert_self("456").unwrap();
    assert_eq!(read(&path), "1 456\n");
}

#[test]
fn remove_self_twice_is_a_no_op_the_second_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timers.org");
    fs::write(&path, "200 bar\n300 baz\n").unwrap();

    let liveness = StubLiveness::with(&[200, 300]);
    let registry = registry_at(&path, 300, liveness, Arc::new(CountingRefresh::default()));

    registry.remove_self().unwrap();
    let after_first = read(&path);
    assert_eq!(after_first, "200 bar\n");

    registry.remove_self().unwrap();
    assert_eq!(read(&path), after_first);
}

#[test]
fn first_non_empty_write_refreshes_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timers.org");
    let refresh = Arc::new(CountingRefresh::default());
    let registry = registry_at(&path, 7, StubLiveness::with(&[7]), refresh.clone());

    registry.upsert_self("").unwrap();
    assert_eq!(refresh.count(), 0);

    registry.upsert_self("501").unwrap();
    registry.upsert_self("459").unwrap();
    registry.upsert_self("456").unwrap();
    assert_eq!(refresh.count(), 1);
}

#[test]
fn every_removal_refreshes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timers.org");
    let refresh = Arc::new(CountingRefresh::default());
    let registry = registry_at(&path, 7, StubLiveness::with(&[7]), refresh.clone());

    registry.remove_self().unwrap();
    registry.remove_self().unwrap();
    assert_eq!(refresh.count(), 2);
}

#[test]
fn missing_registry_is_created_with_its_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".tim").join("timers.org");
    let registry = registry_at(
        &path,
        7,
        StubLiveness::with(&[]),
        Arc::new(CountingRefresh::default()),
    );

    assert!(registry.live_entries().unwrap().is_empty());
    registry.upsert_self("015").unwrap();
    assert_eq!(read(&path), "7 015\n");
}

#[test]
fn unreadable_registry_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be.
    let registry = registry_at(
        dir.path(),
        7,
        StubLiveness::with(&[]),
        Arc::new(CountingRefresh::default()),
    );

    let err = registry.upsert_self("501").unwrap_err();
    assert!(format!("{err:#}").contains("timer registry"));
}

#[test]
fn live_entries_filter_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timers.org");
    let content = "100 foo\n200 tea -003\n";
    fs::write(&path, content).unwrap();

    let registry = registry_at(
        &path,
        999,
        StubLiveness::with(&[200]),
        Arc::new(CountingRefresh::default()),
    );
    let entries = registry.live_entries().unwrap();

    assert_eq!(
        entries,
        vec![TimerEntry {
            pid: Pid(200),
            text: "tea -003".to_string()
        }]
    );
    assert_eq!(read(&path), content);
}
