//! Optimistic concurrency under contention.

use std::thread;

use dcis_core::{EntityStore, MemoryStore, StoreError};
use dcis_domain::{Clearance, Mission};

use crate::test_utils::{init_logging, sample_mission};

#[test]
fn test_stale_write_conflict_carries_current_version() {
    init_logging();
    let store: MemoryStore<Mission> = MemoryStore::new();
    let mission = store
        .insert(&sample_mission("DC-010", Clearance::Alpha), None)
        .unwrap();

    let mut first = mission.clone();
    first.title = "Operation DC-010 (revised)".into();
    let first = store.save(&first, mission.meta.version, None).unwrap();
    assert_eq!(first.meta.version, mission.meta.version + 1);

    // Second writer still holds the pre-revision copy.
    let mut second = mission.clone();
    second.description = "lost update attempt".into();
    let err = store.save(&second, mission.meta.version, None).unwrap_err();
    match err {
        StoreError::Conflict {
            expected, current, ..
        } => {
            assert_eq!(expected, mission.meta.version);
            assert_eq!(current, first.meta.version);
        }
        other => panic!("expected a version conflict, got {other}"),
    }

    // The rejected write changed nothing.
    let stored = store.load(mission.meta.id).unwrap();
    assert_eq!(stored.title, "Operation DC-010 (revised)");
    assert_eq!(stored.description, "");
}

#[test]
fn test_many_racing_writers_one_winner_per_round() {
    init_logging();
    let store: MemoryStore<Mission> = MemoryStore::new();
    let mission = store
        .insert(&sample_mission("DC-011", Clearance::Beta), None)
        .unwrap();

    let rounds = 10;
    let writers = 4;
    for round in 0..rounds {
        let base = store.load(mission.meta.id).unwrap();
        let handles: Vec<_> = (0..writers)
            .map(|writer| {
                let store = store.clone();
                let mut copy = base.clone();
                copy.xp = round * writers + writer;
                let expected = base.meta.version;
                thread::spawn(move || store.save(&copy, expected, None))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1, "round {round} had {wins} winners");
        for loss in results.iter().filter(|r| r.is_err()) {
            assert!(matches!(loss, Err(StoreError::Conflict { .. })));
        }
    }

    // One version bump per round, no lost updates and no extras.
    let stored = store.load(mission.meta.id).unwrap();
    assert_eq!(stored.meta.version, mission.meta.version + rounds as u64);
}

#[test]
fn test_delete_respects_the_same_version_discipline() {
    init_logging();
    let store: MemoryStore<Mission> = MemoryStore::new();
    let mission = store
        .insert(&sample_mission("DC-012", Clearance::Gamma), None)
        .unwrap();

    let mut edited = mission.clone();
    edited.payment = 250;
    store.save(&edited, mission.meta.version, None).unwrap();

    // Deleting with the stale version is rejected like any other write.
    assert!(matches!(
        store.soft_delete(mission.meta.id, mission.meta.version, None),
        Err(StoreError::Conflict { .. })
    ));

    let current = store.load(mission.meta.id).unwrap();
    store
        .soft_delete(mission.meta.id, current.meta.version, None)
        .unwrap();

    // Tombstoned records remain loadable but reject further writes.
    let tombstoned = store.load(mission.meta.id).unwrap();
    assert!(tombstoned.meta.is_deleted());
    assert!(matches!(
        store.soft_delete(mission.meta.id, tombstoned.meta.version, None),
        Err(StoreError::Validation(_))
    ));
}
