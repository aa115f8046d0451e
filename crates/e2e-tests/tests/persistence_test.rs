//! End-to-end persistence tests: persist, reload, and eager mapping.

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;

use e2e_tests::{arange, random_vector, stack, TestHarness};
use seek_store::{GroupedVectorStore, HnswIndex, IndexDefaults, IndexOverrides, VectorError};
use seek_types::DistanceSpace;

#[test]
fn test_save_in_temp_dir() {
    let harness = TestHarness::new();
    let mut store = harness.store();

    store.insert("group", 2, &arange(10, 0.0)).unwrap();
    store.insert("group", 200, &arange(10, 1.0)).unwrap();
    store.persist(&harness.store_dir).unwrap();

    let reloaded = harness.reloaded_store();
    assert_eq!(
        store.fetch("group", 2).unwrap(),
        reloaded.fetch("group", 2).unwrap()
    );
}

#[test]
fn test_round_trip_every_group_and_id() {
    let harness = TestHarness::new();
    let mut store = harness.store();

    let mut inserted: BTreeMap<(String, u64), Vec<f32>> = BTreeMap::new();
    for (group, dim) in [("users", 16), ("items", 8), ("tags", 3)] {
        for id in 0..20u64 {
            let vector = random_vector(dim);
            store.insert(group, id * 3, &vector).unwrap();
            inserted.insert((group.to_string(), id * 3), vector);
        }
    }
    assert_eq!(store.persist(&harness.store_dir).unwrap(), 3);

    let reloaded = harness.reloaded_store();
    assert_eq!(reloaded.groups(), vec!["items", "tags", "users"]);
    for ((group, id), vector) in &inserted {
        assert_eq!(reloaded.fetch(group, *id).unwrap().as_ref(), Some(vector));
        assert_eq!(
            reloaded.fetch(group, *id).unwrap(),
            store.fetch(group, *id).unwrap()
        );
    }
}

#[test]
fn test_config_survives_reload() {
    let harness = TestHarness::new();
    let mut store = harness.store();

    let overrides = IndexOverrides::default()
        .with_space(DistanceSpace::Cosine)
        .with_ef_construction(64)
        .with_connectivity(8);
    store
        .insert_with_config("g", 1, &[0.6, 0.8], &overrides)
        .unwrap();
    store.persist(&harness.store_dir).unwrap();

    let reloaded = harness.reloaded_store();
    assert_eq!(reloaded.group_config("g").unwrap(), store.group_config("g").unwrap());
}

#[test]
fn test_reload_twice_is_idempotent() {
    let harness = TestHarness::new();
    let mut store = harness.store();
    store
        .insert_batch("g", &[2, 200], &stack(&[arange(4, 0.0), arange(4, 4.0)]))
        .unwrap();
    store.persist(&harness.store_dir).unwrap();

    let once = harness.reloaded_store();

    let mut twice = harness.store();
    twice.reload(&harness.store_dir).unwrap();
    twice.reload(&harness.store_dir).unwrap();

    assert_eq!(once.groups(), twice.groups());
    assert_eq!(
        once.fetch_batch("g", &[2, 200]).unwrap(),
        twice.fetch_batch("g", &[2, 200]).unwrap()
    );
    assert_eq!(twice.stats("g").unwrap().vector_count, 2);
}

#[test]
fn test_reload_keeps_groups_not_on_disk() {
    let harness = TestHarness::new();

    let mut saved = harness.store();
    saved.insert("disk", 1, &arange(3, 0.0)).unwrap();
    saved.persist(&harness.store_dir).unwrap();

    let mut store = harness.store();
    store.insert("memory", 5, &arange(2, 9.0)).unwrap();
    store.insert("disk", 1, &arange(3, 50.0)).unwrap();
    let loaded = store.reload(&harness.store_dir).unwrap();

    assert_eq!(loaded, vec!["disk".to_string()]);
    assert_eq!(store.groups(), vec!["disk", "memory"]);
    assert_eq!(store.fetch("memory", 5).unwrap(), Some(arange(2, 9.0)));
    // Same-named group is replaced by the on-disk version
    assert_eq!(store.fetch("disk", 1).unwrap(), Some(arange(3, 0.0)));
}

#[test]
fn test_persist_overwrites_previous_files() {
    let harness = TestHarness::new();
    let mut store = harness.store();

    store.insert("g", 1, &arange(3, 0.0)).unwrap();
    store.persist(&harness.store_dir).unwrap();
    store.insert("g", 2, &arange(3, 1.0)).unwrap();
    store.persist(&harness.store_dir).unwrap();

    let reloaded = harness.reloaded_store();
    assert_eq!(reloaded.stats("g").unwrap().vector_count, 2);
    assert_eq!(reloaded.fetch("g", 2).unwrap(), Some(arange(3, 1.0)));

    let files: Vec<_> = std::fs::read_dir(&harness.store_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(files, vec!["g.idx".to_string()]);
}

#[test]
fn test_eager_mapping_at_construction() {
    let harness = TestHarness::new();
    let mut store = harness.store();
    store.insert("users", 3, &arange(4, 2.0)).unwrap();
    store.persist(&harness.store_dir).unwrap();

    let mut mapping = BTreeMap::new();
    mapping.insert("users".to_string(), harness.store_dir.join("users.idx"));
    let mapped: GroupedVectorStore<HnswIndex> =
        GroupedVectorStore::with_mapping(IndexDefaults::default(), mapping).unwrap();

    assert_eq!(mapped.fetch("users", 3).unwrap(), Some(arange(4, 2.0)));
}

#[test]
fn test_reload_then_insert_keeps_dimension() {
    let harness = TestHarness::new();
    let mut store = harness.store();
    store.insert("g", 1, &arange(6, 0.0)).unwrap();
    store.persist(&harness.store_dir).unwrap();

    let mut reloaded = harness.reloaded_store();
    reloaded.insert("g", 2, &arange(6, 1.0)).unwrap();
    let result = reloaded.insert("g", 3, &arange(7, 0.0));
    assert!(matches!(
        result,
        Err(VectorError::DimensionMismatch {
            expected: 6,
            actual: 7
        })
    ));
}
