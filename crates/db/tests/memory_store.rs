//! Record store semantics against the in-memory backend.

use std::collections::BTreeMap;

use assert_matches::assert_matches;
use serde_json::json;

use ipa_db::{MemoryStore, RecordStore, StoreError};

#[tokio::test]
async fn set_then_get_subtree() {
    let store = MemoryStore::new();
    store
        .set("proyectos/b1/k1", json!({"alumno": "Ana", "proyectos": {}}))
        .await
        .unwrap();

    assert_eq!(
        store.get("proyectos").await.unwrap(),
        Some(json!({"b1": {"k1": {"alumno": "Ana", "proyectos": {}}}}))
    );
    assert_eq!(
        store.get("proyectos/b1/k1/alumno").await.unwrap(),
        Some(json!("Ana"))
    );
    assert_eq!(store.get("proyectos/b2").await.unwrap(), None);
}

#[tokio::test]
async fn set_replaces_whole_subtree() {
    let store = MemoryStore::from_json(json!({"a": {"b": {"x": 1, "y": 2}}}));
    store.set("a/b", json!({"z": 3})).await.unwrap();
    assert_eq!(store.snapshot().await, json!({"a": {"b": {"z": 3}}}));
}

#[tokio::test]
async fn set_null_removes() {
    let store = MemoryStore::from_json(json!({"a": {"b": 1, "c": 2}}));
    store.set("a/b", serde_json::Value::Null).await.unwrap();
    assert_eq!(store.snapshot().await, json!({"a": {"c": 2}}));
}

#[tokio::test]
async fn remove_last_child_prunes_parents() {
    let store = MemoryStore::from_json(json!({
        "proyectos": {"b1": {"k1": {"alumno": "Ana"}}},
        "usuarios": {"u": {"rol": "Admin"}}
    }));

    store.remove("proyectos/b1/k1").await.unwrap();

    assert_eq!(store.get("proyectos").await.unwrap(), None);
    assert_eq!(store.snapshot().await, json!({"usuarios": {"u": {"rol": "Admin"}}}));
}

#[tokio::test]
async fn remove_missing_is_noop() {
    let store = MemoryStore::from_json(json!({"a": {"b": 1}}));
    store.remove("a/zz").await.unwrap();
    store.remove("nothing/here").await.unwrap();
    assert_eq!(store.snapshot().await, json!({"a": {"b": 1}}));
}

#[tokio::test]
async fn update_applies_relative_entries() {
    let store = MemoryStore::from_json(json!({"b": {"old": 1, "gone": 2}}));
    let entries = BTreeMap::from([
        ("new/x".to_string(), json!(10)),
        ("old".to_string(), json!({"v": 1})),
        ("gone".to_string(), serde_json::Value::Null),
    ]);
    store.update("b", entries).await.unwrap();

    assert_eq!(
        store.snapshot().await,
        json!({"b": {"new": {"x": 10}, "old": {"v": 1}}})
    );
}

#[tokio::test]
async fn update_with_bad_key_writes_nothing() {
    let store = MemoryStore::from_json(json!({"b": {"a": 1}}));
    let entries = BTreeMap::from([
        ("fine".to_string(), json!(1)),
        ("bad.key".to_string(), json!(2)),
    ]);

    assert_matches!(
        store.update("b", entries).await,
        Err(StoreError::InvalidPath { .. })
    );
    assert_eq!(store.snapshot().await, json!({"b": {"a": 1}}));
}

#[tokio::test]
async fn invalid_paths_are_rejected() {
    let store = MemoryStore::new();
    assert_matches!(store.get("").await, Err(StoreError::InvalidPath { .. }));
    assert_matches!(
        store.set("usuarios/ana@ipa.cat", json!(1)).await,
        Err(StoreError::InvalidPath { .. })
    );
    assert_matches!(store.remove("a//b").await, Err(StoreError::InvalidPath { .. }));
}

#[tokio::test]
async fn nulls_inside_values_are_dropped() {
    let store = MemoryStore::new();
    store.set("r", json!({"a": 1, "b": null})).await.unwrap();
    assert_eq!(store.get("r").await.unwrap(), Some(json!({"a": 1})));
}
