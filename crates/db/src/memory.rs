//! In-process [`RecordStore`] holding the whole tree in one JSON value.
//!
//! Used by the test suites and by `RECORD_STORE=memory` for local runs.
//! Every call takes the lock once, so each call is atomic.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::store::{join_path, split_path, strip_nulls, RecordStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    root: RwLock<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from a JSON document. Anything but an object yields
    /// an empty store.
    pub fn from_json(value: Value) -> Self {
        let root = match strip_nulls(value) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            root: RwLock::new(root),
        }
    }

    /// Copy of the entire tree.
    pub async fn snapshot(&self) -> Value {
        Value::Object(self.root.read().await.clone())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let segments = split_path(path)?;
        let root = self.root.read().await;
        Ok(lookup(&root, &segments).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let segments = split_path(path)?;
        let mut root = self.root.write().await;
        write_at(&mut root, &segments, value);
        Ok(())
    }

    async fn update(&self, base: &str, entries: BTreeMap<String, Value>) -> Result<(), StoreError> {
        split_path(base)?;
        let paths = entries
            .keys()
            .map(|rel| join_path(base, rel))
            .collect::<Vec<_>>();
        // Validate everything before the first mutation.
        let segments = paths
            .iter()
            .map(|p| split_path(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut root = self.root.write().await;
        for (segs, value) in segments.iter().zip(entries.into_values()) {
            write_at(&mut root, segs, value);
        }
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let segments = split_path(path)?;
        let mut root = self.root.write().await;
        remove_at(&mut root, &segments);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tree operations
// ---------------------------------------------------------------------------

fn lookup<'a>(map: &'a Map<String, Value>, segments: &[&str]) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    let child = map.get(*first)?;
    if rest.is_empty() {
        return Some(child);
    }
    match child {
        Value::Object(inner) => lookup(inner, rest),
        _ => None,
    }
}

fn write_at(root: &mut Map<String, Value>, segments: &[&str], value: Value) {
    if value.is_null() {
        remove_at(root, segments);
        return;
    }

    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut map = root;
    for segment in parents {
        let slot = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        // A scalar on the way down is replaced by an object.
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(inner) = slot else {
            unreachable!("slot was just made an object");
        };
        map = inner;
    }
    map.insert(last.to_string(), strip_nulls(value));
}

/// Remove the value at `segments`, pruning ancestors that end up empty.
/// Returns whether anything was removed.
fn remove_at(map: &mut Map<String, Value>, segments: &[&str]) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return false;
    };
    if rest.is_empty() {
        return map.remove(*first).is_some();
    }

    let Some(Value::Object(child)) = map.get_mut(*first) else {
        return false;
    };
    let removed = remove_at(child, rest);
    if removed && child.is_empty() {
        map.remove(*first);
    }
    removed
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn write_replaces_scalar_parent() {
        let mut root = Map::new();
        write_at(&mut root, &["a"], json!(1));
        write_at(&mut root, &["a", "b"], json!(2));
        assert_eq!(Value::Object(root), json!({"a": {"b": 2}}));
    }

    #[test]
    fn remove_prunes_only_emptied_ancestors() {
        let mut root = json!({"a": {"b": {"c": 1}, "keep": {}}})
            .as_object()
            .cloned()
            .unwrap();
        assert!(remove_at(&mut root, &["a", "b", "c"]));
        assert_eq!(Value::Object(root.clone()), json!({"a": {"keep": {}}}));

        assert!(!remove_at(&mut root, &["a", "keep", "missing"]));
        assert_eq!(Value::Object(root), json!({"a": {"keep": {}}}));
    }
}
