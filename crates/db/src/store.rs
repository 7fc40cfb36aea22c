//! The hierarchical record store contract.
//!
//! Records live in one JSON tree addressed by `/`-separated paths. A
//! backend guarantees atomicity for a single call only: `set` replaces one
//! subtree, `update` applies several relative writes together, and nothing
//! spans two calls.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Characters a path segment may not contain.
pub const FORBIDDEN_PATH_CHARS: &[char] = ipa_core::paths::FORBIDDEN_KEY_CHARS;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("Malformed record at '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A hierarchical key-value store of JSON values.
///
/// Writing `null` removes a path. Removing the last child of an object
/// removes the object as well, walking up until a non-empty ancestor.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read the subtree at `path`, `None` if nothing is stored there.
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the subtree at `path` with `value`.
    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Apply several writes relative to `base` in one atomic call.
    ///
    /// Keys of `entries` are relative paths and may contain `/`. A `null`
    /// entry removes that path.
    async fn update(&self, base: &str, entries: BTreeMap<String, Value>) -> Result<(), StoreError>;

    /// Remove the subtree at `path`. Removing a missing path is a no-op.
    async fn remove(&self, path: &str) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Path handling
// ---------------------------------------------------------------------------

/// Split and validate a store path.
pub fn split_path(path: &str) -> Result<Vec<&str>, StoreError> {
    let invalid = |reason| StoreError::InvalidPath {
        path: path.to_string(),
        reason,
    };

    if path.is_empty() {
        return Err(invalid("path is empty"));
    }
    let segments: Vec<&str> = path.split('/').collect();
    for segment in &segments {
        if segment.is_empty() {
            return Err(invalid("empty path segment"));
        }
        if segment.contains(FORBIDDEN_PATH_CHARS) {
            return Err(invalid("segment contains one of . # $ [ ]"));
        }
    }
    Ok(segments)
}

pub fn join_path(base: &str, relative: &str) -> String {
    format!("{base}/{relative}")
}

/// Drop `null` members recursively. Stores never hold nulls.
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Typed helpers
// ---------------------------------------------------------------------------

/// Read and decode the record at `path`.
pub async fn get_typed<T: DeserializeOwned>(
    store: &dyn RecordStore,
    path: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(path).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                path: path.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Read every child of the object at `path`, decoded, in key order.
pub async fn get_children<T: DeserializeOwned>(
    store: &dyn RecordStore,
    path: &str,
) -> Result<Vec<(String, T)>, StoreError> {
    let object = match store.get(path).await? {
        None => return Ok(Vec::new()),
        Some(Value::Object(object)) => object,
        Some(_) => {
            return Err(StoreError::Decode {
                path: path.to_string(),
                source: serde::de::Error::custom("expected an object of records"),
            })
        }
    };

    object
        .into_iter()
        .map(|(key, value)| {
            let record = serde_json::from_value(value).map_err(|source| StoreError::Decode {
                path: join_path(path, &key),
                source,
            })?;
            Ok((key, record))
        })
        .collect()
}

/// Encode `record` and write it at `path`.
pub async fn set_typed<T: Serialize + Sync + ?Sized>(
    store: &dyn RecordStore,
    path: &str,
    record: &T,
) -> Result<(), StoreError> {
    let value = serde_json::to_value(record).map_err(StoreError::Encode)?;
    store.set(path, value).await
}

/// Encode a value for use in an `update` entry map.
pub fn encode<T: Serialize + ?Sized>(record: &T) -> Result<Value, StoreError> {
    serde_json::to_value(record).map_err(StoreError::Encode)
}
