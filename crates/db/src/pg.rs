//! PostgreSQL-backed [`RecordStore`].
//!
//! The tree is flattened into the `nodes` table, one row per leaf. A leaf is
//! a scalar, an array, or an empty object; non-empty objects exist only
//! implicitly through their descendants. Every trait call runs in one SQL
//! transaction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{PgConnection, PgPool};

use crate::store::{join_path, split_path, strip_nulls, RecordStore, StoreError};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        split_path(path)?;
        let rows = sqlx::query_as::<_, (String, Value)>(
            "SELECT path, value FROM nodes
             WHERE path = $1 OR starts_with(path, $2)
             ORDER BY path",
        )
        .bind(path)
        .bind(subtree_prefix(path))
        .fetch_all(&self.pool)
        .await?;

        Ok(assemble(path, rows))
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        split_path(path)?;
        let mut tx = self.pool.begin().await?;
        write_subtree(&mut *tx, path, value).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, base: &str, entries: BTreeMap<String, Value>) -> Result<(), StoreError> {
        split_path(base)?;
        let entries = entries
            .into_iter()
            .map(|(rel, value)| {
                let path = join_path(base, &rel);
                split_path(&path)?;
                Ok((path, value))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        let mut tx = self.pool.begin().await?;
        for (path, value) in entries {
            write_subtree(&mut *tx, &path, value).await?;
        }
        tx.commit().await?;
        tracing::debug!(base, "Applied multi-path update");
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        split_path(path)?;
        let mut tx = self.pool.begin().await?;
        delete_subtree(&mut *tx, path).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SQL helpers
// ---------------------------------------------------------------------------

async fn delete_subtree(conn: &mut PgConnection, path: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM nodes WHERE path = $1 OR starts_with(path, $2)")
        .bind(path)
        .bind(subtree_prefix(path))
        .execute(conn)
        .await?;
    Ok(())
}

async fn write_subtree(conn: &mut PgConnection, path: &str, value: Value) -> Result<(), sqlx::Error> {
    delete_subtree(&mut *conn, path).await?;
    if value.is_null() {
        return Ok(());
    }

    // An ancestor stored as a leaf would shadow the new subtree.
    sqlx::query("DELETE FROM nodes WHERE path = ANY($1)")
        .bind(ancestors(path))
        .execute(&mut *conn)
        .await?;

    for (leaf_path, leaf) in flatten(path, strip_nulls(value)) {
        sqlx::query(
            "INSERT INTO nodes (path, value) VALUES ($1, $2)
             ON CONFLICT (path) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(leaf_path)
        .bind(leaf)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pure tree <-> rows mapping
// ---------------------------------------------------------------------------

/// `LIKE` would treat `_` in keys as a wildcard, so prefix matching uses
/// `starts_with` on this string instead.
fn subtree_prefix(path: &str) -> String {
    format!("{path}/")
}

/// Every strict ancestor of `path`, nearest last.
fn ancestors(path: &str) -> Vec<String> {
    path.match_indices('/')
        .map(|(i, _)| path[..i].to_string())
        .collect()
}

/// Flatten `value` rooted at `path` into leaf rows.
fn flatten(path: &str, value: Value) -> Vec<(String, Value)> {
    let mut rows = Vec::new();
    flatten_into(path.to_string(), value, &mut rows);
    rows
}

fn flatten_into(path: String, value: Value, rows: &mut Vec<(String, Value)>) {
    match value {
        Value::Null => {}
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(join_path(&path, &key), child, rows);
            }
        }
        leaf => rows.push((path, leaf)),
    }
}

/// Rebuild the subtree at `path` from its leaf rows.
fn assemble(path: &str, rows: Vec<(String, Value)>) -> Option<Value> {
    let prefix = subtree_prefix(path);
    let mut root: Option<Value> = None;

    for (row_path, value) in rows {
        if row_path == path {
            // Only one of "path is a leaf" and "path has descendants" can
            // hold, writes remove the other.
            root = Some(value);
            continue;
        }
        let Some(relative) = row_path.strip_prefix(&prefix) else {
            continue;
        };
        let node = root.get_or_insert_with(|| Value::Object(Map::new()));
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        insert_relative(node, relative, value);
    }
    root
}

fn insert_relative(node: &mut Value, relative: &str, value: Value) {
    let mut current = node;
    let mut segments = relative.split('/').peekable();
    while let Some(segment) = segments.next() {
        let Value::Object(map) = current else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        let child = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !child.is_object() {
            *child = Value::Object(Map::new());
        }
        current = child;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ancestors_of_nested_path() {
        assert_eq!(ancestors("a/b/c"), ["a", "a/b"]);
        assert!(ancestors("a").is_empty());
    }

    #[test]
    fn flatten_keeps_arrays_and_empty_objects_as_leaves() {
        let mut rows = flatten(
            "s",
            json!({"alumno": "Ana", "años": [2024], "proyectos": {}, "x": null, "n": {"a": 1}}),
        );
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            rows,
            vec![
                ("s/alumno".to_string(), json!("Ana")),
                ("s/años".to_string(), json!([2024])),
                ("s/n/a".to_string(), json!(1)),
                ("s/proyectos".to_string(), json!({})),
            ]
        );
    }

    #[test]
    fn assemble_rebuilds_subtree() {
        let value = json!({"alumno": "Ana", "proyectos": {}, "proyectosPorAño": {"2025": {"p1": "Acabada"}}});
        let rows = flatten("b/k", value.clone());
        assert_eq!(assemble("b/k", rows), Some(value));
    }

    #[test]
    fn assemble_leaf_and_missing() {
        assert_eq!(
            assemble("a/b", vec![("a/b".to_string(), json!(3))]),
            Some(json!(3))
        );
        assert_eq!(assemble("a/b", Vec::new()), None);
    }

    #[test]
    fn assemble_ignores_sibling_prefixes() {
        let rows = vec![
            ("k_1/x".to_string(), json!(1)),
            ("k_10/x".to_string(), json!(2)),
        ];
        assert_eq!(assemble("k_1", rows), Some(json!({"x": 1})));
    }
}
