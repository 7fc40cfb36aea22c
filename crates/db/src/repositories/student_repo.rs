//! Repository for the grade branches under `proyectos/`.

use std::collections::BTreeMap;

use serde_json::Value;

use ipa_core::grade::GradeLevel;
use ipa_core::paths::{branch_path, next_student_sequence, student_key, student_path};
use ipa_core::search::StudentRow;
use ipa_core::student::{ProjectMap, StudentRecord};

use crate::store::{encode, get_children, get_typed, set_typed, RecordStore, StoreError};

pub struct StudentRepo;

impl StudentRepo {
    /// Every record of one branch, ordered by key.
    pub async fn list_branch(
        store: &dyn RecordStore,
        level: GradeLevel,
    ) -> Result<Vec<(String, StudentRecord)>, StoreError> {
        get_children(store, &branch_path(level)).await
    }

    /// Every record of every branch, flattened with its key and grade.
    pub async fn list_all(store: &dyn RecordStore) -> Result<Vec<StudentRow>, StoreError> {
        let mut rows = Vec::new();
        for level in GradeLevel::ALL {
            let records = Self::list_branch(store, level).await?;
            rows.extend(records.into_iter().map(|(id, record)| StudentRow {
                id,
                level,
                record,
            }));
        }
        Ok(rows)
    }

    pub async fn find(
        store: &dyn RecordStore,
        level: GradeLevel,
        key: &str,
    ) -> Result<Option<StudentRecord>, StoreError> {
        get_typed(store, &student_path(level, key)).await
    }

    /// Write a record under an explicit key, replacing whatever was there.
    pub async fn put(
        store: &dyn RecordStore,
        level: GradeLevel,
        key: &str,
        record: &StudentRecord,
    ) -> Result<(), StoreError> {
        set_typed(store, &student_path(level, key), record).await
    }

    /// Add a student under the next free key of its branch.
    pub async fn create(
        store: &dyn RecordStore,
        record: &StudentRecord,
    ) -> Result<String, StoreError> {
        let keys = Self::branch_keys(store, record.level).await?;
        let key = student_key(
            record.level,
            next_student_sequence(keys.iter().map(String::as_str)),
        );
        Self::put(store, record.level, &key, record).await?;
        tracing::info!(level = %record.level, key = %key, "Student created");
        Ok(key)
    }

    /// Change name and tutor, leaving every other field untouched.
    ///
    /// Returns the updated record, or `None` if the student does not exist.
    pub async fn update_details(
        store: &dyn RecordStore,
        level: GradeLevel,
        key: &str,
        name: &str,
        tutor: &str,
    ) -> Result<Option<StudentRecord>, StoreError> {
        if Self::find(store, level, key).await?.is_none() {
            return Ok(None);
        }
        let entries = BTreeMap::from([
            ("alumno".to_string(), Value::from(name)),
            ("tutor".to_string(), Value::from(tutor)),
        ]);
        store.update(&student_path(level, key), entries).await?;
        Self::find(store, level, key).await
    }

    /// Replace the whole project map. Returns `false` if the student does
    /// not exist.
    pub async fn replace_projects(
        store: &dyn RecordStore,
        level: GradeLevel,
        key: &str,
        projects: &ProjectMap,
    ) -> Result<bool, StoreError> {
        if Self::find(store, level, key).await?.is_none() {
            return Ok(false);
        }
        let path = format!("{}/proyectos", student_path(level, key));
        store.set(&path, encode(projects)?).await?;
        Ok(true)
    }

    /// Delete one student. Returns `false` if it did not exist.
    pub async fn delete(
        store: &dyn RecordStore,
        level: GradeLevel,
        key: &str,
    ) -> Result<bool, StoreError> {
        let path = student_path(level, key);
        if store.get(&path).await?.is_none() {
            return Ok(false);
        }
        store.remove(&path).await?;
        Ok(true)
    }

    pub async fn delete_branch(store: &dyn RecordStore, level: GradeLevel) -> Result<(), StoreError> {
        store.remove(&branch_path(level)).await
    }

    /// Insert many students of one grade with a single multi-path write.
    ///
    /// Keys are allocated consecutively from the branch's next free
    /// sequence number. Returns the keys in input order.
    pub async fn bulk_insert(
        store: &dyn RecordStore,
        level: GradeLevel,
        records: &[StudentRecord],
    ) -> Result<Vec<String>, StoreError> {
        let keys = Self::branch_keys(store, level).await?;
        let first = next_student_sequence(keys.iter().map(String::as_str));

        let mut entries = BTreeMap::new();
        let mut created = Vec::with_capacity(records.len());
        for (offset, record) in records.iter().enumerate() {
            let key = student_key(level, first + offset as u64);
            entries.insert(key.clone(), encode(record)?);
            created.push(key);
        }
        store.update(&branch_path(level), entries).await?;
        Ok(created)
    }

    async fn branch_keys(store: &dyn RecordStore, level: GradeLevel) -> Result<Vec<String>, StoreError> {
        Ok(match store.get(&branch_path(level)).await? {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        })
    }
}
