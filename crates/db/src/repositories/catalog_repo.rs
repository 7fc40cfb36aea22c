//! Repository for project templates under `CatalogoProyectos/`.

use std::collections::BTreeMap;

use ipa_core::catalog::{max_template_number, template_id, template_number, ProjectTemplate};
use ipa_core::paths::{catalog_path, CATALOG_ROOT};

use crate::store::{encode, get_children, get_typed, set_typed, RecordStore, StoreError};

pub struct CatalogRepo;

impl CatalogRepo {
    /// All templates, ordered by their numeric id.
    pub async fn list(store: &dyn RecordStore) -> Result<Vec<(String, ProjectTemplate)>, StoreError> {
        let mut templates: Vec<(String, ProjectTemplate)> = get_children(store, CATALOG_ROOT).await?;
        templates.sort_by_key(|(id, _)| (template_number(id).unwrap_or(u64::MAX), id.clone()));
        Ok(templates)
    }

    pub async fn find(store: &dyn RecordStore, id: &str) -> Result<Option<ProjectTemplate>, StoreError> {
        get_typed(store, &catalog_path(id)).await
    }

    /// Add a template under the next `proyecto_<n>` id.
    pub async fn create(store: &dyn RecordStore, template: &ProjectTemplate) -> Result<String, StoreError> {
        let id = template_id(Self::max_number(store).await? + 1);
        set_typed(store, &catalog_path(&id), template).await?;
        Ok(id)
    }

    /// Overwrite an existing template. Returns `false` if it does not exist.
    pub async fn update(
        store: &dyn RecordStore,
        id: &str,
        template: &ProjectTemplate,
    ) -> Result<bool, StoreError> {
        if Self::find(store, id).await?.is_none() {
            return Ok(false);
        }
        set_typed(store, &catalog_path(id), template).await?;
        Ok(true)
    }

    pub async fn delete(store: &dyn RecordStore, id: &str) -> Result<bool, StoreError> {
        let path = catalog_path(id);
        if store.get(&path).await?.is_none() {
            return Ok(false);
        }
        store.remove(&path).await?;
        Ok(true)
    }

    /// Insert many templates with one multi-path write. Ids continue from
    /// the highest existing number. Returns the new ids in input order.
    pub async fn bulk_insert(
        store: &dyn RecordStore,
        templates: &[ProjectTemplate],
    ) -> Result<Vec<String>, StoreError> {
        let start = Self::max_number(store).await? + 1;
        let mut entries = BTreeMap::new();
        let mut ids = Vec::with_capacity(templates.len());
        for (offset, template) in templates.iter().enumerate() {
            let id = template_id(start + offset as u64);
            entries.insert(id.clone(), encode(template)?);
            ids.push(id);
        }
        store.update(CATALOG_ROOT, entries).await?;
        Ok(ids)
    }

    async fn max_number(store: &dyn RecordStore) -> Result<u64, StoreError> {
        let existing = match store.get(CATALOG_ROOT).await? {
            Some(serde_json::Value::Object(map)) => map.keys().cloned().collect::<Vec<_>>(),
            _ => Vec::new(),
        };
        Ok(max_template_number(existing.iter().map(String::as_str)))
    }
}
