//! Repository for the graduate archive under `alumnos_egresados/`.

use ipa_core::paths::{graduate_path, GRADUATES_ROOT};
use ipa_core::student::GraduateRecord;

use crate::store::{get_children, get_typed, set_typed, RecordStore, StoreError};

pub struct GraduateRepo;

impl GraduateRepo {
    pub async fn list(store: &dyn RecordStore) -> Result<Vec<(String, GraduateRecord)>, StoreError> {
        get_children(store, GRADUATES_ROOT).await
    }

    pub async fn find(
        store: &dyn RecordStore,
        graduate_key: &str,
    ) -> Result<Option<GraduateRecord>, StoreError> {
        get_typed(store, &graduate_path(graduate_key)).await
    }

    /// Write an archive entry, replacing any entry under the same key.
    pub async fn archive(
        store: &dyn RecordStore,
        graduate_key: &str,
        record: &GraduateRecord,
    ) -> Result<(), StoreError> {
        set_typed(store, &graduate_path(graduate_key), record).await
    }
}
