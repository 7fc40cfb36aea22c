//! Repository for the promotion saga log under `promociones/<year>`.

use std::collections::BTreeMap;

use serde_json::Value;

use ipa_core::paths::promotion_path;
use ipa_core::promotion::{PromotionRun, RunStatus, StepLog};
use ipa_core::types::{Timestamp, Year};

use crate::store::{encode, get_typed, set_typed, RecordStore, StoreError};

pub struct PromotionRepo;

impl PromotionRepo {
    pub async fn find(store: &dyn RecordStore, year: Year) -> Result<Option<PromotionRun>, StoreError> {
        get_typed(store, &promotion_path(year)).await
    }

    /// Start a fresh log for `year`, replacing any previous one.
    pub async fn start(
        store: &dyn RecordStore,
        year: Year,
        at: Timestamp,
    ) -> Result<PromotionRun, StoreError> {
        let run = PromotionRun::started(at);
        set_typed(store, &promotion_path(year), &run).await?;
        Ok(run)
    }

    /// Mark an existing log as running again, keeping its committed steps.
    pub async fn reopen(store: &dyn RecordStore, year: Year) -> Result<(), StoreError> {
        let entries = BTreeMap::from([
            ("estado".to_string(), encode(&RunStatus::EnCurso)?),
            ("error".to_string(), Value::Null),
            ("paso_fallido".to_string(), Value::Null),
            ("fin".to_string(), Value::Null),
        ]);
        store.update(&promotion_path(year), entries).await
    }

    /// Record a committed step and advance `ultimo_paso`.
    pub async fn record_step(
        store: &dyn RecordStore,
        year: Year,
        index: usize,
        step: &StepLog,
    ) -> Result<(), StoreError> {
        let entries = BTreeMap::from([
            (format!("pasos/{index}"), encode(step)?),
            ("ultimo_paso".to_string(), Value::from(index)),
        ]);
        store.update(&promotion_path(year), entries).await
    }

    pub async fn complete(store: &dyn RecordStore, year: Year, at: Timestamp) -> Result<(), StoreError> {
        let entries = BTreeMap::from([
            ("estado".to_string(), encode(&RunStatus::Completada)?),
            ("fin".to_string(), encode(&at)?),
        ]);
        store.update(&promotion_path(year), entries).await
    }

    pub async fn fail(
        store: &dyn RecordStore,
        year: Year,
        failed_step: usize,
        message: &str,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        let entries = BTreeMap::from([
            ("estado".to_string(), encode(&RunStatus::Fallida)?),
            ("error".to_string(), Value::from(message)),
            ("paso_fallido".to_string(), Value::from(failed_step)),
            ("fin".to_string(), encode(&at)?),
        ]);
        store.update(&promotion_path(year), entries).await
    }
}
