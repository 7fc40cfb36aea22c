//! Handlers for `/admin/promocion`: trigger, inspect and resume the
//! year-end promotion.
//!
//! All handlers require the `Admin` role via [`RequireAdmin`].

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use ipa_core::error::CoreError;
use ipa_core::promotion::{PromotionRun, PromotionSummary};
use ipa_core::types::Year;
use ipa_db::repositories::PromotionRepo;
use serde::Deserialize;
use tokio::sync::OwnedMutexGuard;

use crate::engine::promotion::{PromotionContext, PromotionError, PromotionJob, RunOptions};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Optional request body for `POST /admin/promocion`.
#[derive(Debug, Default, Deserialize)]
pub struct RunPromotionRequest {
    #[serde(default)]
    pub force: bool,
}

/// Request body for `POST /admin/promocion/{year}/reanudar`.
#[derive(Debug, Deserialize)]
pub struct ResumePromotionRequest {
    pub paso: usize,
}

fn acquire(state: &AppState) -> AppResult<OwnedMutexGuard<()>> {
    Arc::clone(&state.promotion_lock)
        .try_lock_owned()
        .map_err(|_| {
            AppError::Core(CoreError::Conflict(
                "A promotion is already running".into(),
            ))
        })
}

/// Run the job on its own task so a dropped request cannot stop it between
/// two writes. The lock is held until the task ends.
async fn spawn_job<F, Fut>(
    state: &AppState,
    guard: OwnedMutexGuard<()>,
    work: F,
) -> AppResult<PromotionSummary>
where
    F: FnOnce(PromotionJob) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Result<PromotionSummary, PromotionError>> + Send + 'static,
{
    let job = PromotionJob::new(Arc::clone(&state.store));
    let handle = tokio::spawn(async move {
        let _guard = guard;
        work(job).await
    });
    let summary = handle
        .await
        .map_err(|e| AppError::InternalError(format!("Promotion task failed: {e}")))??;
    Ok(summary)
}

/// POST /api/v1/admin/promocion
///
/// Promote every student for the current calendar year. The body may be
/// omitted; without a `content-type` header the run is not forced.
pub async fn run_promotion(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    input: Option<Json<RunPromotionRequest>>,
) -> AppResult<Json<DataResponse<PromotionSummary>>> {
    let input = input.map(|Json(body)| body).unwrap_or_default();
    let guard = acquire(&state)?;
    let ctx = PromotionContext::now();
    let options = RunOptions { force: input.force };
    tracing::info!(year = ctx.year, force = options.force, by = %admin.account_key, "Promotion requested");

    let summary = spawn_job(&state, guard, move |job| async move { job.run(&ctx, options).await }).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// GET /api/v1/admin/promocion/{year}
///
/// The saga log of the year's run.
pub async fn get_promotion(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(year): Path<Year>,
) -> AppResult<Json<DataResponse<PromotionRun>>> {
    let run = PromotionRepo::find(state.store(), year)
        .await?
        .ok_or_else(|| CoreError::not_found("Promotion", year.to_string()))?;
    Ok(Json(DataResponse { data: run }))
}

/// POST /api/v1/admin/promocion/{year}/reanudar
///
/// Replay the plan from step `paso` onward for the given year.
pub async fn resume_promotion(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(year): Path<Year>,
    Json(input): Json<ResumePromotionRequest>,
) -> AppResult<Json<DataResponse<PromotionSummary>>> {
    let guard = acquire(&state)?;
    let today = PromotionContext::now();
    let ctx = PromotionContext {
        year,
        date: today.date,
    };
    let step = input.paso;
    tracing::info!(year, step, by = %admin.account_key, "Promotion resume requested");

    let summary = spawn_job(&state, guard, move |job| async move { job.resume_from(&ctx, step).await }).await?;
    Ok(Json(DataResponse { data: summary }))
}
