//! Handler for the graduate archive listing.

use axum::extract::State;
use axum::Json;
use ipa_core::student::GraduateRecord;
use ipa_db::repositories::GraduateRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GraduateRow {
    pub id: String,
    #[serde(flatten)]
    pub record: GraduateRecord,
}

/// GET /api/v1/egresados
pub async fn list_graduates(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
) -> AppResult<Json<DataResponse<Vec<GraduateRow>>>> {
    let data = GraduateRepo::list(state.store())
        .await?
        .into_iter()
        .map(|(id, record)| GraduateRow { id, record })
        .collect();
    Ok(Json(DataResponse { data }))
}
