//! Handler for the cross-grade student lookup.

use axum::extract::{Query, State};
use axum::Json;
use ipa_core::search::{StudentQuery, StudentRow};
use ipa_db::repositories::StudentRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/consulta?texto=&nivel=
///
/// Students of every grade whose name contains `texto` (case-insensitive),
/// optionally restricted to one grade.
pub async fn search_students(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Query(query): Query<StudentQuery>,
) -> AppResult<Json<DataResponse<Vec<StudentRow>>>> {
    let rows = StudentRepo::list_all(state.store()).await?;
    Ok(Json(DataResponse {
        data: query.filter(rows),
    }))
}
