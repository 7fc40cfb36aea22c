//! Handlers for the `/catalogo` resource (project templates).
//!
//! All handlers require a staff role via [`RequireStaff`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use ipa_core::catalog::ProjectTemplate;
use ipa_core::error::CoreError;
use ipa_core::import::parse_catalog_csv;
use ipa_db::repositories::CatalogRepo;
use serde::{Deserialize, Serialize};

use super::validate_key;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /catalogo` and `PUT /catalogo/{id}`.
#[derive(Debug, Deserialize)]
pub struct TemplateRequest {
    pub nombre: String,
    pub profesor: String,
}

#[derive(Debug, Serialize)]
pub struct TemplateRow {
    pub id: String,
    #[serde(flatten)]
    pub template: ProjectTemplate,
}

#[derive(Debug, Serialize)]
pub struct CatalogImportResponse {
    pub imported: usize,
    pub ids: Vec<String>,
}

/// GET /api/v1/catalogo
pub async fn list_templates(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
) -> AppResult<Json<DataResponse<Vec<TemplateRow>>>> {
    let data = CatalogRepo::list(state.store())
        .await?
        .into_iter()
        .map(|(id, template)| TemplateRow { id, template })
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/catalogo
pub async fn create_template(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Json(input): Json<TemplateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TemplateRow>>)> {
    let template = ProjectTemplate::new(&input.nombre, &input.profesor)?;
    let id = CatalogRepo::create(state.store(), &template).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: TemplateRow { id, template },
        }),
    ))
}

/// PUT /api/v1/catalogo/{id}
pub async fn update_template(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<String>,
    Json(input): Json<TemplateRequest>,
) -> AppResult<Json<DataResponse<TemplateRow>>> {
    validate_key(&id)?;
    let template = ProjectTemplate::new(&input.nombre, &input.profesor)?;
    if !CatalogRepo::update(state.store(), &id, &template).await? {
        return Err(AppError::Core(CoreError::not_found("Project template", id)));
    }
    Ok(Json(DataResponse {
        data: TemplateRow { id, template },
    }))
}

/// DELETE /api/v1/catalogo/{id}
pub async fn delete_template(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    validate_key(&id)?;
    if !CatalogRepo::delete(state.store(), &id).await? {
        return Err(AppError::Core(CoreError::not_found("Project template", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/catalogo/importar
///
/// Body is the raw CSV text with a header row.
pub async fn import_templates(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    body: String,
) -> AppResult<(StatusCode, Json<DataResponse<CatalogImportResponse>>)> {
    let templates = parse_catalog_csv(&body)?;
    let ids = CatalogRepo::bulk_insert(state.store(), &templates).await?;
    tracing::info!(imported = ids.len(), by = %user.account_key, "Catalog import finished");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CatalogImportResponse {
                imported: ids.len(),
                ids,
            },
        }),
    ))
}
