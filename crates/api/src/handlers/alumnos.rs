//! Handlers for the `/alumnos` resource: per-grade student lists, the
//! student editor, the project editor and the CSV bulk import.
//!
//! All handlers require a staff role via [`RequireStaff`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use ipa_core::error::CoreError;
use ipa_core::import::{is_account_email, parse_student_csv, ImportReport};
use ipa_core::search::StudentRow;
use ipa_core::student::{build_project_map, ProjectEntry, StudentRecord};
use ipa_db::repositories::StudentRepo;
use serde::Deserialize;
use validator::Validate;

use super::{parse_level, validate_key};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /alumnos/{nivel}`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub alumno: String,
    #[serde(default)]
    pub tutor: String,
    #[validate(email(message = "must be a valid email"))]
    pub correo: Option<String>,
}

/// Request body for `PUT /alumnos/{nivel}/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStudentRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub alumno: String,
    #[serde(default)]
    pub tutor: String,
}

/// Request body for `PUT /alumnos/{nivel}/{id}/proyectos`.
#[derive(Debug, Deserialize)]
pub struct UpdateProjectsRequest {
    pub proyectos: Vec<ProjectEntry>,
    #[serde(default)]
    pub assignades: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub total_acabades: u32,
}

fn student_not_found(id: &str) -> AppError {
    AppError::Core(CoreError::not_found("Student", id))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/alumnos/{nivel}
pub async fn list_students(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(nivel): Path<String>,
) -> AppResult<Json<DataResponse<Vec<StudentRow>>>> {
    let level = parse_level(&nivel)?;
    let data = StudentRepo::list_branch(state.store(), level)
        .await?
        .into_iter()
        .map(|(id, record)| StudentRow { id, level, record })
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/alumnos/{nivel}
pub async fn create_student(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(nivel): Path<String>,
    Json(mut input): Json<CreateStudentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<StudentRow>>)> {
    input.alumno = input.alumno.trim().to_string();
    input.correo = input
        .correo
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    input.validate()?;
    let level = parse_level(&nivel)?;
    if let Some(correo) = input.correo.as_deref() {
        if !is_account_email(correo) {
            return Err(AppError::BadRequest(format!(
                "Email '{correo}' cannot be used as an account key"
            )));
        }
    }

    let mut record = StudentRecord::new(&input.alumno, input.tutor.trim(), level);
    record.email = input.correo;

    let id = StudentRepo::create(state.store(), &record).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: StudentRow { id, level, record },
        }),
    ))
}

/// GET /api/v1/alumnos/{nivel}/{id}
pub async fn get_student(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path((nivel, id)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<StudentRow>>> {
    let level = parse_level(&nivel)?;
    validate_key(&id)?;
    let record = StudentRepo::find(state.store(), level, &id)
        .await?
        .ok_or_else(|| student_not_found(&id))?;
    Ok(Json(DataResponse {
        data: StudentRow { id, level, record },
    }))
}

/// PUT /api/v1/alumnos/{nivel}/{id}
///
/// Edit the name and tutor. Projects and history are left untouched.
pub async fn update_student(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path((nivel, id)): Path<(String, String)>,
    Json(mut input): Json<UpdateStudentRequest>,
) -> AppResult<Json<DataResponse<StudentRow>>> {
    input.alumno = input.alumno.trim().to_string();
    input.validate()?;
    let level = parse_level(&nivel)?;
    validate_key(&id)?;

    let record = StudentRepo::update_details(
        state.store(),
        level,
        &id,
        &input.alumno,
        input.tutor.trim(),
    )
    .await?
    .ok_or_else(|| student_not_found(&id))?;
    Ok(Json(DataResponse {
        data: StudentRow { id, level, record },
    }))
}

/// DELETE /api/v1/alumnos/{nivel}/{id}
pub async fn delete_student(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path((nivel, id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let level = parse_level(&nivel)?;
    validate_key(&id)?;
    if !StudentRepo::delete(state.store(), level, &id).await? {
        return Err(student_not_found(&id));
    }
    tracing::info!(level = %level, id = %id, by = %user.account_key, "Student deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/alumnos/{nivel}/{id}/proyectos
///
/// Replace the student's project map and counters.
pub async fn update_projects(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path((nivel, id)): Path<(String, String)>,
    Json(input): Json<UpdateProjectsRequest>,
) -> AppResult<Json<DataResponse<StudentRow>>> {
    let level = parse_level(&nivel)?;
    validate_key(&id)?;
    let projects = build_project_map(
        &input.proyectos,
        input.assignades,
        input.total,
        input.total_acabades,
    )?;

    if !StudentRepo::replace_projects(state.store(), level, &id, &projects).await? {
        return Err(student_not_found(&id));
    }
    let record = StudentRepo::find(state.store(), level, &id)
        .await?
        .ok_or_else(|| student_not_found(&id))?;
    Ok(Json(DataResponse {
        data: StudentRow { id, level, record },
    }))
}

/// POST /api/v1/alumnos/importar
///
/// Body is the raw CSV text, one `nombre;curso;tutor[;correo]` per line.
/// Valid rows are written with one multi-path update per grade; a failed
/// grade counts all of its rows as failed.
pub async fn import_students(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    body: String,
) -> AppResult<Json<DataResponse<ImportReport>>> {
    let parsed = parse_student_csv(&body);
    let mut report = parsed.report();

    for (level, rows) in &parsed.by_level {
        let records: Vec<StudentRecord> = rows
            .iter()
            .map(|row| {
                let mut record = StudentRecord::new(row.name.as_str(), row.tutor.as_str(), row.level);
                record.email = row.email.clone();
                record
            })
            .collect();

        match StudentRepo::bulk_insert(state.store(), *level, &records).await {
            Ok(keys) => report.succeeded += keys.len(),
            Err(e) => {
                tracing::warn!(level = %level, rows = rows.len(), error = %e, "Import of grade failed");
                report.record_failure(rows.len(), format!("Error in level {level}: {e}"));
            }
        }
    }

    tracing::info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed,
        by = %user.account_key,
        "Student import finished",
    );
    Ok(Json(DataResponse { data: report }))
}
