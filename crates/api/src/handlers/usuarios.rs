//! Handlers for the `/usuarios` resource (accounts and roles).
//!
//! All handlers require the `Admin` role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use ipa_core::account::UserAccountEntry;
use ipa_core::error::CoreError;
use ipa_core::import::is_account_email;
use ipa_core::paths::sanitize_email_key;
use ipa_core::roles::{is_staff, is_valid_role, VALID_ROLES};
use ipa_db::repositories::UserRepo;
use serde::Deserialize;
use validator::Validate;

use super::validate_key;
use crate::auth::password::{check_new_password, hash_password};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::AccountInfo;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{DataResponse, SuccessResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Exact role filter. Without it, only staff accounts are listed.
    pub rol: Option<String>,
}

/// Request body for `POST /usuarios`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub nombre: String,
    #[validate(email(message = "must be a valid email"))]
    pub correo: String,
    pub rol: String,
    /// Optional initial password. Without one the account cannot log in.
    pub password: Option<String>,
}

/// Request body for `PUT /usuarios/{key}`.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub nombre: Option<String>,
    pub rol: Option<String>,
}

/// Request body for `POST /usuarios/{key}/rol`.
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub rol: String,
}

/// Request body for `POST /usuarios/eliminar`.
#[derive(Debug, Deserialize)]
pub struct DeleteByEmailRequest {
    #[serde(default)]
    pub correo: String,
}

fn check_role(role: &str) -> AppResult<()> {
    if !is_valid_role(role) {
        return Err(AppError::BadRequest(format!(
            "Invalid role '{role}'. Expected one of: {}",
            VALID_ROLES.join(", ")
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/usuarios?rol=
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<Json<DataResponse<Vec<AccountInfo>>>> {
    let users = UserRepo::list(state.store()).await?;
    let data = users
        .iter()
        .filter(|(_, entry)| match query.rol.as_deref() {
            Some(role) => entry.rol == role,
            None => is_staff(&entry.rol),
        })
        .map(|(key, entry)| AccountInfo::new(key.clone(), entry))
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/usuarios
///
/// Create an account keyed by the sanitized email. 409 if it already exists.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(mut input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AccountInfo>>)> {
    input.nombre = input.nombre.trim().to_string();
    input.correo = input.correo.trim().to_string();
    input.validate()?;
    check_role(&input.rol)?;

    let correo = input.correo.clone();
    if !is_account_email(&correo) {
        return Err(AppError::BadRequest(format!(
            "Email '{correo}' cannot be used as an account key"
        )));
    }
    if UserRepo::find_by_email(state.store(), &correo).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "An account for {correo} already exists"
        ))));
    }

    let password_hash = match input.password.as_deref() {
        Some(password) => {
            check_new_password(password)?;
            Some(
                hash_password(password)
                    .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?,
            )
        }
        None => None,
    };

    let entry = UserAccountEntry {
        nombre: input.nombre,
        correo,
        rol: input.rol,
        password_hash,
    };
    let key = UserRepo::save(state.store(), &entry).await?;
    tracing::info!(key = %key, role = %entry.rol, "Account created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: AccountInfo::new(key, &entry),
        }),
    ))
}

/// PUT /api/v1/usuarios/{key}
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(key): Path<String>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<AccountInfo>>> {
    validate_key(&key)?;
    let mut entry = UserRepo::find_by_key(state.store(), &key)
        .await?
        .ok_or_else(|| CoreError::not_found("Account", &key))?;

    if let Some(nombre) = input.nombre {
        let nombre = nombre.trim();
        if nombre.is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "nombre must not be empty".into(),
            )));
        }
        entry.nombre = nombre.to_string();
    }
    if let Some(rol) = input.rol {
        check_role(&rol)?;
        entry.rol = rol;
    }

    UserRepo::put(state.store(), &key, &entry).await?;
    Ok(Json(DataResponse {
        data: AccountInfo::new(key, &entry),
    }))
}

/// POST /api/v1/usuarios/{key}/rol
///
/// Set the role of an existing account.
pub async fn assign_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(key): Path<String>,
    Json(input): Json<AssignRoleRequest>,
) -> AppResult<Json<DataResponse<AccountInfo>>> {
    validate_key(&key)?;
    check_role(&input.rol)?;

    if !UserRepo::set_role(state.store(), &key, &input.rol).await? {
        return Err(CoreError::not_found("Account", &key).into());
    }
    tracing::info!(key = %key, role = %input.rol, by = %admin.account_key, "Role assigned");

    let entry = UserRepo::find_by_key(state.store(), &key)
        .await?
        .ok_or_else(|| CoreError::not_found("Account", &key))?;
    Ok(Json(DataResponse {
        data: AccountInfo::new(key, &entry),
    }))
}

/// POST /api/v1/usuarios/eliminar
///
/// Delete the account registered for an email.
pub async fn delete_by_email(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<DeleteByEmailRequest>,
) -> AppResult<Json<SuccessResponse>> {
    let correo = input.correo.trim();
    if correo.is_empty() {
        return Err(AppError::BadRequest("Email is required".into()));
    }

    let key = sanitize_email_key(correo);
    validate_key(&key)?;
    if !UserRepo::delete(state.store(), &key).await? {
        return Err(CoreError::not_found("Account", correo).into());
    }
    tracing::info!(key = %key, by = %admin.account_key, "Account deleted");

    Ok(Json(SuccessResponse::ok()))
}
