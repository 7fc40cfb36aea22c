//! Handlers for the `/auth` resource (login, current account).

use axum::extract::State;
use axum::Json;
use ipa_core::account::UserAccountEntry;
use ipa_core::error::CoreError;
use ipa_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email"))]
    pub correo: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: AccountInfo,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct AccountInfo {
    pub key: String,
    pub nombre: String,
    pub correo: String,
    pub rol: String,
}

impl AccountInfo {
    pub fn new(key: impl Into<String>, entry: &UserAccountEntry) -> Self {
        Self {
            key: key.into(),
            nombre: entry.nombre.clone(),
            correo: entry.correo.clone(),
            rol: entry.rol.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Accounts without a password hash
/// cannot log in.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    input.validate()?;

    let invalid = || {
        AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        ))
    };

    let entry = UserRepo::find_by_email(state.store(), &input.correo)
        .await?
        .ok_or_else(invalid)?;
    let hash = entry.password_hash.as_deref().ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid());
    }

    let key = entry.key();
    let access_token = state
        .config
        .jwt
        .issue(&key, &entry.rol)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    tracing::info!(key = %key, role = %entry.rol, "Login succeeded");

    Ok(Json(AuthResponse {
        access_token,
        expires_in: state.config.jwt.expires_in_secs(),
        user: AccountInfo::new(key, &entry),
    }))
}

/// GET /api/v1/auth/me
pub async fn me(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<AccountInfo>> {
    let entry = UserRepo::find_by_key(state.store(), &user.account_key)
        .await?
        .ok_or_else(|| CoreError::not_found("Account", &user.account_key))?;
    Ok(Json(AccountInfo::new(user.account_key, &entry)))
}
