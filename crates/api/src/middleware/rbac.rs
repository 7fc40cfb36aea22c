//! Role gates over [`AuthUser`]. A missing or bad token is 401, a valid
//! token with too little privilege is 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use ipa_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn authorize(
    parts: &mut Parts,
    state: &AppState,
    allowed: fn(&AuthUser) -> bool,
    denial: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !allowed(&user) {
        tracing::debug!(key = %user.account_key, role = %user.role, "Access denied");
        return Err(AppError::Core(CoreError::Forbidden(denial.into())));
    }
    Ok(user)
}

/// Account administration and the promotion job.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authorize(parts, state, AuthUser::is_admin, "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Student records, the lookup screen, graduates and the catalog.
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authorize(parts, state, AuthUser::is_staff, "Profesor or Admin role required")
            .await
            .map(RequireStaff)
    }
}
