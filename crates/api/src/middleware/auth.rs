//! Bearer-token extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use ipa_core::error::CoreError;
use ipa_core::roles::{is_staff, ROLE_ADMIN};

use crate::error::AppError;
use crate::state::AppState;

/// The account behind a request's `Authorization: Bearer <jwt>` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Key under `usuarios/`.
    pub account_key: String,
    /// Role at the time the token was issued.
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    pub fn is_staff(&self) -> bool {
        is_staff(&self.role)
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| unauthorized("Malformed Authorization header"))?;
    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state
            .config
            .jwt
            .verify(token)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        Ok(AuthUser {
            account_key: claims.sub,
            role: claims.role,
        })
    }
}
