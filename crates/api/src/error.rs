use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ipa_core::error::CoreError;
use ipa_db::StoreError;
use serde_json::json;

use crate::engine::promotion::PromotionError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors, [`StoreError`] for record store
/// failures and [`PromotionError`] for the promotion job, and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `ipa_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A record store error from `ipa_db`.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Promotion(#[from] PromotionError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let detail = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{field} {detail}")
            })
            .collect();
        fields.sort();
        AppError::Core(CoreError::Validation(fields.join("; ")))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Store errors ---
            AppError::Store(err) => classify_store_error(err),

            // --- Promotion job ---
            AppError::Promotion(err) => match err {
                PromotionError::AlreadyCompleted { .. } => (
                    StatusCode::CONFLICT,
                    "PROMOTION_ALREADY_COMPLETED",
                    err.to_string(),
                ),
                PromotionError::Interrupted { .. } => (
                    StatusCode::CONFLICT,
                    "PROMOTION_INTERRUPTED",
                    err.to_string(),
                ),
                PromotionError::InvalidStep { .. } => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
                }
                PromotionError::Store { .. } => {
                    tracing::error!(error = %err, "Promotion failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "PROMOTION_FAILED",
                        err.to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a store error into an HTTP status, error code, and message.
///
/// - `InvalidPath` maps to 400, the path came from client input.
/// - `Decode` maps to 500 but keeps the message, it names the bad record.
/// - Everything else maps to 500 with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::InvalidPath { .. } => {
            (StatusCode::BAD_REQUEST, "INVALID_PATH", err.to_string())
        }
        StoreError::Decode { .. } => {
            tracing::error!(error = %err, "Malformed record in store");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "MALFORMED_RECORD",
                err.to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Store error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
