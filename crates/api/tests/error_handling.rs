//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values, no server needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use ipa_api::engine::promotion::PromotionError;
use ipa_api::error::AppError;
use ipa_core::error::CoreError;
use ipa_db::StoreError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

fn decode_error() -> StoreError {
    let source = serde_json::from_str::<u32>("\"x\"").unwrap_err();
    StoreError::Decode {
        path: "proyectos/proyectos_sanitizado_1r/k".into(),
        source,
    }
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::not_found("Student", "proyectos_sanitizado_1r_alumno_3"));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Student with id proyectos_sanitizado_1r_alumno_3 not found");
}

#[tokio::test]
async fn validation_and_bad_request_return_400() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Validation("bad status".into()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "bad status");

    let (status, json) = error_to_response(AppError::BadRequest("Email is required".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn conflict_and_auth_errors() {
    let (status, _) = error_to_response(AppError::Core(CoreError::Conflict("dup".into()))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Unauthorized("no token".into()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Forbidden("admin only".into()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let (status, json) =
        error_to_response(AppError::InternalError("secret detail".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");

    let (status, json) =
        error_to_response(AppError::Store(StoreError::Unavailable("pool exhausted".into()))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert!(!json["error"].as_str().unwrap().contains("pool"));
}

#[tokio::test]
async fn invalid_path_returns_400() {
    let err = AppError::Store(StoreError::InvalidPath {
        path: "usuarios/a.b".into(),
        reason: "segment contains one of . # $ [ ]",
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_PATH");
    assert!(json["error"].as_str().unwrap().contains("usuarios/a.b"));
}

#[tokio::test]
async fn malformed_record_names_the_path() {
    let (status, json) = error_to_response(AppError::Store(decode_error())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "MALFORMED_RECORD");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("proyectos/proyectos_sanitizado_1r/k"));
}

#[tokio::test]
async fn promotion_errors() {
    let (status, json) =
        error_to_response(AppError::Promotion(PromotionError::AlreadyCompleted { year: 2025 }))
            .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "PROMOTION_ALREADY_COMPLETED");

    let (status, json) = error_to_response(AppError::Promotion(PromotionError::Interrupted {
        year: 2025,
        next_step: 2,
    }))
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "PROMOTION_INTERRUPTED");
    assert!(json["error"].as_str().unwrap().contains("next step 2"));

    let (status, _) = error_to_response(AppError::Promotion(PromotionError::InvalidStep {
        step: 9,
        total: 4,
    }))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = error_to_response(AppError::Promotion(PromotionError::Store {
        step: 1,
        source: StoreError::Unavailable("connection reset".into()),
    }))
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "PROMOTION_FAILED");
    assert_eq!(
        json["error"],
        "Promotion failed at step 1: Store unavailable: connection reset"
    );
}
