//! Tests for the `AppError` to HTTP status and body mapping.
//!
//! Each variant must produce the right status code and the uniform
//! `{error, message, details}` envelope. No server is involved --
//! `IntoResponse` is called directly on `AppError` values. The sqlx
//! constraint classifications (23505/23503) need a live database and are
//! covered by the endpoint tests instead.

use axum::response::IntoResponse;
use http_body_util::BodyExt;
use tea_api::error::AppError;
use tea_core::error::{CoreError, FieldErrors};
use tea_service::TechniqueError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (axum::http::StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], true);
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: CoreError::NotFound maps to 404, naming the entity and key
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::not_found("technique", "shap"));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "technique 'shap' not found");
    assert_eq!(json["details"], serde_json::Value::Null);
}

// ---------------------------------------------------------------------------
// Test: CoreError::Validation maps to 400 with per-field details
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_error_returns_400_with_field_details() {
    let mut errors = FieldErrors::new();
    errors.push("name", "This field is required.");
    errors.push("complexity_rating", "Rating must be between 1 and 5.");
    let err = AppError::Core(CoreError::Validation(errors));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Validation failed");
    assert_eq!(json["details"]["name"][0], "This field is required.");
    assert_eq!(
        json["details"]["complexity_rating"][0],
        "Rating must be between 1 and 5."
    );
}

// ---------------------------------------------------------------------------
// Test: CoreError::Conflict maps to 409 with the conflict message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn conflict_error_returns_409() {
    let err = AppError::Core(CoreError::Conflict(
        "Resource type 3 is referenced by 2 resource(s)".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::CONFLICT);
    assert_eq!(
        json["message"],
        "Resource type 3 is referenced by 2 resource(s)"
    );
}

// ---------------------------------------------------------------------------
// Test: CoreError::Unauthorized maps to 401
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unauthorized_error_returns_401() {
    let err = AppError::Core(CoreError::Unauthorized(
        "Missing Authorization header".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Missing Authorization header");
}

// ---------------------------------------------------------------------------
// Test: AppError::BadRequest maps to 400 with the supplied message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("Cannot order by 'favourite_colour'".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Cannot order by 'favourite_colour'");
}

// ---------------------------------------------------------------------------
// Test: AppError::InternalError returns a sanitized 500 body
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("technique 'shap' missing after write".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);

    // Whatever went wrong internally stays out of the response body.
    let body_text = json.to_string();
    assert!(
        !body_text.contains("missing after write"),
        "500 body leaked the internal message"
    );
    assert_eq!(json["message"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Test: CoreError::Internal gets the same sanitized 500 treatment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn core_internal_error_returns_500_and_sanitizes() {
    let err = AppError::Core(CoreError::Internal("connection pool exhausted".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);

    let body_text = json.to_string();
    assert!(
        !body_text.contains("connection pool"),
        "500 body leaked the internal message"
    );
    assert_eq!(json["message"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Test: sqlx RowNotFound maps to 404 without driver text
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sqlx_row_not_found_returns_404() {
    let err = AppError::Database(sqlx::Error::RowNotFound);

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Resource not found");
}

// ---------------------------------------------------------------------------
// Test: service-level errors convert without changing their mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn technique_error_conversion_preserves_status() {
    let err: AppError = TechniqueError::not_found("technique", "grad-cam").into();

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "technique 'grad-cam' not found");
}
