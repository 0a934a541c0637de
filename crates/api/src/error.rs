use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use tea_core::error::CoreError;
use tea_service::TechniqueError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the uniform
/// `{error: true, message, details}` body on every failure path.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `tea_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<TechniqueError> for AppError {
    fn from(err: TechniqueError) -> Self {
        match err {
            TechniqueError::Core(core) => AppError::Core(core),
            TechniqueError::Database(db) => AppError::Database(db),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, key } => (
                    StatusCode::NOT_FOUND,
                    format!("{entity} '{key}' not found"),
                    Value::Null,
                ),
                CoreError::Validation(errors) => (
                    StatusCode::BAD_REQUEST,
                    "Validation failed".to_string(),
                    serde_json::to_value(errors).unwrap_or(Value::Null),
                ),
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone(), Value::Null),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, msg.clone(), Value::Null)
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal error occurred".to_string(),
                        Value::Null,
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), Value::Null),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    Value::Null,
                )
            }
        };

        let body = json!({
            "error": true,
            "message": message,
            "details": details,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, message, and details value.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations (23505) and foreign-key violations (23503) map
///   to 409; a duplicate slug hits the primary key, a duplicate name or
///   URL a `uq_` constraint, and both are conflicts to the client.
/// - Everything else maps to 500 with a sanitized message that never
///   leaks schema or driver text.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, String, Value) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "Resource not found".to_string(),
            Value::Null,
        ),
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => {
                let constraint = db_err.constraint().unwrap_or("unknown");
                (
                    StatusCode::CONFLICT,
                    format!("Duplicate value violates unique constraint: {constraint}"),
                    Value::Null,
                )
            }
            Some("23503") => (
                StatusCode::CONFLICT,
                "Operation violates a reference to another record".to_string(),
                Value::Null,
            ),
            _ => {
                tracing::error!(error = %db_err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    Value::Null,
                )
            }
        },
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
                Value::Null,
            )
        }
    }
}
