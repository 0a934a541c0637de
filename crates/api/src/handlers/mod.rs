//! HTTP request handlers.

pub mod goals;
pub mod resource_types;
pub mod tags;
pub mod techniques;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Unwrap a JSON body, turning axum's rejection into the uniform error
/// envelope instead of its plain-text default.
pub(crate) fn require_json<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
    }
}
