//! Bearer-token authentication extractor for write endpoints.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tea_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Guard for mutating handlers, checked against the configured
/// `API_WRITE_TOKEN`. When no token is configured, writes are open (local
/// development); reads never require auth.
///
/// ```ignore
/// async fn create_thing(_auth: RequireAuth, ...) -> AppResult<impl IntoResponse> { ... }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth;

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.write_token.as_deref() else {
            return Ok(RequireAuth);
        };

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        if token != expected {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid token".into(),
            )));
        }

        Ok(RequireAuth)
    }
}
