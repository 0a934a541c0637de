use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Liveness response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
}

/// Database health response payload.
#[derive(Serialize)]
pub struct DbHealthResponse {
    pub status: &'static str,
    /// Whether the `SELECT 1` round trip succeeded.
    pub db_healthy: bool,
}

/// GET /health -- liveness only, never touches the database.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health/db -- database round trip; 503 when unreachable so load
/// balancers can take the instance out of rotation.
async fn db_health_check(State(state): State<AppState>) -> (StatusCode, Json<DbHealthResponse>) {
    let db_healthy = tea_db::health_check(&state.pool).await.is_ok();

    let (status_code, status) = if db_healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (status_code, Json(DbHealthResponse { status, db_healthy }))
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/db", get(db_health_check))
}
