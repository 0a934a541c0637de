//! Handlers for assurance goal CRUD.

use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tea_core::error::{CoreError, FieldErrors};
use tea_core::pagination::{clamp_page_size, offset};
use tea_core::types::DbId;
use tea_core::validate;
use tea_db::models::goal::{CreateGoal, UpdateGoal};
use tea_db::repositories::GoalRepo;

use crate::auth::RequireAuth;
use crate::error::{AppError, AppResult};
use crate::query::ListParams;
use crate::response::Page;
use crate::state::AppState;

/// GET /api/v1/assurance-goals
pub async fn list_goals(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = clamp_page_size(params.page_size, state.config.page_size_max);
    let search = params.search.as_deref();

    let count = GoalRepo::count(&state.pool, search).await?;
    let results = GoalRepo::list(&state.pool, search, page_size, offset(page, page_size)).await?;

    Ok(Json(Page::new(&uri, count, page, page_size, results)))
}

/// GET /api/v1/assurance-goals/{id}
pub async fn get_goal(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let goal = GoalRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("assurance goal", id)))?;

    Ok(Json(goal))
}

/// POST /api/v1/assurance-goals
pub async fn create_goal(
    _auth: RequireAuth,
    State(state): State<AppState>,
    payload: Result<Json<CreateGoal>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let input = super::require_json(payload)?;

    let mut errors = FieldErrors::new();
    validate::check_required(&mut errors, "name", &input.name);
    errors.into_result().map_err(AppError::Core)?;

    let goal = GoalRepo::create(&state.pool, &input).await?;
    tracing::info!(id = goal.id, name = %goal.name, "assurance goal created");

    Ok((StatusCode::CREATED, Json(goal)))
}

/// PUT /api/v1/assurance-goals/{id}
pub async fn update_goal(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    payload: Result<Json<UpdateGoal>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let input = super::require_json(payload)?;

    let goal = GoalRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("assurance goal", id)))?;
    tracing::info!(id = goal.id, "assurance goal updated");

    Ok(Json(goal))
}

/// DELETE /api/v1/assurance-goals/{id}
///
/// Classification links cascade; use cases keep their rows with the goal
/// cleared.
pub async fn delete_goal(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !GoalRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::not_found("assurance goal", id)));
    }
    tracing::info!(id, "assurance goal deleted");

    Ok(StatusCode::NO_CONTENT)
}
