//! Handlers for tag CRUD.

use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tea_core::error::{CoreError, FieldErrors};
use tea_core::pagination::{clamp_page_size, offset};
use tea_core::types::DbId;
use tea_core::validate;
use tea_db::models::tag::{CreateTag, UpdateTag};
use tea_db::repositories::TagRepo;

use crate::auth::RequireAuth;
use crate::error::{AppError, AppResult};
use crate::query::ListParams;
use crate::response::Page;
use crate::state::AppState;

/// GET /api/v1/tags
pub async fn list_tags(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = clamp_page_size(params.page_size, state.config.page_size_max);
    let search = params.search.as_deref();

    let count = TagRepo::count(&state.pool, search).await?;
    let results = TagRepo::list(&state.pool, search, page_size, offset(page, page_size)).await?;

    Ok(Json(Page::new(&uri, count, page, page_size, results)))
}

/// GET /api/v1/tags/{id}
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let tag = TagRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("tag", id)))?;

    Ok(Json(tag))
}

/// POST /api/v1/tags
pub async fn create_tag(
    _auth: RequireAuth,
    State(state): State<AppState>,
    payload: Result<Json<CreateTag>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let input = super::require_json(payload)?;

    let mut errors = FieldErrors::new();
    validate::check_required(&mut errors, "name", &input.name);
    errors.into_result().map_err(AppError::Core)?;

    let tag = TagRepo::create(&state.pool, &input).await?;
    tracing::info!(id = tag.id, name = %tag.name, "tag created");

    Ok((StatusCode::CREATED, Json(tag)))
}

/// PUT /api/v1/tags/{id}
pub async fn update_tag(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    payload: Result<Json<UpdateTag>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let input = super::require_json(payload)?;

    let tag = TagRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("tag", id)))?;
    tracing::info!(id = tag.id, "tag updated");

    Ok(Json(tag))
}

/// DELETE /api/v1/tags/{id}
pub async fn delete_tag(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !TagRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::not_found("tag", id)));
    }
    tracing::info!(id, "tag deleted");

    Ok(StatusCode::NO_CONTENT)
}
