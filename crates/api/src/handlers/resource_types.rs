//! Handlers for resource type CRUD.
//!
//! Resource types are protected against deletion while resources still
//! reference them; that check happens here so the client gets a 409 with
//! a usable message instead of a raw constraint failure.

use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tea_core::error::{CoreError, FieldErrors};
use tea_core::pagination::{clamp_page_size, offset};
use tea_core::types::DbId;
use tea_core::validate;
use tea_db::models::resource_type::{CreateResourceType, UpdateResourceType};
use tea_db::repositories::ResourceTypeRepo;

use crate::auth::RequireAuth;
use crate::error::{AppError, AppResult};
use crate::query::ListParams;
use crate::response::Page;
use crate::state::AppState;

/// GET /api/v1/resource-types
pub async fn list_resource_types(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = clamp_page_size(params.page_size, state.config.page_size_max);
    let search = params.search.as_deref();

    let count = ResourceTypeRepo::count(&state.pool, search).await?;
    let results =
        ResourceTypeRepo::list(&state.pool, search, page_size, offset(page, page_size)).await?;

    Ok(Json(Page::new(&uri, count, page, page_size, results)))
}

/// GET /api/v1/resource-types/{id}
pub async fn get_resource_type(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let resource_type = ResourceTypeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("resource type", id)))?;

    Ok(Json(resource_type))
}

/// POST /api/v1/resource-types
pub async fn create_resource_type(
    _auth: RequireAuth,
    State(state): State<AppState>,
    payload: Result<Json<CreateResourceType>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let input = super::require_json(payload)?;

    let mut errors = FieldErrors::new();
    validate::check_required(&mut errors, "name", &input.name);
    errors.into_result().map_err(AppError::Core)?;

    let resource_type = ResourceTypeRepo::create(&state.pool, &input).await?;
    tracing::info!(id = resource_type.id, name = %resource_type.name, "resource type created");

    Ok((StatusCode::CREATED, Json(resource_type)))
}

/// PUT /api/v1/resource-types/{id}
pub async fn update_resource_type(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    payload: Result<Json<UpdateResourceType>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let input = super::require_json(payload)?;

    let resource_type = ResourceTypeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("resource type", id)))?;
    tracing::info!(id = resource_type.id, "resource type updated");

    Ok(Json(resource_type))
}

/// DELETE /api/v1/resource-types/{id}
///
/// Returns 409 while any resource still references the type; the schema's
/// RESTRICT rule backs this up against races.
pub async fn delete_resource_type(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let referencing = ResourceTypeRepo::referencing_resources(&state.pool, id).await?;
    if referencing > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Resource type {id} is referenced by {referencing} resource(s)"
        ))));
    }

    if !ResourceTypeRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::not_found("resource type", id)));
    }
    tracing::info!(id, "resource type deleted");

    Ok(StatusCode::NO_CONTENT)
}
