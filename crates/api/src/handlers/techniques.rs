//! Handlers for technique CRUD.
//!
//! Reads go straight to the repositories; every write goes through the
//! [`tea_service::TechniqueService`] so validation, reference resolution
//! and transactional ordering are identical for the API and the importer.

use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tea_core::error::CoreError;
use tea_core::pagination::{clamp_page_size, offset};
use tea_db::models::technique::{TechniqueDetail, TechniqueFilters, TechniqueOrdering};
use tea_db::repositories::TechniqueRepo;
use tea_service::TechniquePayload;

use crate::auth::RequireAuth;
use crate::error::{AppError, AppResult};
use crate::query::{parse_id_list, TechniqueListParams};
use crate::response::Page;
use crate::state::AppState;

/// GET /api/v1/techniques
///
/// Paginated list with filters, substring search, and ordering. Every row
/// carries its full nested collections, prefetched per page.
pub async fn list_techniques(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<TechniqueListParams>,
) -> AppResult<impl IntoResponse> {
    let filters = TechniqueFilters {
        search: params.search,
        name: params.name,
        slug: params.slug,
        acronym: params.acronym,
        goal_ids: parse_id_list("assurance_goals", params.assurance_goals.as_deref())?,
        tag_ids: parse_id_list("tags", params.tags.as_deref())?,
        complexity_rating: params.complexity_rating,
        computational_cost_rating: params.computational_cost_rating,
    };

    let ordering = match params.ordering.as_deref() {
        Some(raw) => TechniqueOrdering::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Cannot order by '{raw}'")))?,
        None => TechniqueOrdering::default(),
    };

    let page = params.page.unwrap_or(1).max(1);
    let page_size = clamp_page_size(params.page_size, state.config.page_size_max);

    let count = TechniqueRepo::count(&state.pool, &filters).await?;
    let results = TechniqueRepo::list_details(
        &state.pool,
        &filters,
        ordering,
        page_size,
        offset(page, page_size),
    )
    .await?;

    Ok(Json(Page::new(&uri, count, page, page_size, results)))
}

/// GET /api/v1/techniques/{slug}
///
/// Full detail with all nested collections inlined.
pub async fn get_technique(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let detail = TechniqueRepo::get_detail(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("technique", &slug)))?;

    Ok(Json(detail))
}

/// POST /api/v1/techniques
///
/// Create a technique with relations and children in one transaction.
/// Responds 201 with the full detail.
pub async fn create_technique(
    _auth: RequireAuth,
    State(state): State<AppState>,
    payload: Result<Json<TechniquePayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let payload = super::require_json(payload)?;

    let technique = state.techniques.create(&payload).await?;
    let detail = fetch_detail(&state, &technique.slug).await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

/// PUT and PATCH /api/v1/techniques/{slug}
///
/// Both verbs share the same merge semantics: absent fields preserve,
/// present collections replace. A new `slug` in the body triggers the
/// rename cascade and the response carries the detail at the new slug.
pub async fn update_technique(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    payload: Result<Json<TechniquePayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let payload = super::require_json(payload)?;

    let technique = state.techniques.update(&slug, &payload).await?;
    let detail = fetch_detail(&state, &technique.slug).await?;

    Ok(Json(detail))
}

/// DELETE /api/v1/techniques/{slug}
///
/// Cascades to classification links and owned children.
pub async fn delete_technique(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.techniques.delete(&slug).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Re-read a technique's detail after a committed write.
async fn fetch_detail(state: &AppState, slug: &str) -> Result<TechniqueDetail, AppError> {
    TechniqueRepo::get_detail(&state.pool, slug)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("technique '{slug}' missing after write")))
}
