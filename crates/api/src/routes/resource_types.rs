use axum::routing::get;
use axum::Router;

use crate::handlers::resource_types;
use crate::state::AppState;

/// Routes mounted at `/resource-types`.
///
/// ```text
/// GET    /        -> list_resource_types
/// POST   /        -> create_resource_type
/// GET    /{id}    -> get_resource_type
/// PUT    /{id}    -> update_resource_type
/// DELETE /{id}    -> delete_resource_type
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(resource_types::list_resource_types).post(resource_types::create_resource_type),
        )
        .route(
            "/{id}",
            get(resource_types::get_resource_type)
                .put(resource_types::update_resource_type)
                .delete(resource_types::delete_resource_type),
        )
}
