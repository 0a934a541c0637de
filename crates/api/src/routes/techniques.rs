use axum::routing::get;
use axum::Router;

use crate::handlers::techniques;
use crate::state::AppState;

/// Routes mounted at `/techniques`.
///
/// ```text
/// GET    /          -> list_techniques
/// POST   /          -> create_technique
/// GET    /{slug}    -> get_technique
/// PUT    /{slug}    -> update_technique
/// PATCH  /{slug}    -> update_technique
/// DELETE /{slug}    -> delete_technique
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(techniques::list_techniques).post(techniques::create_technique),
        )
        .route(
            "/{slug}",
            get(techniques::get_technique)
                .put(techniques::update_technique)
                .patch(techniques::update_technique)
                .delete(techniques::delete_technique),
        )
}
