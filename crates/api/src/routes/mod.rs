pub mod goals;
pub mod health;
pub mod resource_types;
pub mod tags;
pub mod techniques;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /techniques                list (?search, ?name, ?slug, ?acronym,
///                                  ?complexity_rating, ?computational_cost_rating,
///                                  ?assurance_goals, ?tags, ?ordering,
///                                  ?page, ?page_size), create
/// /techniques/{slug}         get, update (PUT/PATCH), delete
///
/// /assurance-goals           list, create
/// /assurance-goals/{id}      get, update, delete
///
/// /tags                      list, create
/// /tags/{id}                 get, update, delete
///
/// /resource-types            list, create
/// /resource-types/{id}       get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Technique catalogue (slug-addressed).
        .nest("/techniques", techniques::router())
        // Supporting catalogue entities (id-addressed).
        .nest("/assurance-goals", goals::router())
        .nest("/tags", tags::router())
        .nest("/resource-types", resource_types::router())
}
