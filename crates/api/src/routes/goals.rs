use axum::routing::get;
use axum::Router;

use crate::handlers::goals;
use crate::state::AppState;

/// Routes mounted at `/assurance-goals`.
///
/// ```text
/// GET    /        -> list_goals
/// POST   /        -> create_goal
/// GET    /{id}    -> get_goal
/// PUT    /{id}    -> update_goal
/// DELETE /{id}    -> delete_goal
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(goals::list_goals).post(goals::create_goal))
        .route(
            "/{id}",
            get(goals::get_goal)
                .put(goals::update_goal)
                .delete(goals::delete_goal),
        )
}
