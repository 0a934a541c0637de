//! Example use case models and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use tea_core::types::{DbId, Timestamp};

/// A use case joined with its goal name, as returned to clients. The goal
/// is optional both here and in the schema.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UseCaseWithGoal {
    pub id: DbId,
    pub technique_slug: String,
    pub description: String,
    pub assurance_goal_id: Option<DbId>,
    pub assurance_goal_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload for one use case, goal already resolved to an id.
#[derive(Debug, Clone)]
pub struct NewUseCase {
    pub description: String,
    pub assurance_goal_id: Option<DbId>,
}
