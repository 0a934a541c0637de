//! Assurance goal models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tea_core::types::{DbId, Timestamp};

/// A row from the `assurance_goals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssuranceGoal {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an assurance goal.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGoal {
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating an assurance goal. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateGoal {
    pub name: Option<String>,
    pub description: Option<String>,
}
