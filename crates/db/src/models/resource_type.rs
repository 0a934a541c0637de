//! Resource type models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tea_core::types::{DbId, Timestamp};

/// A row from the `resource_types` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResourceType {
    pub id: DbId,
    pub name: String,
    pub icon: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a resource type.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateResourceType {
    pub name: String,
    pub icon: Option<String>,
}

/// DTO for updating a resource type. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateResourceType {
    pub name: Option<String>,
    pub icon: Option<String>,
}
