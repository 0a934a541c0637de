//! Tag models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tea_core::types::{DbId, Timestamp};

/// A row from the `tags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a tag.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTag {
    pub name: String,
}

/// DTO for renaming a tag.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTag {
    pub name: Option<String>,
}
