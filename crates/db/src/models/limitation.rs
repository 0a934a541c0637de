//! Limitation models.

use serde::Serialize;
use sqlx::FromRow;
use tea_core::types::{DbId, Timestamp};

/// A row from the `limitations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Limitation {
    pub id: DbId,
    pub technique_slug: String,
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
