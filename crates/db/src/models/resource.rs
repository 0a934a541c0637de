//! Resource models and DTOs.
//!
//! Resources are owned by a technique and carry a mandatory resource type.
//! Write operations always replace a technique's full resource list, so the
//! only insert DTO is [`NewResource`].

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use tea_core::types::{DbId, Timestamp};

/// A resource joined with its resource type name, as returned to clients.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResourceWithType {
    pub id: DbId,
    pub technique_slug: String,
    pub resource_type_id: DbId,
    pub resource_type_name: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub authors: String,
    pub publication_date: Option<NaiveDate>,
    pub source_type: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload for one resource, already normalised by the write
/// pipeline: the type is resolved to an id, authors flattened to a string,
/// the date parsed.
#[derive(Debug, Clone)]
pub struct NewResource {
    pub resource_type_id: DbId,
    pub title: String,
    pub url: String,
    pub description: String,
    pub authors: String,
    pub publication_date: Option<NaiveDate>,
    pub source_type: String,
}
