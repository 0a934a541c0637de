//! Write payloads for technique operations.
//!
//! The same shapes serve the HTTP handlers (deserialised from request
//! bodies) and the importer (converted from bulk records). Every field is
//! optional: an absent field means "leave as is" on update, while an
//! explicitly empty collection means "remove everything".

use serde::Deserialize;
use serde_json::Value;
use tea_core::import::{ImportResource, ImportUseCase};
use tea_core::normalise::{GoalRef, ResourceTypeRef};
use tea_core::types::DbId;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TechniquePayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub acronym: Option<String>,
    pub complexity_rating: Option<i64>,
    pub computational_cost_rating: Option<i64>,
    pub assurance_goal_ids: Option<Vec<DbId>>,
    pub tag_ids: Option<Vec<DbId>>,
    pub related_technique_slugs: Option<Vec<String>>,
    pub resources: Option<Vec<ResourcePayload>>,
    pub example_use_cases: Option<Vec<UseCasePayload>>,
    pub limitations: Option<Vec<Value>>,
}

impl TechniquePayload {
    /// Whether any scalar technique column is being written. Used to skip
    /// the UPDATE statement entirely for payloads that only touch
    /// collections (or touch nothing at all).
    pub fn has_scalar_fields(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.acronym.is_some()
            || self.complexity_rating.is_some()
            || self.computational_cost_rating.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourcePayload {
    /// Resource type, by id or by name. Names are created on first use.
    #[serde(rename = "type", alias = "resource_type")]
    pub resource_type: Option<ResourceTypeRef>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    /// Free-form authors value; normalised to a comma-joined string.
    pub authors: Option<Value>,
    /// Raw date string in any of the accepted formats.
    pub publication_date: Option<String>,
    /// Defaults to the resource type's name when absent.
    pub source_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UseCasePayload {
    pub description: Option<String>,
    /// Owning goal, by id or by name. Unknown names degrade to null.
    #[serde(alias = "assurance_goal", alias = "assurance_goal_id")]
    pub goal: Option<GoalRef>,
}

impl From<ImportResource> for ResourcePayload {
    fn from(resource: ImportResource) -> Self {
        Self {
            resource_type: Some(resource.resource_type),
            title: Some(resource.title),
            url: Some(resource.url),
            description: resource.description,
            authors: resource.authors,
            publication_date: resource.publication_date,
            source_type: resource.source_type,
        }
    }
}

impl From<ImportUseCase> for UseCasePayload {
    fn from(use_case: ImportUseCase) -> Self {
        Self {
            description: Some(use_case.description),
            goal: use_case.goal,
        }
    }
}
