//! The technique write pipeline.
//!
//! Every mutation of a technique and its owned rows runs through here, in
//! a single transaction per call: validate the payload, resolve references,
//! write the scalar row, then replace links and children. A failure at any
//! step rolls the whole call back.

use tea_core::error::{CoreError, FieldErrors};
use tea_core::import::ImportRecord;
use tea_core::normalise::{self, GoalRef, ResourceTypeRef};
use tea_core::slug::{candidate, extract_acronym, slugify};
use tea_core::types::DbId;
use tea_core::{dates, validate};
use tea_db::models::resource::NewResource;
use tea_db::models::technique::{Technique, TechniqueFields};
use tea_db::models::use_case::NewUseCase;
use tea_db::repositories::{
    GoalRepo, LimitationRepo, ResourceRepo, ResourceTypeRepo, TagRepo, TechniqueRepo, UseCaseRepo,
};
use tea_db::DbPool;

use crate::error::TechniqueError;
use crate::payload::{ResourcePayload, TechniquePayload, UseCasePayload};

/// What an import upsert did, carrying the slug the technique ended up
/// under (which may differ from the record's after a rename).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(String),
    Updated(String),
}

impl UpsertOutcome {
    pub fn slug(&self) -> &str {
        match self {
            Self::Created(slug) | Self::Updated(slug) => slug,
        }
    }
}

pub struct TechniqueService {
    pool: DbPool,
}

impl TechniqueService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // -----------------------------------------------------------------------
    // Pool-level operations
    // -----------------------------------------------------------------------

    /// Create a technique with its links and children in one transaction.
    pub async fn create(&self, payload: &TechniquePayload) -> Result<Technique, TechniqueError> {
        let mut tx = self.pool.begin().await?;
        let technique = Self::create_in_tx(&mut tx, payload).await?;
        tx.commit().await?;
        tracing::info!(slug = %technique.slug, "technique created");
        Ok(technique)
    }

    /// Update a technique in one transaction. Returns the row under its
    /// final slug, which differs from `slug` after a rename.
    pub async fn update(
        &self,
        slug: &str,
        payload: &TechniquePayload,
    ) -> Result<Technique, TechniqueError> {
        let mut tx = self.pool.begin().await?;
        let technique = Self::update_in_tx(&mut tx, slug, payload).await?;
        tx.commit().await?;
        tracing::info!(slug = %technique.slug, "technique updated");
        Ok(technique)
    }

    /// Delete a technique. Links and owned children go with it.
    pub async fn delete(&self, slug: &str) -> Result<(), TechniqueError> {
        if TechniqueRepo::delete(&self.pool, slug).await? {
            tracing::info!(slug = %slug, "technique deleted");
            Ok(())
        } else {
            Err(TechniqueError::not_found("technique", slug))
        }
    }

    // -----------------------------------------------------------------------
    // Transaction-level operations
    // -----------------------------------------------------------------------

    /// Create a technique inside the caller's transaction.
    ///
    /// The slug is taken from the payload verbatim when supplied (a
    /// collision then surfaces as a key conflict), otherwise derived from
    /// the name with `-2`, `-3`, ... suffixes until free. A missing acronym
    /// is pulled out of a parenthesised group in the name when one exists.
    async fn create_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        payload: &TechniquePayload,
    ) -> Result<Technique, TechniqueError> {
        Self::validate_payload(payload, true).into_result()?;

        let name = payload.name.as_deref().unwrap_or_default().trim().to_string();
        let description = payload
            .description
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_string();

        let slug = match payload.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => slug.to_string(),
            None => Self::derive_slug(tx, &name).await?,
        };

        let acronym = payload
            .acronym
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .or_else(|| extract_acronym(&name));

        let fields = TechniqueFields {
            name,
            acronym,
            description,
            complexity_rating: payload.complexity_rating.map(|r| r as i32),
            computational_cost_rating: payload.computational_cost_rating.map(|r| r as i32),
        };
        let technique = TechniqueRepo::insert(tx, &slug, &fields).await?;

        Self::apply_links(tx, &slug, payload).await?;
        Self::apply_children(tx, &slug, payload).await?;

        Ok(technique)
    }

    /// Update a technique inside the caller's transaction.
    ///
    /// Absent fields are left untouched; present collections replace the
    /// stored ones wholesale. Steps run in a fixed order so a payload that
    /// both renames and rewrites children behaves deterministically:
    /// links on the old slug, scalar columns, the rename (repointing every
    /// owned row, ids preserved), then children on the final slug.
    async fn update_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
        payload: &TechniquePayload,
    ) -> Result<Technique, TechniqueError> {
        Self::validate_payload(payload, false).into_result()?;

        let existing = TechniqueRepo::find_by_slug_tx(tx, slug)
            .await?
            .ok_or_else(|| TechniqueError::not_found("technique", slug))?;

        Self::apply_links(tx, slug, payload).await?;

        // Scalar columns merge over the current row. Skipped entirely when
        // the payload carries none, so `{}` is a true no-op.
        if payload.has_scalar_fields() {
            let fields = TechniqueFields {
                name: match payload.name.as_deref() {
                    Some(name) => name.trim().to_string(),
                    None => existing.name.clone(),
                },
                acronym: match payload.acronym.as_deref() {
                    // An explicit empty string clears the acronym.
                    Some(acronym) if acronym.trim().is_empty() => None,
                    Some(acronym) => Some(acronym.trim().to_string()),
                    None => existing.acronym.clone(),
                },
                description: match payload.description.as_deref() {
                    Some(description) => description.trim().to_string(),
                    None => existing.description.clone(),
                },
                complexity_rating: payload
                    .complexity_rating
                    .map(|r| r as i32)
                    .or(existing.complexity_rating),
                computational_cost_rating: payload
                    .computational_cost_rating
                    .map(|r| r as i32)
                    .or(existing.computational_cost_rating),
            };
            TechniqueRepo::update_fields(tx, slug, &fields).await?;
        }

        let requested_slug = payload
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let final_slug = match requested_slug {
            Some(new_slug) if new_slug != slug => {
                TechniqueRepo::rename(tx, slug, new_slug).await?;
                ResourceRepo::update_owner(tx, slug, new_slug).await?;
                UseCaseRepo::update_owner(tx, slug, new_slug).await?;
                LimitationRepo::update_owner(tx, slug, new_slug).await?;
                new_slug.to_string()
            }
            _ => slug.to_string(),
        };

        Self::apply_children(tx, &final_slug, payload).await?;

        TechniqueRepo::find_by_slug_tx(tx, &final_slug)
            .await?
            .ok_or_else(|| {
                TechniqueError::Core(CoreError::Internal(
                    "technique row vanished mid-update".into(),
                ))
            })
    }

    /// Create or update a technique from a bulk import record, inside the
    /// caller's transaction.
    ///
    /// Records match existing techniques by name, so a record without a
    /// slug leaves an existing technique's slug alone. Goal, tag and
    /// resource-type names are created on first use. Related techniques
    /// are NOT linked here; the importer applies them in a second pass
    /// once every record's technique row exists.
    pub async fn upsert_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        record: &ImportRecord,
    ) -> Result<UpsertOutcome, TechniqueError> {
        let mut goal_ids = Vec::with_capacity(record.assurance_goals.len());
        for name in &record.assurance_goals {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            goal_ids.push(GoalRepo::get_or_create(tx, name).await?.id);
        }

        let mut tag_ids = Vec::with_capacity(record.tags.len());
        for name in &record.tags {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            tag_ids.push(TagRepo::get_or_create(tx, name).await?.id);
        }

        let payload = TechniquePayload {
            name: Some(record.name.clone()),
            description: Some(record.description.clone()),
            slug: record.slug.clone(),
            acronym: record.acronym.clone(),
            complexity_rating: record.complexity_rating,
            computational_cost_rating: record.computational_cost_rating,
            assurance_goal_ids: Some(goal_ids),
            tag_ids: Some(tag_ids),
            related_technique_slugs: None,
            resources: Some(record.resources.iter().cloned().map(Into::into).collect()),
            example_use_cases: Some(
                record
                    .example_use_cases
                    .iter()
                    .cloned()
                    .map(Into::into)
                    .collect(),
            ),
            limitations: Some(record.limitations.clone()),
        };

        match TechniqueRepo::find_by_name_tx(tx, record.name.trim()).await? {
            Some(existing) => {
                let technique = Self::update_in_tx(tx, &existing.slug, &payload).await?;
                Ok(UpsertOutcome::Updated(technique.slug))
            }
            None => {
                let technique = Self::create_in_tx(tx, &payload).await?;
                Ok(UpsertOutcome::Created(technique.slug))
            }
        }
    }

    /// Link a technique to its related techniques, dropping targets that
    /// do not exist yet. Unknown targets are logged and skipped so one
    /// dangling reference does not sink a whole import. Returns the number
    /// of links written.
    pub async fn apply_related_lenient(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
        related: &[String],
    ) -> Result<usize, TechniqueError> {
        let mut targets: Vec<String> = Vec::new();
        for target in related {
            let target = target.trim();
            if target.is_empty() || target == slug || targets.iter().any(|t| t == target) {
                continue;
            }
            targets.push(target.to_string());
        }

        let existing = if targets.is_empty() {
            Vec::new()
        } else {
            TechniqueRepo::existing_slugs_tx(tx, &targets).await?
        };
        for target in &targets {
            if !existing.contains(target) {
                tracing::warn!(
                    slug = %slug,
                    target = %target,
                    "related technique not found, skipping link"
                );
            }
        }

        TechniqueRepo::replace_related(tx, slug, &existing).await?;
        Ok(existing.len())
    }

    // -----------------------------------------------------------------------
    // Validation and reference resolution
    // -----------------------------------------------------------------------

    fn validate_payload(payload: &TechniquePayload, creating: bool) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if creating || payload.name.is_some() {
            validate::check_required(&mut errors, "name", payload.name.as_deref().unwrap_or(""));
        }
        if creating || payload.description.is_some() {
            validate::check_required(
                &mut errors,
                "description",
                payload.description.as_deref().unwrap_or(""),
            );
        }

        validate::check_rating(&mut errors, "complexity_rating", payload.complexity_rating);
        validate::check_rating(
            &mut errors,
            "computational_cost_rating",
            payload.computational_cost_rating,
        );

        if let Some(resources) = &payload.resources {
            for (index, resource) in resources.iter().enumerate() {
                if resource.resource_type.is_none() {
                    errors.push(format!("resources[{index}].type"), validate::MSG_REQUIRED);
                }
                validate::check_required(
                    &mut errors,
                    &format!("resources[{index}].title"),
                    resource.title.as_deref().unwrap_or(""),
                );
                match resource.url.as_deref() {
                    Some(url) => {
                        validate::check_url(&mut errors, &format!("resources[{index}].url"), url)
                    }
                    None => errors.push(format!("resources[{index}].url"), validate::MSG_REQUIRED),
                }
            }
        }

        if let Some(use_cases) = &payload.example_use_cases {
            for (index, use_case) in use_cases.iter().enumerate() {
                validate::check_required(
                    &mut errors,
                    &format!("example_use_cases[{index}].description"),
                    use_case.description.as_deref().unwrap_or(""),
                );
            }
        }

        errors
    }

    async fn derive_slug(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        name: &str,
    ) -> Result<String, TechniqueError> {
        let base = slugify(name);
        if base.is_empty() {
            return Err(TechniqueError::validation(FieldErrors::single(
                "name",
                "Cannot derive a slug from this name.",
            )));
        }
        let mut n = 1;
        loop {
            let slug = candidate(&base, n);
            if !TechniqueRepo::exists_tx(tx, &slug).await? {
                return Ok(slug);
            }
            n += 1;
        }
    }

    async fn apply_links(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
        payload: &TechniquePayload,
    ) -> Result<(), TechniqueError> {
        if let Some(ids) = &payload.assurance_goal_ids {
            Self::set_goals(tx, slug, ids).await?;
        }
        if let Some(ids) = &payload.tag_ids {
            Self::set_tags(tx, slug, ids).await?;
        }
        if let Some(related) = &payload.related_technique_slugs {
            Self::set_related(tx, slug, related).await?;
        }
        Ok(())
    }

    async fn apply_children(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
        payload: &TechniquePayload,
    ) -> Result<(), TechniqueError> {
        if let Some(resources) = &payload.resources {
            let rows = Self::resolve_resources(tx, resources).await?;
            ResourceRepo::replace_for_technique(tx, slug, &rows).await?;
        }
        if let Some(use_cases) = &payload.example_use_cases {
            let rows = Self::resolve_use_cases(tx, use_cases).await?;
            UseCaseRepo::replace_for_technique(tx, slug, &rows).await?;
        }
        if let Some(limitations) = &payload.limitations {
            let descriptions: Vec<String> = limitations
                .iter()
                .filter_map(normalise::parse_limitation)
                .collect();
            LimitationRepo::replace_for_technique(tx, slug, &descriptions).await?;
        }
        Ok(())
    }

    async fn set_goals(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
        ids: &[DbId],
    ) -> Result<(), TechniqueError> {
        if !ids.is_empty() {
            let existing = GoalRepo::existing_ids_tx(tx, ids).await?;
            let missing = missing_ids(ids, &existing);
            if !missing.is_empty() {
                return Err(TechniqueError::validation(FieldErrors::single(
                    "assurance_goal_ids",
                    format!("Unknown assurance goal ids: {}.", join_ids(&missing)),
                )));
            }
        }
        TechniqueRepo::replace_goals(tx, slug, ids).await?;
        Ok(())
    }

    async fn set_tags(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
        ids: &[DbId],
    ) -> Result<(), TechniqueError> {
        if !ids.is_empty() {
            let existing = TagRepo::existing_ids_tx(tx, ids).await?;
            let missing = missing_ids(ids, &existing);
            if !missing.is_empty() {
                return Err(TechniqueError::validation(FieldErrors::single(
                    "tag_ids",
                    format!("Unknown tag ids: {}.", join_ids(&missing)),
                )));
            }
        }
        TechniqueRepo::replace_tags(tx, slug, ids).await?;
        Ok(())
    }

    /// Strict variant used by the API: every target must exist and a
    /// technique cannot point at itself.
    async fn set_related(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
        related: &[String],
    ) -> Result<(), TechniqueError> {
        let mut targets: Vec<String> = Vec::new();
        for target in related {
            let target = target.trim();
            if target.is_empty() || targets.iter().any(|t| t == target) {
                continue;
            }
            targets.push(target.to_string());
        }

        let mut errors = FieldErrors::new();
        if targets.iter().any(|target| target == slug) {
            errors.push(
                "related_technique_slugs",
                "A technique cannot be related to itself.",
            );
        }

        let existing = if targets.is_empty() {
            Vec::new()
        } else {
            TechniqueRepo::existing_slugs_tx(tx, &targets).await?
        };
        let mut missing: Vec<String> = Vec::new();
        for target in &targets {
            if !existing.contains(target) {
                missing.push(target.clone());
            }
        }
        if !missing.is_empty() {
            errors.push(
                "related_technique_slugs",
                format!("Unknown related technique slugs: {}.", missing.join(", ")),
            );
        }
        errors.into_result()?;

        TechniqueRepo::replace_related(tx, slug, &targets).await?;
        Ok(())
    }

    async fn resolve_resources(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        payloads: &[ResourcePayload],
    ) -> Result<Vec<NewResource>, TechniqueError> {
        let mut rows = Vec::with_capacity(payloads.len());
        for (index, resource) in payloads.iter().enumerate() {
            let resource_type = match &resource.resource_type {
                Some(ResourceTypeRef::Id(id)) => ResourceTypeRepo::find_by_id_tx(tx, *id)
                    .await?
                    .ok_or_else(|| {
                        TechniqueError::validation(FieldErrors::single(
                            format!("resources[{index}].type"),
                            format!("Unknown resource type id: {id}."),
                        ))
                    })?,
                Some(ResourceTypeRef::Name(name)) => {
                    ResourceTypeRepo::get_or_create(tx, name.trim()).await?
                }
                // Caught by validation before resolution starts.
                None => {
                    return Err(TechniqueError::validation(FieldErrors::single(
                        format!("resources[{index}].type"),
                        validate::MSG_REQUIRED,
                    )))
                }
            };

            let authors = resource
                .authors
                .as_ref()
                .map(normalise::parse_authors)
                .unwrap_or_default();

            let publication_date = match resource.publication_date.as_deref() {
                Some(raw) if !raw.trim().is_empty() => {
                    let parsed = dates::parse_publication_date(raw);
                    if parsed.is_none() {
                        tracing::warn!(date = %raw, "unparseable publication date, storing null");
                    }
                    parsed
                }
                _ => None,
            };

            let source_type = resource
                .source_type
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .unwrap_or_else(|| resource_type.name.clone());

            rows.push(NewResource {
                resource_type_id: resource_type.id,
                title: resource.title.as_deref().unwrap_or_default().trim().to_string(),
                url: resource.url.as_deref().unwrap_or_default().trim().to_string(),
                description: resource
                    .description
                    .as_deref()
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
                authors,
                publication_date,
                source_type,
            });
        }
        Ok(rows)
    }

    async fn resolve_use_cases(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        payloads: &[UseCasePayload],
    ) -> Result<Vec<NewUseCase>, TechniqueError> {
        let mut rows = Vec::with_capacity(payloads.len());
        for (index, use_case) in payloads.iter().enumerate() {
            let assurance_goal_id = match &use_case.goal {
                Some(GoalRef::Id(id)) => Some(
                    GoalRepo::find_by_id_tx(tx, *id)
                        .await?
                        .ok_or_else(|| {
                            TechniqueError::validation(FieldErrors::single(
                                format!("example_use_cases[{index}].assurance_goal"),
                                format!("Unknown assurance goal id: {id}."),
                            ))
                        })?
                        .id,
                ),
                Some(GoalRef::Name(name)) => {
                    match GoalRepo::find_by_name_tx(tx, name.trim()).await? {
                        Some(goal) => Some(goal.id),
                        // Unknown names degrade to an unclassified use case
                        // rather than failing the whole write.
                        None => {
                            tracing::warn!(
                                goal = %name,
                                "unknown assurance goal on use case, storing null"
                            );
                            None
                        }
                    }
                }
                None => None,
            };

            rows.push(NewUseCase {
                description: use_case
                    .description
                    .as_deref()
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
                assurance_goal_id,
            });
        }
        Ok(rows)
    }
}

fn missing_ids(requested: &[DbId], existing: &[DbId]) -> Vec<DbId> {
    let mut missing: Vec<DbId> = Vec::new();
    for id in requested {
        if !existing.contains(id) && !missing.contains(id) {
            missing.push(*id);
        }
    }
    missing.sort_unstable();
    missing
}

fn join_ids(ids: &[DbId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ids_reports_sorted_unique() {
        assert_eq!(missing_ids(&[9, 2, 9, 1], &[1]), vec![2, 9]);
        assert!(missing_ids(&[1, 2], &[1, 2]).is_empty());
    }

    #[test]
    fn payload_scalar_detection() {
        let empty = TechniquePayload::default();
        assert!(!empty.has_scalar_fields());

        let collections_only = TechniquePayload {
            tag_ids: Some(vec![1]),
            limitations: Some(Vec::new()),
            ..TechniquePayload::default()
        };
        assert!(!collections_only.has_scalar_fields());

        let renames_only = TechniquePayload {
            slug: Some("new-slug".into()),
            ..TechniquePayload::default()
        };
        assert!(!renames_only.has_scalar_fields());

        let with_name = TechniquePayload {
            name: Some("SHAP".into()),
            ..TechniquePayload::default()
        };
        assert!(with_name.has_scalar_fields());
    }

    #[test]
    fn validate_create_requires_name_and_description() {
        let errors = TechniqueService::validate_payload(&TechniquePayload::default(), true);
        let fields: Vec<&str> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec!["description", "name"]);
    }

    #[test]
    fn validate_update_accepts_empty_payload() {
        let errors = TechniqueService::validate_payload(&TechniquePayload::default(), false);
        assert!(errors.is_empty());
    }

    #[test]
    fn validate_update_rejects_blank_provided_name() {
        let payload = TechniquePayload {
            name: Some("   ".into()),
            ..TechniquePayload::default()
        };
        let errors = TechniqueService::validate_payload(&payload, false);
        assert!(!errors.is_empty());
    }

    #[test]
    fn validate_flags_nested_resource_fields_by_index() {
        let payload = TechniquePayload {
            name: Some("SHAP".into()),
            description: Some("Feature attribution.".into()),
            resources: Some(vec![
                ResourcePayload {
                    resource_type: None,
                    title: Some("Paper".into()),
                    url: Some("https://example.org/shap".into()),
                    description: None,
                    authors: None,
                    publication_date: None,
                    source_type: None,
                },
                ResourcePayload {
                    resource_type: Some(ResourceTypeRef::Name("Paper".into())),
                    title: None,
                    url: Some("not a url".into()),
                    description: None,
                    authors: None,
                    publication_date: None,
                    source_type: None,
                },
            ]),
            ..TechniquePayload::default()
        };
        let errors = TechniqueService::validate_payload(&payload, true);
        let fields: Vec<&str> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(
            fields,
            vec!["resources[0].type", "resources[1].title", "resources[1].url"]
        );
    }

    #[test]
    fn validate_rejects_out_of_range_ratings() {
        let payload = TechniquePayload {
            name: Some("SHAP".into()),
            description: Some("Feature attribution.".into()),
            complexity_rating: Some(0),
            computational_cost_rating: Some(6),
            ..TechniquePayload::default()
        };
        let errors = TechniqueService::validate_payload(&payload, true);
        let fields: Vec<&str> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec!["complexity_rating", "computational_cost_rating"]);
    }
}
