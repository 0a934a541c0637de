//! Repository for the `techniques` table and its classification links.
//!
//! Scalar rows, goal and tag links, and related-technique edges live here;
//! the owned child tables have their own repositories. Mutations that are
//! part of the technique write pipeline take an open transaction so the
//! whole write commits or rolls back as one unit.

use std::collections::HashMap;

use sqlx::PgPool;
use tea_core::types::{DbId, Timestamp};

use crate::models::goal::AssuranceGoal;
use crate::models::tag::Tag;
use crate::models::technique::{
    Technique, TechniqueDetail, TechniqueFields, TechniqueFilters, TechniqueOrdering,
};
use crate::repositories::{LimitationRepo, ResourceRepo, UseCaseRepo};

/// Column list for `techniques` queries.
const COLUMNS: &str = "\
    slug, name, acronym, description, \
    complexity_rating, computational_cost_rating, \
    created_at, updated_at";

/// Column list for `assurance_goals` behind a `g` alias.
const GOAL_COLUMNS: &str = "g.id, g.name, g.description, g.created_at, g.updated_at";

/// Column list for `tags` behind a `t` alias.
const TAG_COLUMNS: &str = "t.id, t.name, t.created_at, t.updated_at";

/// Provides CRUD, filtering, and link management for techniques.
pub struct TechniqueRepo;

impl TechniqueRepo {
    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Find a technique row by its slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Technique>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM techniques WHERE slug = $1");
        sqlx::query_as::<_, Technique>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Variant of [`Self::find_by_slug`] reading through an open
    /// transaction, so the write pipeline sees its own uncommitted rows.
    pub async fn find_by_slug_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
    ) -> Result<Option<Technique>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM techniques WHERE slug = $1");
        sqlx::query_as::<_, Technique>(&query)
            .bind(slug)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Find a technique row by its exact name, reading through an open
    /// transaction. The write pipeline uses this to match import records
    /// against existing rows.
    pub async fn find_by_name_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        name: &str,
    ) -> Result<Option<Technique>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM techniques WHERE name = $1");
        sqlx::query_as::<_, Technique>(&query)
            .bind(name)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Check whether a slug is taken, reading through an open transaction
    /// so slug derivation sees rows inserted earlier in the same write.
    pub async fn exists_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM techniques WHERE slug = $1")
            .bind(slug)
            .fetch_one(&mut **tx)
            .await?;
        Ok(count > 0)
    }

    /// Of the given slugs, return the ones that exist, sorted. Reads
    /// through an open transaction.
    pub async fn existing_slugs_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slugs: &[String],
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT slug FROM techniques WHERE slug = ANY($1) ORDER BY slug")
            .bind(slugs)
            .fetch_all(&mut **tx)
            .await
    }

    /// All technique slugs, sorted. Used by the exporter.
    pub async fn all_slugs(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT slug FROM techniques ORDER BY slug")
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Scalar row mutations (write pipeline)
    // -----------------------------------------------------------------------

    /// Insert a technique row within an open transaction.
    pub async fn insert(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
        fields: &TechniqueFields,
    ) -> Result<Technique, sqlx::Error> {
        let query = format!(
            "INSERT INTO techniques \
                (slug, name, acronym, description, complexity_rating, computational_cost_rating) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Technique>(&query)
            .bind(slug)
            .bind(&fields.name)
            .bind(fields.acronym.as_deref())
            .bind(&fields.description)
            .bind(fields.complexity_rating)
            .bind(fields.computational_cost_rating)
            .fetch_one(&mut **tx)
            .await
    }

    /// Overwrite every scalar column of a technique within an open
    /// transaction. Returns `None` if the slug does not exist.
    pub async fn update_fields(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
        fields: &TechniqueFields,
    ) -> Result<Option<Technique>, sqlx::Error> {
        let query = format!(
            "UPDATE techniques SET \
                 name = $2, \
                 acronym = $3, \
                 description = $4, \
                 complexity_rating = $5, \
                 computational_cost_rating = $6, \
                 updated_at = NOW() \
             WHERE slug = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Technique>(&query)
            .bind(slug)
            .bind(&fields.name)
            .bind(fields.acronym.as_deref())
            .bind(&fields.description)
            .bind(fields.complexity_rating)
            .bind(fields.computational_cost_rating)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Change a technique's slug and rewrite its classification links.
    ///
    /// Must run inside a transaction: the foreign keys on the link tables
    /// are deferred, so the parent key moves first and the link rows catch
    /// up before commit. The owned child tables are repointed separately by
    /// their repositories.
    pub async fn rename(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        old_slug: &str,
        new_slug: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE techniques SET slug = $2, updated_at = NOW() WHERE slug = $1")
            .bind(old_slug)
            .bind(new_slug)
            .execute(&mut **tx)
            .await?;
        sqlx::query("UPDATE technique_goals SET technique_slug = $2 WHERE technique_slug = $1")
            .bind(old_slug)
            .bind(new_slug)
            .execute(&mut **tx)
            .await?;
        sqlx::query("UPDATE technique_tags SET technique_slug = $2 WHERE technique_slug = $1")
            .bind(old_slug)
            .bind(new_slug)
            .execute(&mut **tx)
            .await?;
        sqlx::query("UPDATE technique_related SET from_slug = $2 WHERE from_slug = $1")
            .bind(old_slug)
            .bind(new_slug)
            .execute(&mut **tx)
            .await?;
        sqlx::query("UPDATE technique_related SET to_slug = $2 WHERE to_slug = $1")
            .bind(old_slug)
            .bind(new_slug)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Delete a technique by slug. Links and owned children cascade.
    ///
    /// Returns `true` if a technique was deleted.
    pub async fn delete(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM techniques WHERE slug = $1")
            .bind(slug)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every technique within an open transaction, cascading to
    /// links and owned children. Catalogues are untouched. Used by the
    /// importer's reset mode.
    pub async fn delete_all(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM techniques")
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    // -----------------------------------------------------------------------
    // Classification links
    // -----------------------------------------------------------------------

    /// Replace a technique's goal links within an open transaction.
    pub async fn replace_goals(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
        goal_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM technique_goals WHERE technique_slug = $1")
            .bind(slug)
            .execute(&mut **tx)
            .await?;

        for &goal_id in goal_ids {
            sqlx::query(
                "INSERT INTO technique_goals (technique_slug, goal_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(slug)
            .bind(goal_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Replace a technique's tag links within an open transaction.
    pub async fn replace_tags(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
        tag_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM technique_tags WHERE technique_slug = $1")
            .bind(slug)
            .execute(&mut **tx)
            .await?;

        for &tag_id in tag_ids {
            sqlx::query(
                "INSERT INTO technique_tags (technique_slug, tag_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(slug)
            .bind(tag_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Replace a technique's outgoing related-technique edges within an
    /// open transaction. Targets must already exist; the deferred foreign
    /// key reports dangling targets at commit.
    pub async fn replace_related(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
        related_slugs: &[String],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM technique_related WHERE from_slug = $1")
            .bind(slug)
            .execute(&mut **tx)
            .await?;

        for to_slug in related_slugs {
            sqlx::query(
                "INSERT INTO technique_related (from_slug, to_slug) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(slug)
            .bind(to_slug)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// List a technique's goals, sorted by name.
    pub async fn goals_for(pool: &PgPool, slug: &str) -> Result<Vec<AssuranceGoal>, sqlx::Error> {
        let query = format!(
            "SELECT {GOAL_COLUMNS} \
             FROM technique_goals tg \
             JOIN assurance_goals g ON g.id = tg.goal_id \
             WHERE tg.technique_slug = $1 \
             ORDER BY g.name"
        );
        sqlx::query_as::<_, AssuranceGoal>(&query)
            .bind(slug)
            .fetch_all(pool)
            .await
    }

    /// List a technique's tags, sorted by name.
    pub async fn tags_for(pool: &PgPool, slug: &str) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!(
            "SELECT {TAG_COLUMNS} \
             FROM technique_tags tt \
             JOIN tags t ON t.id = tt.tag_id \
             WHERE tt.technique_slug = $1 \
             ORDER BY t.name"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(slug)
            .fetch_all(pool)
            .await
    }

    /// List the slugs a technique points at, sorted.
    pub async fn related_for(pool: &PgPool, slug: &str) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT to_slug FROM technique_related WHERE from_slug = $1 ORDER BY to_slug",
        )
        .bind(slug)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Detail assembly
    // -----------------------------------------------------------------------

    /// Fetch a technique with its classifications and owned children.
    pub async fn get_detail(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<TechniqueDetail>, sqlx::Error> {
        let Some(technique) = Self::find_by_slug(pool, slug).await? else {
            return Ok(None);
        };

        let assurance_goals = Self::goals_for(pool, slug).await?;
        let tags = Self::tags_for(pool, slug).await?;
        let related_techniques = Self::related_for(pool, slug).await?;
        let resources = ResourceRepo::list_for_technique(pool, slug).await?;
        let example_use_cases = UseCaseRepo::list_for_technique(pool, slug).await?;
        let limitations = LimitationRepo::list_for_technique(pool, slug).await?;

        Ok(Some(TechniqueDetail {
            technique,
            assurance_goals,
            tags,
            related_techniques,
            resources,
            example_use_cases,
            limitations,
        }))
    }

    /// Fetch one page of techniques as full details.
    ///
    /// Children are prefetched with one query per collection for the whole
    /// page and regrouped in memory, so the query count does not grow with
    /// the page size.
    pub async fn list_details(
        pool: &PgPool,
        filters: &TechniqueFilters,
        ordering: TechniqueOrdering,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TechniqueDetail>, sqlx::Error> {
        let rows = Self::list(pool, filters, ordering, limit, offset).await?;
        let slugs: Vec<String> = rows.iter().map(|t| t.slug.clone()).collect();

        let mut goals = group_by_slug(
            Self::goals_for_techniques(pool, &slugs).await?,
            |(slug, _)| slug.clone(),
        );
        let mut tags = group_by_slug(
            Self::tags_for_techniques(pool, &slugs).await?,
            |(slug, _)| slug.clone(),
        );
        let mut related = group_by_slug(
            Self::related_for_techniques(pool, &slugs).await?,
            |(slug, _)| slug.clone(),
        );
        let mut resources = group_by_slug(
            ResourceRepo::list_for_techniques(pool, &slugs).await?,
            |r| r.technique_slug.clone(),
        );
        let mut use_cases = group_by_slug(
            UseCaseRepo::list_for_techniques(pool, &slugs).await?,
            |uc| uc.technique_slug.clone(),
        );
        let mut limitations = group_by_slug(
            LimitationRepo::list_for_techniques(pool, &slugs).await?,
            |l| l.technique_slug.clone(),
        );

        let mut details = Vec::with_capacity(rows.len());
        for technique in rows {
            let slug = technique.slug.clone();
            details.push(TechniqueDetail {
                technique,
                assurance_goals: take_grouped(&mut goals, &slug, |(_, g)| g),
                tags: take_grouped(&mut tags, &slug, |(_, t)| t),
                related_techniques: take_grouped(&mut related, &slug, |(_, s)| s),
                resources: resources.remove(&slug).unwrap_or_default(),
                example_use_cases: use_cases.remove(&slug).unwrap_or_default(),
                limitations: limitations.remove(&slug).unwrap_or_default(),
            });
        }

        Ok(details)
    }

    /// Goals for a set of techniques, as `(technique_slug, goal)` pairs.
    async fn goals_for_techniques(
        pool: &PgPool,
        slugs: &[String],
    ) -> Result<Vec<(String, AssuranceGoal)>, sqlx::Error> {
        let rows: Vec<SlugGoalRow> = sqlx::query_as(
            "SELECT tg.technique_slug, g.id, g.name, g.description, g.created_at, g.updated_at \
             FROM technique_goals tg \
             JOIN assurance_goals g ON g.id = tg.goal_id \
             WHERE tg.technique_slug = ANY($1) \
             ORDER BY tg.technique_slug, g.name",
        )
        .bind(slugs)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(SlugGoalRow::into_pair).collect())
    }

    /// Tags for a set of techniques, as `(technique_slug, tag)` pairs.
    async fn tags_for_techniques(
        pool: &PgPool,
        slugs: &[String],
    ) -> Result<Vec<(String, Tag)>, sqlx::Error> {
        let rows: Vec<SlugTagRow> = sqlx::query_as(
            "SELECT tt.technique_slug, t.id, t.name, t.created_at, t.updated_at \
             FROM technique_tags tt \
             JOIN tags t ON t.id = tt.tag_id \
             WHERE tt.technique_slug = ANY($1) \
             ORDER BY tt.technique_slug, t.name",
        )
        .bind(slugs)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(SlugTagRow::into_pair).collect())
    }

    /// Outgoing related edges for a set of techniques.
    async fn related_for_techniques(
        pool: &PgPool,
        slugs: &[String],
    ) -> Result<Vec<(String, String)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT from_slug, to_slug FROM technique_related \
             WHERE from_slug = ANY($1) \
             ORDER BY from_slug, to_slug",
        )
        .bind(slugs)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Filtered listing
    // -----------------------------------------------------------------------

    /// List technique rows with filters, ordering, and pagination.
    pub async fn list(
        pool: &PgPool,
        filters: &TechniqueFilters,
        ordering: TechniqueOrdering,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Technique>, sqlx::Error> {
        let (where_clause, bind_idx) = filter_conditions(filters);
        let query = format!(
            "SELECT {COLUMNS} FROM techniques \
             {where_clause} \
             ORDER BY {order} \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            order = ordering.sql(),
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Technique>(&query);
        if let Some(ref term) = filters.search {
            q = q.bind(format!("%{term}%"));
        }
        if let Some(ref name) = filters.name {
            q = q.bind(name);
        }
        if let Some(ref slug) = filters.slug {
            q = q.bind(slug);
        }
        if let Some(ref acronym) = filters.acronym {
            q = q.bind(acronym);
        }
        if !filters.goal_ids.is_empty() {
            q = q.bind(&filters.goal_ids);
        }
        if !filters.tag_ids.is_empty() {
            q = q.bind(&filters.tag_ids);
        }
        if let Some(rating) = filters.complexity_rating {
            q = q.bind(rating);
        }
        if let Some(rating) = filters.computational_cost_rating {
            q = q.bind(rating);
        }
        q = q.bind(limit).bind(offset);
        q.fetch_all(pool).await
    }

    /// Count techniques matching the same filters as [`Self::list`].
    pub async fn count(pool: &PgPool, filters: &TechniqueFilters) -> Result<i64, sqlx::Error> {
        let (where_clause, _) = filter_conditions(filters);
        let query = format!("SELECT COUNT(*) FROM techniques {where_clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        if let Some(ref term) = filters.search {
            q = q.bind(format!("%{term}%"));
        }
        if let Some(ref name) = filters.name {
            q = q.bind(name);
        }
        if let Some(ref slug) = filters.slug {
            q = q.bind(slug);
        }
        if let Some(ref acronym) = filters.acronym {
            q = q.bind(acronym);
        }
        if !filters.goal_ids.is_empty() {
            q = q.bind(&filters.goal_ids);
        }
        if !filters.tag_ids.is_empty() {
            q = q.bind(&filters.tag_ids);
        }
        if let Some(rating) = filters.complexity_rating {
            q = q.bind(rating);
        }
        if let Some(rating) = filters.computational_cost_rating {
            q = q.bind(rating);
        }
        q.fetch_one(pool).await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Joined row used when prefetching goals for a page of techniques.
#[derive(sqlx::FromRow)]
struct SlugGoalRow {
    technique_slug: String,
    id: DbId,
    name: String,
    description: String,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl SlugGoalRow {
    fn into_pair(self) -> (String, AssuranceGoal) {
        (
            self.technique_slug,
            AssuranceGoal {
                id: self.id,
                name: self.name,
                description: self.description,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        )
    }
}

/// Joined row used when prefetching tags for a page of techniques.
#[derive(sqlx::FromRow)]
struct SlugTagRow {
    technique_slug: String,
    id: DbId,
    name: String,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl SlugTagRow {
    fn into_pair(self) -> (String, Tag) {
        (
            self.technique_slug,
            Tag {
                id: self.id,
                name: self.name,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        )
    }
}

/// Group prefetched rows by technique slug, preserving row order within
/// each group.
fn group_by_slug<T, F>(rows: Vec<T>, key: F) -> HashMap<String, Vec<T>>
where
    F: Fn(&T) -> String,
{
    let mut grouped: HashMap<String, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(key(&row)).or_default().push(row);
    }
    grouped
}

/// Pull one technique's rows out of a grouped map, mapping each row to its
/// payload half.
fn take_grouped<T, U, F>(grouped: &mut HashMap<String, Vec<T>>, slug: &str, map: F) -> Vec<U>
where
    F: Fn(T) -> U,
{
    grouped
        .remove(slug)
        .unwrap_or_default()
        .into_iter()
        .map(map)
        .collect()
}

/// Build the WHERE clause for technique filtering. Returns the clause and
/// the next free bind index, so callers append LIMIT/OFFSET binds after the
/// filter binds.
fn filter_conditions(filters: &TechniqueFilters) -> (String, u32) {
    let mut conditions = Vec::new();
    let mut bind_idx = 1u32;

    if filters.search.is_some() {
        conditions.push(format!(
            "(name ILIKE ${bind_idx} \
              OR COALESCE(acronym, '') ILIKE ${bind_idx} \
              OR description ILIKE ${bind_idx})"
        ));
        bind_idx += 1;
    }
    if filters.name.is_some() {
        conditions.push(format!("name = ${bind_idx}"));
        bind_idx += 1;
    }
    if filters.slug.is_some() {
        conditions.push(format!("slug = ${bind_idx}"));
        bind_idx += 1;
    }
    if filters.acronym.is_some() {
        conditions.push(format!("acronym = ${bind_idx}"));
        bind_idx += 1;
    }
    if !filters.goal_ids.is_empty() {
        conditions.push(format!(
            "slug IN (SELECT technique_slug FROM technique_goals WHERE goal_id = ANY(${bind_idx}))"
        ));
        bind_idx += 1;
    }
    if !filters.tag_ids.is_empty() {
        conditions.push(format!(
            "slug IN (SELECT technique_slug FROM technique_tags WHERE tag_id = ANY(${bind_idx}))"
        ));
        bind_idx += 1;
    }
    if filters.complexity_rating.is_some() {
        conditions.push(format!("complexity_rating = ${bind_idx}"));
        bind_idx += 1;
    }
    if filters.computational_cost_rating.is_some() {
        conditions.push(format!("computational_cost_rating = ${bind_idx}"));
        bind_idx += 1;
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (where_clause, bind_idx)
}
