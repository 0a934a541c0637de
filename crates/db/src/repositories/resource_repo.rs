//! Repository for the `resources` table.
//!
//! Resources are never edited row by row: the write pipeline replaces a
//! technique's full resource list inside a transaction, so the mutating
//! methods here all take an open transaction.

use sqlx::PgPool;

use crate::models::resource::{NewResource, ResourceWithType};

/// Column list for `resources` joined with the type name.
const JOINED_COLUMNS: &str = "\
    r.id, r.technique_slug, r.resource_type_id, rt.name AS resource_type_name, \
    r.title, r.url, r.description, r.authors, r.publication_date, r.source_type, \
    r.created_at, r.updated_at";

/// Provides read and replace operations for technique resources.
pub struct ResourceRepo;

impl ResourceRepo {
    /// List a technique's resources in insertion order, each with its
    /// resource type name.
    pub async fn list_for_technique(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Vec<ResourceWithType>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM resources r \
             JOIN resource_types rt ON rt.id = r.resource_type_id \
             WHERE r.technique_slug = $1 \
             ORDER BY r.id"
        );
        sqlx::query_as::<_, ResourceWithType>(&query)
            .bind(slug)
            .fetch_all(pool)
            .await
    }

    /// Batched variant of [`Self::list_for_technique`] for a page of
    /// techniques. Rows come back grouped by slug in insertion order.
    pub async fn list_for_techniques(
        pool: &PgPool,
        slugs: &[String],
    ) -> Result<Vec<ResourceWithType>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM resources r \
             JOIN resource_types rt ON rt.id = r.resource_type_id \
             WHERE r.technique_slug = ANY($1) \
             ORDER BY r.technique_slug, r.id"
        );
        sqlx::query_as::<_, ResourceWithType>(&query)
            .bind(slugs)
            .fetch_all(pool)
            .await
    }

    /// Replace a technique's resources within an open transaction.
    pub async fn replace_for_technique(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
        items: &[NewResource],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM resources WHERE technique_slug = $1")
            .bind(slug)
            .execute(&mut **tx)
            .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO resources \
                    (technique_slug, resource_type_id, title, url, \
                     description, authors, publication_date, source_type) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(slug)
            .bind(item.resource_type_id)
            .bind(&item.title)
            .bind(&item.url)
            .bind(&item.description)
            .bind(&item.authors)
            .bind(item.publication_date)
            .bind(&item.source_type)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Repoint a technique's resources at its new slug within an open
    /// transaction. Row ids are preserved.
    pub async fn update_owner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        old_slug: &str,
        new_slug: &str,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE resources SET technique_slug = $2 WHERE technique_slug = $1")
                .bind(old_slug)
                .bind(new_slug)
                .execute(&mut **tx)
                .await?;
        Ok(result.rows_affected())
    }
}
