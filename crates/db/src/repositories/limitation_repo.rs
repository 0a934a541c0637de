//! Repository for the `limitations` table.

use sqlx::PgPool;

use crate::models::limitation::Limitation;

/// Column list for `limitations` queries.
const COLUMNS: &str = "id, technique_slug, description, created_at, updated_at";

/// Provides read and replace operations for technique limitations.
pub struct LimitationRepo;

impl LimitationRepo {
    /// List a technique's limitations in insertion order.
    pub async fn list_for_technique(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Vec<Limitation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM limitations WHERE technique_slug = $1 ORDER BY id"
        );
        sqlx::query_as::<_, Limitation>(&query)
            .bind(slug)
            .fetch_all(pool)
            .await
    }

    /// Batched variant of [`Self::list_for_technique`] for a page of
    /// techniques. Rows come back grouped by slug in insertion order.
    pub async fn list_for_techniques(
        pool: &PgPool,
        slugs: &[String],
    ) -> Result<Vec<Limitation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM limitations \
             WHERE technique_slug = ANY($1) \
             ORDER BY technique_slug, id"
        );
        sqlx::query_as::<_, Limitation>(&query)
            .bind(slugs)
            .fetch_all(pool)
            .await
    }

    /// Replace a technique's limitations within an open transaction.
    pub async fn replace_for_technique(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
        descriptions: &[String],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM limitations WHERE technique_slug = $1")
            .bind(slug)
            .execute(&mut **tx)
            .await?;

        for description in descriptions {
            sqlx::query("INSERT INTO limitations (technique_slug, description) VALUES ($1, $2)")
                .bind(slug)
                .bind(description)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    /// Repoint a technique's limitations at its new slug within an open
    /// transaction. Row ids are preserved.
    pub async fn update_owner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        old_slug: &str,
        new_slug: &str,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE limitations SET technique_slug = $2 WHERE technique_slug = $1")
                .bind(old_slug)
                .bind(new_slug)
                .execute(&mut **tx)
                .await?;
        Ok(result.rows_affected())
    }
}
