//! Repository for the `use_cases` table.

use sqlx::PgPool;

use crate::models::use_case::{NewUseCase, UseCaseWithGoal};

/// Column list for `use_cases` joined with the goal name.
const JOINED_COLUMNS: &str = "\
    uc.id, uc.technique_slug, uc.description, uc.assurance_goal_id, \
    g.name AS assurance_goal_name, uc.created_at, uc.updated_at";

/// Provides read and replace operations for technique use cases.
pub struct UseCaseRepo;

impl UseCaseRepo {
    /// List a technique's use cases in insertion order, each with its goal
    /// name where one is set.
    pub async fn list_for_technique(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Vec<UseCaseWithGoal>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM use_cases uc \
             LEFT JOIN assurance_goals g ON g.id = uc.assurance_goal_id \
             WHERE uc.technique_slug = $1 \
             ORDER BY uc.id"
        );
        sqlx::query_as::<_, UseCaseWithGoal>(&query)
            .bind(slug)
            .fetch_all(pool)
            .await
    }

    /// Batched variant of [`Self::list_for_technique`] for a page of
    /// techniques. Rows come back grouped by slug in insertion order.
    pub async fn list_for_techniques(
        pool: &PgPool,
        slugs: &[String],
    ) -> Result<Vec<UseCaseWithGoal>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM use_cases uc \
             LEFT JOIN assurance_goals g ON g.id = uc.assurance_goal_id \
             WHERE uc.technique_slug = ANY($1) \
             ORDER BY uc.technique_slug, uc.id"
        );
        sqlx::query_as::<_, UseCaseWithGoal>(&query)
            .bind(slugs)
            .fetch_all(pool)
            .await
    }

    /// Replace a technique's use cases within an open transaction.
    pub async fn replace_for_technique(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slug: &str,
        items: &[NewUseCase],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM use_cases WHERE technique_slug = $1")
            .bind(slug)
            .execute(&mut **tx)
            .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO use_cases (technique_slug, description, assurance_goal_id) \
                 VALUES ($1, $2, $3)",
            )
            .bind(slug)
            .bind(&item.description)
            .bind(item.assurance_goal_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Repoint a technique's use cases at its new slug within an open
    /// transaction. Row ids are preserved.
    pub async fn update_owner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        old_slug: &str,
        new_slug: &str,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE use_cases SET technique_slug = $2 WHERE technique_slug = $1")
                .bind(old_slug)
                .bind(new_slug)
                .execute(&mut **tx)
                .await?;
        Ok(result.rows_affected())
    }
}
