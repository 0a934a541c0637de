//! Repository for the `assurance_goals` table.

use sqlx::PgPool;
use tea_core::types::DbId;

use crate::models::goal::{AssuranceGoal, CreateGoal, UpdateGoal};

/// Column list for `assurance_goals` queries.
const COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Provides CRUD operations for assurance goals.
pub struct GoalRepo;

impl GoalRepo {
    /// Insert a new goal. A duplicate name surfaces as a unique violation.
    pub async fn create(pool: &PgPool, input: &CreateGoal) -> Result<AssuranceGoal, sqlx::Error> {
        let query = format!(
            "INSERT INTO assurance_goals (name, description) \
             VALUES ($1, COALESCE($2, '')) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AssuranceGoal>(&query)
            .bind(&input.name)
            .bind(input.description.as_deref())
            .fetch_one(pool)
            .await
    }

    /// Find a goal by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AssuranceGoal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assurance_goals WHERE id = $1");
        sqlx::query_as::<_, AssuranceGoal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a goal by its exact name.
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<AssuranceGoal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assurance_goals WHERE name = $1");
        sqlx::query_as::<_, AssuranceGoal>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Variant of [`Self::find_by_id`] reading through an open transaction.
    pub async fn find_by_id_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<AssuranceGoal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assurance_goals WHERE id = $1");
        sqlx::query_as::<_, AssuranceGoal>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Variant of [`Self::find_by_name`] reading through an open
    /// transaction.
    pub async fn find_by_name_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        name: &str,
    ) -> Result<Option<AssuranceGoal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assurance_goals WHERE name = $1");
        sqlx::query_as::<_, AssuranceGoal>(&query)
            .bind(name)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Of the given ids, return the ones that exist, sorted. Reads through
    /// an open transaction; the write pipeline uses this to report unknown
    /// goal references as field errors instead of constraint violations.
    pub async fn existing_ids_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM assurance_goals WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(&mut **tx)
            .await
    }

    /// Fetch a goal by name, creating it with an empty description if it
    /// does not exist. Runs inside the caller's transaction so the write
    /// pipeline sees a consistent snapshot.
    pub async fn get_or_create(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        name: &str,
    ) -> Result<AssuranceGoal, sqlx::Error> {
        sqlx::query("INSERT INTO assurance_goals (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&mut **tx)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM assurance_goals WHERE name = $1");
        sqlx::query_as::<_, AssuranceGoal>(&query)
            .bind(name)
            .fetch_one(&mut **tx)
            .await
    }

    /// List goals, optionally filtered by a name substring, with pagination.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AssuranceGoal>, sqlx::Error> {
        match search {
            Some(term) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM assurance_goals \
                     WHERE name ILIKE $1 \
                     ORDER BY name \
                     LIMIT $2 OFFSET $3"
                );
                sqlx::query_as::<_, AssuranceGoal>(&query)
                    .bind(format!("%{term}%"))
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM assurance_goals ORDER BY name LIMIT $1 OFFSET $2"
                );
                sqlx::query_as::<_, AssuranceGoal>(&query)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Count goals matching the same filter as [`Self::list`].
    pub async fn count(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        match search {
            Some(term) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM assurance_goals WHERE name ILIKE $1")
                    .bind(format!("%{term}%"))
                    .fetch_one(pool)
                    .await
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM assurance_goals")
                    .fetch_one(pool)
                    .await
            }
        }
    }

    /// Update a goal. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no goal with the given ID exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateGoal,
    ) -> Result<Option<AssuranceGoal>, sqlx::Error> {
        let query = format!(
            "UPDATE assurance_goals SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AssuranceGoal>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.description.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Delete a goal by ID. Classification links cascade and use cases
    /// referencing the goal have their goal cleared by the schema.
    ///
    /// Returns `true` if a goal was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM assurance_goals WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
