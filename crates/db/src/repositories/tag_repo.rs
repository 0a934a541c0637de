//! Repository for the `tags` table.

use sqlx::PgPool;
use tea_core::types::DbId;

use crate::models::tag::{CreateTag, Tag, UpdateTag};

/// Column list for `tags` queries.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides CRUD operations for tags.
pub struct TagRepo;

impl TagRepo {
    /// Insert a new tag. A duplicate name surfaces as a unique violation.
    pub async fn create(pool: &PgPool, input: &CreateTag) -> Result<Tag, sqlx::Error> {
        let query = format!("INSERT INTO tags (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Tag>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find a tag by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE id = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a tag by its exact name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE name = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Of the given ids, return the ones that exist, sorted. Reads through
    /// an open transaction.
    pub async fn existing_ids_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM tags WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(&mut **tx)
            .await
    }

    /// Fetch a tag by name, creating it if it does not exist. Runs inside
    /// the caller's transaction.
    pub async fn get_or_create(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        name: &str,
    ) -> Result<Tag, sqlx::Error> {
        sqlx::query("INSERT INTO tags (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&mut **tx)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM tags WHERE name = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(name)
            .fetch_one(&mut **tx)
            .await
    }

    /// List tags, optionally filtered by a name substring, with pagination.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Tag>, sqlx::Error> {
        match search {
            Some(term) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM tags \
                     WHERE name ILIKE $1 \
                     ORDER BY name \
                     LIMIT $2 OFFSET $3"
                );
                sqlx::query_as::<_, Tag>(&query)
                    .bind(format!("%{term}%"))
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query =
                    format!("SELECT {COLUMNS} FROM tags ORDER BY name LIMIT $1 OFFSET $2");
                sqlx::query_as::<_, Tag>(&query)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Count tags matching the same filter as [`Self::list`].
    pub async fn count(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        match search {
            Some(term) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE name ILIKE $1")
                    .bind(format!("%{term}%"))
                    .fetch_one(pool)
                    .await
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM tags")
                    .fetch_one(pool)
                    .await
            }
        }
    }

    /// Rename a tag. Returns `None` if no tag with the given ID exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTag,
    ) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!(
            "UPDATE tags SET \
                 name = COALESCE($2, name), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Delete a tag by ID. Classification links cascade.
    ///
    /// Returns `true` if a tag was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
