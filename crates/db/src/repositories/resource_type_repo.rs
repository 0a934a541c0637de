//! Repository for the `resource_types` table.

use sqlx::PgPool;
use tea_core::types::DbId;

use crate::models::resource_type::{CreateResourceType, ResourceType, UpdateResourceType};

/// Column list for `resource_types` queries.
const COLUMNS: &str = "id, name, icon, created_at, updated_at";

/// Provides CRUD operations for resource types.
pub struct ResourceTypeRepo;

impl ResourceTypeRepo {
    /// Insert a new resource type. A duplicate name surfaces as a unique
    /// violation.
    pub async fn create(
        pool: &PgPool,
        input: &CreateResourceType,
    ) -> Result<ResourceType, sqlx::Error> {
        let query = format!(
            "INSERT INTO resource_types (name, icon) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ResourceType>(&query)
            .bind(&input.name)
            .bind(input.icon.as_deref())
            .fetch_one(pool)
            .await
    }

    /// Find a resource type by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ResourceType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM resource_types WHERE id = $1");
        sqlx::query_as::<_, ResourceType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a resource type by name, creating it if it does not exist.
    /// Runs inside the caller's transaction.
    pub async fn get_or_create(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        name: &str,
    ) -> Result<ResourceType, sqlx::Error> {
        sqlx::query("INSERT INTO resource_types (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&mut **tx)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM resource_types WHERE name = $1");
        sqlx::query_as::<_, ResourceType>(&query)
            .bind(name)
            .fetch_one(&mut **tx)
            .await
    }

    /// Look up a resource type by ID within an open transaction.
    pub async fn find_by_id_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<ResourceType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM resource_types WHERE id = $1");
        sqlx::query_as::<_, ResourceType>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// List resource types, optionally filtered by a name substring, with
    /// pagination.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ResourceType>, sqlx::Error> {
        match search {
            Some(term) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM resource_types \
                     WHERE name ILIKE $1 \
                     ORDER BY name \
                     LIMIT $2 OFFSET $3"
                );
                sqlx::query_as::<_, ResourceType>(&query)
                    .bind(format!("%{term}%"))
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM resource_types ORDER BY name LIMIT $1 OFFSET $2"
                );
                sqlx::query_as::<_, ResourceType>(&query)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Count resource types matching the same filter as [`Self::list`].
    pub async fn count(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        match search {
            Some(term) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM resource_types WHERE name ILIKE $1")
                    .bind(format!("%{term}%"))
                    .fetch_one(pool)
                    .await
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM resource_types")
                    .fetch_one(pool)
                    .await
            }
        }
    }

    /// Update a resource type. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no resource type with the given ID exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateResourceType,
    ) -> Result<Option<ResourceType>, sqlx::Error> {
        let query = format!(
            "UPDATE resource_types SET \
                 name = COALESCE($2, name), \
                 icon = COALESCE($3, icon), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ResourceType>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.icon.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Count resources still referencing a resource type. The schema
    /// restricts deletion while this is non-zero.
    pub async fn referencing_resources(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM resources WHERE resource_type_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a resource type by ID. Fails with a foreign key violation if
    /// any resource still references it.
    ///
    /// Returns `true` if a resource type was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM resource_types WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
