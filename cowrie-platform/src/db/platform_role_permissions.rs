//! Platform role ↔ permission binding store adapter
//!
//! Duplicate membership is idempotent: creating an existing pair returns the
//! existing row id instead of erroring.

use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct PlatformRolePermission {
    pub id: i64,
    pub platform_role_id: i64,
    pub platform_permission_id: i64,
}

pub async fn list(pool: &PgPool) -> Result<Vec<PlatformRolePermission>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM platform_role_permissions ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(
    pool: &PgPool,
    id: i64,
) -> Result<Option<PlatformRolePermission>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM platform_role_permissions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Insert-if-absent; returns the binding id either way
pub async fn create(
    pool: &PgPool,
    platform_role_id: i64,
    platform_permission_id: i64,
) -> Result<i64, sqlx::Error> {
    let inserted: Option<i64> = sqlx::query_scalar(
        "INSERT INTO platform_role_permissions (platform_role_id, platform_permission_id)
         VALUES ($1, $2)
         ON CONFLICT (platform_role_id, platform_permission_id) DO NOTHING
         RETURNING id",
    )
    .bind(platform_role_id)
    .bind(platform_permission_id)
    .fetch_optional(pool)
    .await?;

    match inserted {
        Some(id) => Ok(id),
        None => {
            sqlx::query_scalar(
                "SELECT id FROM platform_role_permissions
                 WHERE platform_role_id = $1 AND platform_permission_id = $2",
            )
            .bind(platform_role_id)
            .bind(platform_permission_id)
            .fetch_one(pool)
            .await
        }
    }
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM platform_role_permissions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
