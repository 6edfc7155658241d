//! Branch role ↔ permission binding store adapter
//!
//! Same idempotent-insert contract as the platform-side binding table.

use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct BranchRolePermission {
    pub id: i64,
    pub branch_role_id: i64,
    pub permission_id: i64,
}

pub async fn list(pool: &PgPool) -> Result<Vec<BranchRolePermission>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM branch_role_permissions ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(
    pool: &PgPool,
    id: i64,
) -> Result<Option<BranchRolePermission>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM branch_role_permissions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Insert-if-absent; returns the binding id either way
pub async fn create(
    pool: &PgPool,
    branch_role_id: i64,
    permission_id: i64,
) -> Result<i64, sqlx::Error> {
    let inserted: Option<i64> = sqlx::query_scalar(
        "INSERT INTO branch_role_permissions (branch_role_id, permission_id)
         VALUES ($1, $2)
         ON CONFLICT (branch_role_id, permission_id) DO NOTHING
         RETURNING id",
    )
    .bind(branch_role_id)
    .bind(permission_id)
    .fetch_optional(pool)
    .await?;

    match inserted {
        Some(id) => Ok(id),
        None => {
            sqlx::query_scalar(
                "SELECT id FROM branch_role_permissions
                 WHERE branch_role_id = $1 AND permission_id = $2",
            )
            .bind(branch_role_id)
            .bind(permission_id)
            .fetch_one(pool)
            .await
        }
    }
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM branch_role_permissions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
