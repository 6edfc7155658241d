//! Merchant-side permission catalog store adapter (the `permissions` table)

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct Permission {
    pub id: i64,
    pub key_name: String,
    pub description: Option<String>,
    pub group_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct PermissionUpdate {
    pub key_name: Option<String>,
    pub description: Option<String>,
    pub group_name: Option<String>,
}

pub async fn list(pool: &PgPool) -> Result<Vec<Permission>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM permissions ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Permission>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM permissions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_key(pool: &PgPool, key_name: &str) -> Result<Option<Permission>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM permissions WHERE key_name = $1")
        .bind(key_name)
        .fetch_optional(pool)
        .await
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    key_name: &str,
    description: Option<&str>,
    group_name: Option<&str>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO permissions (key_name, description, group_name)
         VALUES ($1, $2, $3)
         RETURNING id",
    )
    .bind(key_name)
    .bind(description)
    .bind(group_name)
    .fetch_one(executor)
    .await
}

pub async fn update(pool: &PgPool, id: i64, changes: &PermissionUpdate) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE permissions
         SET key_name = COALESCE($2, key_name),
             description = COALESCE($3, description),
             group_name = COALESCE($4, group_name)
         WHERE id = $1",
    )
    .bind(id)
    .bind(changes.key_name.as_deref())
    .bind(changes.description.as_deref())
    .bind(changes.group_name.as_deref())
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
