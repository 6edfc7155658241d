//! Platform role store adapter

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct PlatformRole {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_system: bool,
    pub is_super_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct PlatformRoleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_system: Option<bool>,
}

pub async fn list(pool: &PgPool) -> Result<Vec<PlatformRole>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM platform_roles ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<PlatformRole>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM platform_roles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    name: &str,
    description: Option<&str>,
    is_system: bool,
    is_super_admin: bool,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO platform_roles (name, description, is_system, is_super_admin)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(name)
    .bind(description)
    .bind(is_system)
    .bind(is_super_admin)
    .fetch_one(executor)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    changes: &PlatformRoleUpdate,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE platform_roles
         SET name = COALESCE($2, name),
             description = COALESCE($3, description),
             is_system = COALESCE($4, is_system)
         WHERE id = $1",
    )
    .bind(id)
    .bind(changes.name.as_deref())
    .bind(changes.description.as_deref())
    .bind(changes.is_system)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// System roles are non-deletable built-ins; the delete skips them.
pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM platform_roles WHERE id = $1 AND NOT is_system")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
