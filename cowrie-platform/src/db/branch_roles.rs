//! Branch role store adapter (merchant-scoped role table)

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

use crate::auth::permissions::BranchRoleRow;

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct BranchRole {
    pub id: i64,
    pub branch_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_system: bool,
    pub is_client: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct BranchRoleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_system: Option<bool>,
    pub is_client: Option<bool>,
}

pub async fn list(pool: &PgPool) -> Result<Vec<BranchRole>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM branch_roles ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<BranchRole>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM branch_roles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Name + client tag only, for read-only detection in the dual-audience gate
pub async fn find_role(pool: &PgPool, id: i64) -> Result<Option<BranchRoleRow>, sqlx::Error> {
    sqlx::query_as("SELECT name, is_client FROM branch_roles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    branch_id: i64,
    name: &str,
    description: Option<&str>,
    is_system: bool,
    is_client: bool,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO branch_roles (branch_id, name, description, is_system, is_client)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(branch_id)
    .bind(name)
    .bind(description)
    .bind(is_system)
    .bind(is_client)
    .fetch_one(executor)
    .await
}

pub async fn update(pool: &PgPool, id: i64, changes: &BranchRoleUpdate) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE branch_roles
         SET name = COALESCE($2, name),
             description = COALESCE($3, description),
             is_system = COALESCE($4, is_system),
             is_client = COALESCE($5, is_client)
         WHERE id = $1",
    )
    .bind(id)
    .bind(changes.name.as_deref())
    .bind(changes.description.as_deref())
    .bind(changes.is_system)
    .bind(changes.is_client)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// System roles are non-deletable built-ins; the delete skips them.
pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM branch_roles WHERE id = $1 AND NOT is_system")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
