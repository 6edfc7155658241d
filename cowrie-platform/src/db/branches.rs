//! Branch store adapter

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct Branch {
    pub id: i64,
    pub merchant_id: i64,
    pub parent_branch_id: Option<i64>,
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    pub branch_type: String,
    pub is_main: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct BranchUpdate {
    pub parent_branch_id: Option<i64>,
    pub name: Option<String>,
    pub code: Option<String>,
    pub branch_type: Option<String>,
    pub is_main: Option<bool>,
    pub status: Option<String>,
}

pub async fn list(pool: &PgPool) -> Result<Vec<Branch>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM branches ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Branches visible to a merchant-scoped caller
pub async fn list_for_merchant(pool: &PgPool, merchant_id: i64) -> Result<Vec<Branch>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM branches WHERE merchant_id = $1 ORDER BY id")
        .bind(merchant_id)
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Branch>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM branches WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

#[allow(clippy::too_many_arguments)]
pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    merchant_id: i64,
    parent_branch_id: Option<i64>,
    name: &str,
    code: &str,
    branch_type: &str,
    is_main: bool,
    status: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO branches (merchant_id, parent_branch_id, name, code, branch_type, is_main, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id",
    )
    .bind(merchant_id)
    .bind(parent_branch_id)
    .bind(name)
    .bind(code)
    .bind(branch_type)
    .bind(is_main)
    .bind(status)
    .fetch_one(executor)
    .await
}

pub async fn update(pool: &PgPool, id: i64, changes: &BranchUpdate) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE branches
         SET parent_branch_id = COALESCE($2, parent_branch_id),
             name = COALESCE($3, name),
             code = COALESCE($4, code),
             branch_type = COALESCE($5, branch_type),
             is_main = COALESCE($6, is_main),
             status = COALESCE($7, status)
         WHERE id = $1",
    )
    .bind(id)
    .bind(changes.parent_branch_id)
    .bind(changes.name.as_deref())
    .bind(changes.code.as_deref())
    .bind(changes.branch_type.as_deref())
    .bind(changes.is_main)
    .bind(changes.status.as_deref())
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM branches WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
