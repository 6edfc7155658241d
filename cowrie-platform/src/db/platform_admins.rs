//! Platform administrator store adapter

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct PlatformAdmin {
    pub id: i64,
    pub platform_role_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    // never serialized into API responses
    #[serde(skip_serializing)]
    pub password: String,
    pub status: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Partial update; `None` fields keep their stored value
#[derive(Debug, Default)]
pub struct PlatformAdminUpdate {
    pub platform_role_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub status: Option<String>,
}

pub async fn list(pool: &PgPool) -> Result<Vec<PlatformAdmin>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM platform_admins ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<PlatformAdmin>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM platform_admins WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Exact-match email lookup, case-sensitive as stored
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<PlatformAdmin>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM platform_admins WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    platform_role_id: Option<i64>,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
    status: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO platform_admins (platform_role_id, first_name, last_name, email, password, status)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(platform_role_id)
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(password)
    .bind(status)
    .fetch_one(executor)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    changes: &PlatformAdminUpdate,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE platform_admins
         SET platform_role_id = COALESCE($2, platform_role_id),
             first_name = COALESCE($3, first_name),
             last_name = COALESCE($4, last_name),
             email = COALESCE($5, email),
             password = COALESCE($6, password),
             status = COALESCE($7, status)
         WHERE id = $1",
    )
    .bind(id)
    .bind(changes.platform_role_id)
    .bind(changes.first_name.as_deref())
    .bind(changes.last_name.as_deref())
    .bind(changes.email.as_deref())
    .bind(changes.password.as_deref())
    .bind(changes.status.as_deref())
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn update_password(pool: &PgPool, id: i64, password: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE platform_admins SET password = $1 WHERE id = $2")
        .bind(password)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Set on successful login only
pub async fn touch_last_login(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE platform_admins SET last_login_at = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM platform_admins WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
