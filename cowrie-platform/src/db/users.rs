//! Merchant user (tenant staff) store adapter

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct User {
    pub id: i64,
    /// Immutable after creation
    pub merchant_id: i64,
    /// Immutable after creation
    pub branch_id: i64,
    pub merchant_role_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub status: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Partial update; merchant/branch linkage is not updatable here
#[derive(Debug, Default)]
pub struct UserUpdate {
    pub merchant_role_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug)]
pub struct NewUser<'a> {
    pub merchant_id: i64,
    pub branch_id: i64,
    pub merchant_role_id: Option<i64>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    /// Already hashed by the caller
    pub password: &'a str,
    pub status: &'a str,
}

pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Exact-match email lookup, case-sensitive as stored
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn email_exists<'e>(
    executor: impl PgExecutor<'e>,
    email: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(executor)
        .await
}

pub async fn create<'e>(executor: impl PgExecutor<'e>, new: &NewUser<'_>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO users (merchant_id, branch_id, merchant_role_id, first_name, last_name, email, phone, password, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING id",
    )
    .bind(new.merchant_id)
    .bind(new.branch_id)
    .bind(new.merchant_role_id)
    .bind(new.first_name)
    .bind(new.last_name)
    .bind(new.email)
    .bind(new.phone)
    .bind(new.password)
    .bind(new.status)
    .fetch_one(executor)
    .await
}

pub async fn update(pool: &PgPool, id: i64, changes: &UserUpdate) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users
         SET merchant_role_id = COALESCE($2, merchant_role_id),
             first_name = COALESCE($3, first_name),
             last_name = COALESCE($4, last_name),
             email = COALESCE($5, email),
             phone = COALESCE($6, phone),
             password = COALESCE($7, password),
             status = COALESCE($8, status)
         WHERE id = $1",
    )
    .bind(id)
    .bind(changes.merchant_role_id)
    .bind(changes.first_name.as_deref())
    .bind(changes.last_name.as_deref())
    .bind(changes.email.as_deref())
    .bind(changes.phone.as_deref())
    .bind(changes.password.as_deref())
    .bind(changes.status.as_deref())
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn update_password(pool: &PgPool, id: i64, password: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
        .bind(password)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Set on successful login only
pub async fn touch_last_login(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_login_at = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
