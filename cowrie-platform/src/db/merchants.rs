//! Merchant store adapter

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct Merchant {
    pub id: i64,
    pub merchant_code: String,
    pub name: String,
    pub legal_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct MerchantUpdate {
    pub name: Option<String>,
    pub legal_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub status: Option<String>,
}

/// Fields for a new merchant row
#[derive(Debug)]
pub struct NewMerchant<'a> {
    pub merchant_code: &'a str,
    pub name: &'a str,
    pub legal_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub country: Option<&'a str>,
    pub city: Option<&'a str>,
    pub address: Option<&'a str>,
    pub status: &'a str,
}

pub async fn list(pool: &PgPool) -> Result<Vec<Merchant>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM merchants ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Merchant>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM merchants WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn email_exists<'e>(
    executor: impl PgExecutor<'e>,
    email: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM merchants WHERE email = $1)")
        .bind(email)
        .fetch_one(executor)
        .await
}

pub async fn code_exists<'e>(
    executor: impl PgExecutor<'e>,
    merchant_code: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM merchants WHERE merchant_code = $1)")
        .bind(merchant_code)
        .fetch_one(executor)
        .await
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    new: &NewMerchant<'_>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO merchants (merchant_code, name, legal_name, email, phone, country, city, address, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING id",
    )
    .bind(new.merchant_code)
    .bind(new.name)
    .bind(new.legal_name)
    .bind(new.email)
    .bind(new.phone)
    .bind(new.country)
    .bind(new.city)
    .bind(new.address)
    .bind(new.status)
    .fetch_one(executor)
    .await
}

pub async fn update(pool: &PgPool, id: i64, changes: &MerchantUpdate) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE merchants
         SET name = COALESCE($2, name),
             legal_name = COALESCE($3, legal_name),
             email = COALESCE($4, email),
             phone = COALESCE($5, phone),
             country = COALESCE($6, country),
             city = COALESCE($7, city),
             address = COALESCE($8, address),
             status = COALESCE($9, status)
         WHERE id = $1",
    )
    .bind(id)
    .bind(changes.name.as_deref())
    .bind(changes.legal_name.as_deref())
    .bind(changes.email.as_deref())
    .bind(changes.phone.as_deref())
    .bind(changes.country.as_deref())
    .bind(changes.city.as_deref())
    .bind(changes.address.as_deref())
    .bind(changes.status.as_deref())
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM merchants WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
