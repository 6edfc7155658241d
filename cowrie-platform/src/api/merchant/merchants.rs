//! Merchant CRUD (platform-gated)

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use shared::error::AppError;

use crate::api::{ApiResult, FieldErrors, require_string};
use crate::db;
use crate::db::merchants::{Merchant, MerchantUpdate, NewMerchant};
use crate::error::ServiceError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).put(update).delete(remove))
}

/// GET /merchants
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Merchant>> {
    Ok(Json(db::merchants::list(&state.pool).await?))
}

/// GET /merchants/{id}
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Merchant> {
    let merchant = db::merchants::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(merchant))
}

#[derive(Deserialize)]
pub struct CreateRequest {
    pub merchant_code: Option<String>,
    pub name: Option<String>,
    pub legal_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub status: Option<String>,
}

/// POST /merchants
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut errors = FieldErrors::new();
    let merchant_code = require_string(&mut errors, "merchant_code", req.merchant_code);
    let name = require_string(&mut errors, "name", req.name);
    let email = require_string(&mut errors, "email", req.email);
    if !errors.is_empty() {
        return Err(AppError::validation_fields(errors).into());
    }
    let (merchant_code, name, email) = (merchant_code.unwrap(), name.unwrap(), email.unwrap());

    if db::merchants::email_exists(&state.pool, &email).await? {
        return Err(AppError::conflict("Merchant email already exists").into());
    }
    if db::merchants::code_exists(&state.pool, &merchant_code).await? {
        return Err(AppError::conflict("Merchant code already exists").into());
    }

    let id = db::merchants::create(
        &state.pool,
        &NewMerchant {
            merchant_code: &merchant_code,
            name: &name,
            legal_name: req.legal_name.as_deref().unwrap_or(&name),
            email: &email,
            phone: req.phone.as_deref(),
            country: req.country.as_deref(),
            city: req.city.as_deref(),
            address: req.address.as_deref(),
            status: req.status.as_deref().unwrap_or("pending"),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

#[derive(Deserialize)]
pub struct UpdateRequest {
    pub name: Option<String>,
    pub legal_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub status: Option<String>,
}

/// PUT /merchants/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let changes = MerchantUpdate {
        name: req.name,
        legal_name: req.legal_name,
        email: req.email,
        phone: req.phone,
        country: req.country,
        city: req.city,
        address: req.address,
        status: req.status,
    };
    if changes.name.is_none()
        && changes.legal_name.is_none()
        && changes.email.is_none()
        && changes.phone.is_none()
        && changes.country.is_none()
        && changes.city.is_none()
        && changes.address.is_none()
        && changes.status.is_none()
    {
        return Err(AppError::validation("Empty payload").into());
    }

    let affected = db::merchants::update(&state.pool, id, &changes).await?;
    if affected == 0 {
        return Err(AppError::not_found().into());
    }
    Ok(Json(json!({ "updated": true })))
}

/// DELETE /merchants/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let affected = db::merchants::delete(&state.pool, id).await?;
    if affected == 0 {
        return Err(AppError::not_found().into());
    }
    Ok(Json(json!({ "deleted": true })))
}
