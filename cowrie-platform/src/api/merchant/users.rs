//! Merchant user (tenant staff) CRUD (platform-gated)

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use shared::error::AppError;

use crate::api::{ApiResult, FieldErrors, add_error, hash_for_storage, require_string};
use crate::db;
use crate::db::users::{NewUser, User, UserUpdate};
use crate::error::ServiceError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).put(update).delete(remove))
}

/// GET /users
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(Json(db::users::list(&state.pool).await?))
}

/// GET /users/{id}
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<User> {
    let user = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(user))
}

#[derive(Deserialize)]
pub struct CreateRequest {
    pub merchant_id: Option<i64>,
    pub branch_id: Option<i64>,
    pub merchant_role_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub status: Option<String>,
}

/// POST /users
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut errors = FieldErrors::new();
    let first_name = require_string(&mut errors, "first_name", req.first_name);
    let last_name = require_string(&mut errors, "last_name", req.last_name);
    let email = require_string(&mut errors, "email", req.email);
    let supplied_password = require_string(&mut errors, "password", req.password);
    if req.merchant_id.is_none() {
        add_error(&mut errors, "merchant_id", "merchant_id is required");
    }
    if req.branch_id.is_none() {
        add_error(&mut errors, "branch_id", "branch_id is required");
    }
    if !errors.is_empty() {
        return Err(AppError::validation_fields(errors).into());
    }
    let (first_name, last_name, email, supplied_password) = (
        first_name.unwrap(),
        last_name.unwrap(),
        email.unwrap(),
        supplied_password.unwrap(),
    );

    if db::users::email_exists(&state.pool, &email).await? {
        return Err(AppError::conflict("Email already exists").into());
    }

    let hashed = hash_for_storage(&state, supplied_password)?;
    let id = db::users::create(
        &state.pool,
        &NewUser {
            merchant_id: req.merchant_id.unwrap(),
            branch_id: req.branch_id.unwrap(),
            merchant_role_id: req.merchant_role_id,
            first_name: &first_name,
            last_name: &last_name,
            email: &email,
            phone: req.phone.as_deref(),
            password: &hashed,
            status: req.status.as_deref().unwrap_or("active"),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

#[derive(Deserialize)]
pub struct UpdateRequest {
    pub merchant_role_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub status: Option<String>,
}

/// PUT /users/{id}; merchant/branch linkage is immutable after creation
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let password = match req.password {
        Some(p) => Some(hash_for_storage(&state, p)?),
        None => None,
    };
    let changes = UserUpdate {
        merchant_role_id: req.merchant_role_id,
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        phone: req.phone,
        password,
        status: req.status,
    };
    if changes.merchant_role_id.is_none()
        && changes.first_name.is_none()
        && changes.last_name.is_none()
        && changes.email.is_none()
        && changes.phone.is_none()
        && changes.password.is_none()
        && changes.status.is_none()
    {
        return Err(AppError::validation("Empty payload").into());
    }

    let affected = db::users::update(&state.pool, id, &changes).await?;
    if affected == 0 {
        return Err(AppError::not_found().into());
    }
    Ok(Json(json!({ "updated": true })))
}

/// DELETE /users/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let affected = db::users::delete(&state.pool, id).await?;
    if affected == 0 {
        return Err(AppError::not_found().into());
    }
    Ok(Json(json!({ "deleted": true })))
}
