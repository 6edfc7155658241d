//! Platform administrator CRUD

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use shared::error::AppError;

use crate::api::{ApiResult, FieldErrors, hash_for_storage, require_string};
use crate::db;
use crate::db::platform_admins::{PlatformAdmin, PlatformAdminUpdate};
use crate::error::ServiceError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).put(update).delete(remove))
}

/// GET /platform-admins
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<PlatformAdmin>> {
    Ok(Json(db::platform_admins::list(&state.pool).await?))
}

/// GET /platform-admins/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<PlatformAdmin> {
    let admin = db::platform_admins::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(admin))
}

#[derive(Deserialize)]
pub struct CreateRequest {
    pub platform_role_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub status: Option<String>,
}

/// POST /platform-admins
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut errors = FieldErrors::new();
    let first_name = require_string(&mut errors, "first_name", req.first_name);
    let last_name = require_string(&mut errors, "last_name", req.last_name);
    let email = require_string(&mut errors, "email", req.email);
    let supplied_password = require_string(&mut errors, "password", req.password);
    if !errors.is_empty() {
        return Err(AppError::validation_fields(errors).into());
    }
    let (first_name, last_name, email, supplied_password) = (
        first_name.unwrap(),
        last_name.unwrap(),
        email.unwrap(),
        supplied_password.unwrap(),
    );

    // pre-check; the unique index still guards the insert against races
    if db::platform_admins::find_by_email(&state.pool, &email)
        .await?
        .is_some()
    {
        return Err(AppError::conflict("Email already exists").into());
    }

    let hashed = hash_for_storage(&state, supplied_password)?;
    let id = db::platform_admins::create(
        &state.pool,
        req.platform_role_id,
        &first_name,
        &last_name,
        &email,
        &hashed,
        req.status.as_deref().unwrap_or("active"),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

#[derive(Deserialize)]
pub struct UpdateRequest {
    pub platform_role_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub status: Option<String>,
}

/// PUT /platform-admins/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let password = match req.password {
        Some(p) => Some(hash_for_storage(&state, p)?),
        None => None,
    };
    let changes = PlatformAdminUpdate {
        platform_role_id: req.platform_role_id,
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        password,
        status: req.status,
    };

    if changes.platform_role_id.is_none()
        && changes.first_name.is_none()
        && changes.last_name.is_none()
        && changes.email.is_none()
        && changes.password.is_none()
        && changes.status.is_none()
    {
        return Err(AppError::validation("Empty payload").into());
    }

    let affected = db::platform_admins::update(&state.pool, id, &changes).await?;
    if affected == 0 {
        return Err(AppError::not_found().into());
    }
    Ok(Json(json!({ "updated": true })))
}

/// DELETE /platform-admins/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let affected = db::platform_admins::delete(&state.pool, id).await?;
    if affected == 0 {
        return Err(AppError::not_found().into());
    }
    Ok(Json(json!({ "deleted": true })))
}
