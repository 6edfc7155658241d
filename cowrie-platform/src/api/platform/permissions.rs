//! Platform permission catalog CRUD

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
use crate::db::platform_permissions::{PlatformPermission, PlatformPermissionUpdate};
use crate::error::ServiceError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).put(update).delete(remove))
}

/// GET /platform-permissions
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<PlatformPermission>> {
    Ok(Json(db::platform_permissions::list(&state.pool).await?))
}

/// GET /platform-permissions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<PlatformPermission> {
    let permission = db::platform_permissions::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(permission))
}

#[derive(Deserialize)]
pub struct CreateRequest {
    pub key_name: Option<String>,
    pub description: Option<String>,
    pub group_name: Option<String>,
}

/// POST /platform-permissions
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut errors = FieldErrors::new();
    let key_name = require_string(&mut errors, "key_name", req.key_name);
    if !errors.is_empty() {
        return Err(AppError::validation_fields(errors).into());
    }
    let key_name = key_name.unwrap();

    if db::platform_permissions::find_by_key(&state.pool, &key_name)
        .await?
        .is_some()
    {
        return Err(AppError::conflict("Permission key already exists").into());
    }

    let id = db::platform_permissions::create(
        &state.pool,
        &key_name,
        req.description.as_deref(),
        req.group_name.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

#[derive(Deserialize)]
pub struct UpdateRequest {
    pub key_name: Option<String>,
    pub description: Option<String>,
    pub group_name: Option<String>,
}

/// PUT /platform-permissions/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let changes = PlatformPermissionUpdate {
        key_name: req.key_name,
        description: req.description,
        group_name: req.group_name,
    };
    if changes.key_name.is_none() && changes.description.is_none() && changes.group_name.is_none() {
        return Err(AppError::validation("Empty payload").into());
    }

    let affected = db::platform_permissions::update(&state.pool, id, &changes).await?;
    if affected == 0 {
        return Err(AppError::not_found().into());
    }
    Ok(Json(json!({ "updated": true })))
}

/// DELETE /platform-permissions/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let affected = db::platform_permissions::delete(&state.pool, id).await?;
    if affected == 0 {
        return Err(AppError::not_found().into());
    }
    Ok(Json(json!({ "deleted": true })))
}
