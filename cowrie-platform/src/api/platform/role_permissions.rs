//! Platform role ↔ permission binding CRUD

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use shared::error::AppError;

use crate::api::{ApiResult, FieldErrors, add_error};
use crate::db;
use crate::db::platform_role_permissions::PlatformRolePermission;
use crate::error::ServiceError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).delete(remove))
}

/// GET /platform-role-permissions
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<PlatformRolePermission>> {
    Ok(Json(db::platform_role_permissions::list(&state.pool).await?))
}

/// GET /platform-role-permissions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<PlatformRolePermission> {
    let binding = db::platform_role_permissions::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(binding))
}

#[derive(Deserialize)]
pub struct CreateRequest {
    pub platform_role_id: Option<i64>,
    pub platform_permission_id: Option<i64>,
}

/// POST /platform-role-permissions (insert-if-absent)
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut errors = FieldErrors::new();
    if req.platform_role_id.is_none() {
        add_error(&mut errors, "platform_role_id", "platform_role_id is required");
    }
    if req.platform_permission_id.is_none() {
        add_error(
            &mut errors,
            "platform_permission_id",
            "platform_permission_id is required",
        );
    }
    if !errors.is_empty() {
        return Err(AppError::validation_fields(errors).into());
    }

    let id = db::platform_role_permissions::create(
        &state.pool,
        req.platform_role_id.unwrap(),
        req.platform_permission_id.unwrap(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// DELETE /platform-role-permissions/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let affected = db::platform_role_permissions::delete(&state.pool, id).await?;
    if affected == 0 {
        return Err(AppError::not_found().into());
    }
    Ok(Json(json!({ "deleted": true })))
}
