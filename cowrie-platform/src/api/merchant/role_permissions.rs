//! Branch role ↔ permission binding CRUD (platform-gated)

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
use crate::db::branch_role_permissions::BranchRolePermission;
use crate::error::ServiceError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).delete(remove))
}

/// GET /branch-role-permissions
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<BranchRolePermission>> {
    Ok(Json(db::branch_role_permissions::list(&state.pool).await?))
}

/// GET /branch-role-permissions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<BranchRolePermission> {
    let binding = db::branch_role_permissions::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(binding))
}

#[derive(Deserialize)]
pub struct CreateRequest {
    pub branch_role_id: Option<i64>,
    pub permission_id: Option<i64>,
}

/// POST /branch-role-permissions (insert-if-absent)
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut errors = FieldErrors::new();
    if req.branch_role_id.is_none() {
        add_error(&mut errors, "branch_role_id", "branch_role_id is required");
    }
    if req.permission_id.is_none() {
        add_error(&mut errors, "permission_id", "permission_id is required");
    }
    if !errors.is_empty() {
        return Err(AppError::validation_fields(errors).into());
    }

    let id = db::branch_role_permissions::create(
        &state.pool,
        req.branch_role_id.unwrap(),
        req.permission_id.unwrap(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// DELETE /branch-role-permissions/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let affected = db::branch_role_permissions::delete(&state.pool, id).await?;
    if affected == 0 {
        return Err(AppError::not_found().into());
    }
    Ok(Json(json!({ "deleted": true })))
}
