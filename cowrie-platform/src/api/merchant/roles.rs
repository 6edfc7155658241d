//! Branch role CRUD (platform-gated)

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use shared::error::AppError;

use crate::api::{ApiResult, FieldErrors, add_error, require_string};
use crate::db;
use crate::db::branch_roles::{BranchRole, BranchRoleUpdate};
use crate::error::ServiceError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).put(update).delete(remove))
}

/// GET /branch-roles
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<BranchRole>> {
    Ok(Json(db::branch_roles::list(&state.pool).await?))
}

/// GET /branch-roles/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<BranchRole> {
    let role = db::branch_roles::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(role))
}

#[derive(Deserialize)]
pub struct CreateRequest {
    pub branch_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_system: Option<bool>,
    pub is_client: Option<bool>,
}

/// POST /branch-roles
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut errors = FieldErrors::new();
    let name = require_string(&mut errors, "name", req.name);
    if req.branch_id.is_none() {
        add_error(&mut errors, "branch_id", "branch_id is required");
    }
    if !errors.is_empty() {
        return Err(AppError::validation_fields(errors).into());
    }

    let id = db::branch_roles::create(
        &state.pool,
        req.branch_id.unwrap(),
        &name.unwrap(),
        req.description.as_deref(),
        req.is_system.unwrap_or(false),
        req.is_client.unwrap_or(false),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

#[derive(Deserialize)]
pub struct UpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_system: Option<bool>,
    pub is_client: Option<bool>,
}

/// PUT /branch-roles/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let changes = BranchRoleUpdate {
        name: req.name,
        description: req.description,
        is_system: req.is_system,
        is_client: req.is_client,
    };
    if changes.name.is_none()
        && changes.description.is_none()
        && changes.is_system.is_none()
        && changes.is_client.is_none()
    {
        return Err(AppError::validation("Empty payload").into());
    }

    let affected = db::branch_roles::update(&state.pool, id, &changes).await?;
    if affected == 0 {
        return Err(AppError::not_found().into());
    }
    Ok(Json(json!({ "updated": true })))
}

/// DELETE /branch-roles/{id}; system roles are non-deletable built-ins
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let affected = db::branch_roles::delete(&state.pool, id).await?;
    if affected == 0 {
        if db::branch_roles::find_by_id(&state.pool, id).await?.is_some() {
            return Err(AppError::validation("System roles cannot be deleted").into());
        }
        return Err(AppError::not_found().into());
    }
    Ok(Json(json!({ "deleted": true })))
}
