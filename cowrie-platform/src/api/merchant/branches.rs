//! Branch CRUD (dual-audience)
//!
//! Platform admins see every branch by permission map; merchant tokens are
//! scoped to their own merchant, with the client role limited to reads by
//! the gate before these handlers run.

use axum::extract::{Extension, Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use shared::error::AppError;

use crate::api::{ApiResult, FieldErrors, add_error, require_string};
use crate::auth::MerchantIdentity;
use crate::auth::identity::DualAudience;
use crate::db;
use crate::db::branches::{Branch, BranchUpdate};
use crate::error::ServiceError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).put(update).delete(remove))
}

/// GET /branches; merchant callers see their own merchant's branches only
pub async fn list(
    State(state): State<AppState>,
    Extension(audience): Extension<DualAudience>,
) -> ApiResult<Vec<Branch>> {
    let rows = match audience.merchant() {
        Some(identity) => {
            db::branches::list_for_merchant(&state.pool, identity.merchant_id).await?
        }
        None => db::branches::list(&state.pool).await?,
    };
    Ok(Json(rows))
}

/// GET /branches/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(audience): Extension<DualAudience>,
    Path(id): Path<i64>,
) -> ApiResult<Branch> {
    let branch = db::branches::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    // out-of-tenant rows are indistinguishable from missing ones
    if let Some(identity) = audience.merchant()
        && branch.merchant_id != identity.merchant_id
    {
        return Err(AppError::not_found().into());
    }
    Ok(Json(branch))
}

#[derive(Deserialize)]
pub struct CreateRequest {
    pub merchant_id: Option<i64>,
    pub parent_branch_id: Option<i64>,
    pub name: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub branch_type: Option<String>,
    pub is_main: Option<bool>,
    pub status: Option<String>,
}

/// POST /branches
pub async fn create(
    State(state): State<AppState>,
    Extension(audience): Extension<DualAudience>,
    Json(req): Json<CreateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut errors = FieldErrors::new();
    let name = require_string(&mut errors, "name", req.name);
    let code = require_string(&mut errors, "code", req.code);
    if req.merchant_id.is_none() {
        add_error(&mut errors, "merchant_id", "merchant_id is required");
    }
    if !errors.is_empty() {
        return Err(AppError::validation_fields(errors).into());
    }
    let merchant_id = req.merchant_id.unwrap();

    if let Some(identity) = audience.merchant()
        && merchant_id != identity.merchant_id
    {
        return Err(AppError::forbidden().into());
    }

    let id = db::branches::create(
        &state.pool,
        merchant_id,
        req.parent_branch_id,
        &name.unwrap(),
        &code.unwrap(),
        req.branch_type.as_deref().unwrap_or("branch"),
        req.is_main.unwrap_or(false),
        req.status.as_deref().unwrap_or("active"),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

#[derive(Deserialize)]
pub struct UpdateRequest {
    pub parent_branch_id: Option<i64>,
    pub name: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub branch_type: Option<String>,
    pub is_main: Option<bool>,
    pub status: Option<String>,
}

/// PUT /branches/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(audience): Extension<DualAudience>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let changes = BranchUpdate {
        parent_branch_id: req.parent_branch_id,
        name: req.name,
        code: req.code,
        branch_type: req.branch_type,
        is_main: req.is_main,
        status: req.status,
    };
    if changes.parent_branch_id.is_none()
        && changes.name.is_none()
        && changes.code.is_none()
        && changes.branch_type.is_none()
        && changes.is_main.is_none()
        && changes.status.is_none()
    {
        return Err(AppError::validation("Empty payload").into());
    }

    scope_check(&state, audience.merchant(), id).await?;

    let affected = db::branches::update(&state.pool, id, &changes).await?;
    if affected == 0 {
        return Err(AppError::not_found().into());
    }
    Ok(Json(json!({ "updated": true })))
}

/// DELETE /branches/{id}
pub async fn remove(
    State(state): State<AppState>,
    Extension(audience): Extension<DualAudience>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    scope_check(&state, audience.merchant(), id).await?;

    let affected = db::branches::delete(&state.pool, id).await?;
    if affected == 0 {
        return Err(AppError::not_found().into());
    }
    Ok(Json(json!({ "deleted": true })))
}

/// Merchant callers may only touch rows of their own merchant
async fn scope_check(
    state: &AppState,
    merchant: Option<&MerchantIdentity>,
    branch_id: i64,
) -> Result<(), ServiceError> {
    if let Some(identity) = merchant {
        let branch = db::branches::find_by_id(&state.pool, branch_id)
            .await?
            .ok_or_else(AppError::not_found)?;
        if branch.merchant_id != identity.merchant_id {
            return Err(AppError::not_found().into());
        }
    }
    Ok(())
}
