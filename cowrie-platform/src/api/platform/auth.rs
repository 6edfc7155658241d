//! Platform authentication endpoints: login, refresh, logout, me

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use http::{HeaderMap, HeaderName, StatusCode, header::SET_COOKIE};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::error::AppError;

use crate::api::ApiResult;
use crate::auth::middleware::platform_auth;
use crate::auth::password::{self, PasswordCheck};
use crate::auth::rate_limit::login_rate_limit;
use crate::auth::tokens::{Audience, TokenError};
use crate::auth::{PlatformIdentity, carriage, cookies, permissions};
use crate::db;
use crate::db::platform_admins::PlatformAdmin;
use crate::error::ServiceError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            post(login).layer(middleware::from_fn_with_state(
                state.clone(),
                login_rate_limit,
            )),
        )
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route(
            "/me",
            get(me).layer(middleware::from_fn_with_state(state, platform_auth)),
        )
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
pub struct AdminProfile {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub platform_role_id: Option<i64>,
}

impl From<&PlatformAdmin> for AdminProfile {
    fn from(admin: &PlatformAdmin) -> Self {
        Self {
            id: admin.id,
            email: admin.email.clone(),
            first_name: admin.first_name.clone(),
            last_name: admin.last_name.clone(),
            platform_role_id: admin.platform_role_id,
        }
    }
}

#[derive(Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub profile: AdminProfile,
    pub permissions: Vec<String>,
}

/// POST /platform/auth/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Ok(Json(LoginRequest {
        email: Some(email),
        password: Some(supplied),
    })) = body
    else {
        return Err(AppError::validation("Email and password required").into());
    };

    let admin = db::platform_admins::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    let rehash = match password::check(&admin.password, &supplied, state.config.bcrypt_cost) {
        PasswordCheck::Valid { rehash } => rehash,
        PasswordCheck::Invalid => return Err(AppError::invalid_credentials().into()),
    };

    if admin.status != "active" {
        return Err(AppError::account_disabled().into());
    }

    // silent upgrade of a legacy plaintext credential
    if let Some(hash) = rehash {
        db::platform_admins::update_password(&state.pool, admin.id, &hash).await?;
    }

    let access = state
        .tokens
        .issue_platform_access(admin.id, &admin.email, admin.platform_role_id)
        .map_err(token_failure)?;
    let refresh = state
        .tokens
        .issue_refresh(Audience::Platform, admin.id)
        .map_err(token_failure)?;

    db::platform_admins::touch_last_login(&state.pool, admin.id).await?;

    Ok((
        session_cookies(&state, &access, &refresh),
        Json(AdminProfile::from(&admin)),
    ))
}

/// POST /platform/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let body_token = body.ok().and_then(|Json(b)| b.refresh_token);
    let token = carriage::refresh_token(
        &headers,
        cookies::PLATFORM_REFRESH_COOKIE,
        body_token.as_deref(),
    )
    .ok_or_else(AppError::unauthorized)?;
    let claims = state
        .tokens
        .verify_refresh(&token, Audience::Platform)
        .map_err(|_| AppError::unauthorized())?;

    let admin = db::platform_admins::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(AppError::unauthorized)?;

    let access = state
        .tokens
        .issue_platform_access(admin.id, &admin.email, admin.platform_role_id)
        .map_err(token_failure)?;
    let next_refresh = state
        .tokens
        .issue_refresh(Audience::Platform, admin.id)
        .map_err(token_failure)?;

    Ok((
        session_cookies(&state, &access, &next_refresh),
        Json(json!({ "ok": true })),
    ))
}

/// POST /platform/auth/logout: clears the session cookies; an already
/// issued access token stays valid until its natural expiry
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let production = state.config.is_production();
    (
        StatusCode::NO_CONTENT,
        AppendHeaders([
            (
                SET_COOKIE,
                cookies::expired_cookie(cookies::PLATFORM_ACCESS_COOKIE, production),
            ),
            (
                SET_COOKIE,
                cookies::expired_cookie(cookies::PLATFORM_REFRESH_COOKIE, production),
            ),
        ]),
    )
}

/// GET /platform/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<PlatformIdentity>,
) -> ApiResult<MeResponse> {
    let admin = db::platform_admins::find_by_id(&state.pool, identity.sub)
        .await?
        .ok_or_else(AppError::not_found)?;
    let permissions =
        permissions::resolve(&state.pool, admin.id, state.permissions_available).await?;
    Ok(Json(MeResponse {
        profile: AdminProfile::from(&admin),
        permissions,
    }))
}

fn session_cookies(
    state: &AppState,
    access: &str,
    refresh: &str,
) -> AppendHeaders<[(HeaderName, String); 2]> {
    let production = state.config.is_production();
    AppendHeaders([
        (
            SET_COOKIE,
            cookies::session_cookie(
                cookies::PLATFORM_ACCESS_COOKIE,
                access,
                state.tokens.access_max_age(),
                production,
            ),
        ),
        (
            SET_COOKIE,
            cookies::session_cookie(
                cookies::PLATFORM_REFRESH_COOKIE,
                refresh,
                state.tokens.refresh_max_age(),
                production,
            ),
        ),
    ])
}

fn token_failure(e: TokenError) -> ServiceError {
    tracing::error!(error = %e, "token issuance failed");
    AppError::internal().into()
}
