//! Merchant authentication endpoints: register, login, refresh, logout, me

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use http::{HeaderMap, HeaderName, StatusCode, header::SET_COOKIE};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::error::AppError;

use crate::api::{FieldErrors, require_string};
use crate::auth::middleware::merchant_auth;
use crate::auth::password::{self, PasswordCheck};
use crate::auth::rate_limit::{login_rate_limit, register_rate_limit};
use crate::auth::tokens::{Audience, TokenError};
use crate::auth::{MerchantIdentity, carriage, cookies};
use crate::db;
use crate::db::users::User;
use crate::error::ServiceError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/register",
            post(register).layer(middleware::from_fn_with_state(
                state.clone(),
                register_rate_limit,
            )),
        )
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
            get(me).layer(middleware::from_fn_with_state(state, merchant_auth)),
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
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub merchant_id: i64,
    pub branch_id: i64,
    pub merchant_role_id: Option<i64>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            merchant_id: user.merchant_id,
            branch_id: user.branch_id,
            merchant_role_id: user.merchant_role_id,
        }
    }
}

/// Login response echoes the tokens for native clients that cannot use the
/// session cookies
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
}

/// POST /merchant/auth/login
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

    let user = db::users::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    let rehash = match password::check(&user.password, &supplied, state.config.bcrypt_cost) {
        PasswordCheck::Valid { rehash } => rehash,
        PasswordCheck::Invalid => return Err(AppError::invalid_credentials().into()),
    };

    if user.status != "active" {
        return Err(AppError::account_disabled().into());
    }

    // silent upgrade of a legacy plaintext credential
    if let Some(hash) = rehash {
        db::users::update_password(&state.pool, user.id, &hash).await?;
    }

    let access = state
        .tokens
        .issue_merchant_access(
            user.id,
            &user.email,
            user.merchant_id,
            user.branch_id,
            user.merchant_role_id,
        )
        .map_err(token_failure)?;
    let refresh = state
        .tokens
        .issue_refresh(Audience::Merchant, user.id)
        .map_err(token_failure)?;

    db::users::touch_last_login(&state.pool, user.id).await?;

    let response = LoginResponse {
        profile: UserProfile::from(&user),
        access_token: access.clone(),
        refresh_token: refresh.clone(),
    };
    Ok((session_cookies(&state, &access, &refresh), Json(response)))
}

/// POST /merchant/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let body_token = body.ok().and_then(|Json(b)| b.refresh_token);
    let token = carriage::refresh_token(
        &headers,
        cookies::MERCHANT_REFRESH_COOKIE,
        body_token.as_deref(),
    )
    .ok_or_else(AppError::unauthorized)?;
    let claims = state
        .tokens
        .verify_refresh(&token, Audience::Merchant)
        .map_err(|_| AppError::unauthorized())?;

    let user = db::users::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(AppError::unauthorized)?;

    let access = state
        .tokens
        .issue_merchant_access(
            user.id,
            &user.email,
            user.merchant_id,
            user.branch_id,
            user.merchant_role_id,
        )
        .map_err(token_failure)?;
    let next_refresh = state
        .tokens
        .issue_refresh(Audience::Merchant, user.id)
        .map_err(token_failure)?;

    Ok((
        session_cookies(&state, &access, &next_refresh),
        Json(json!({
            "ok": true,
            "access_token": access,
            "refresh_token": next_refresh,
        })),
    ))
}

/// POST /merchant/auth/logout
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let production = state.config.is_production();
    (
        StatusCode::NO_CONTENT,
        AppendHeaders([
            (
                SET_COOKIE,
                cookies::expired_cookie(cookies::MERCHANT_ACCESS_COOKIE, production),
            ),
            (
                SET_COOKIE,
                cookies::expired_cookie(cookies::MERCHANT_REFRESH_COOKIE, production),
            ),
        ]),
    )
}

/// GET /merchant/auth/me, answered from the verified token alone
pub async fn me(Extension(identity): Extension<MerchantIdentity>) -> impl IntoResponse {
    Json(json!({
        "id": identity.sub,
        "email": identity.email,
        "merchant_id": identity.merchant_id,
        "branch_id": identity.branch_id,
        "merchant_role_id": identity.merchant_role_id,
    }))
}

// ── Self-registration ──

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub merchant_code: Option<String>,
    pub name: Option<String>,
    pub legal_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub admin_first_name: Option<String>,
    pub admin_last_name: Option<String>,
    pub admin_email: Option<String>,
    pub admin_phone: Option<String>,
    pub admin_password: Option<String>,
}

/// POST /merchant/auth/register
///
/// Creates the merchant, its HQ branch, the Owner branch role, and the first
/// staff account in one transaction. Duplicate-email races that slip past
/// the pre-checks surface as unique-violation conflicts, never as silent
/// duplicates.
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Ok(Json(req)) = body else {
        return Err(AppError::validation("Missing required fields").into());
    };

    let mut errors = FieldErrors::new();
    let name = require_string(&mut errors, "name", req.name);
    let email = require_string(&mut errors, "email", req.email);
    let admin_first_name = require_string(&mut errors, "admin_first_name", req.admin_first_name);
    let admin_last_name = require_string(&mut errors, "admin_last_name", req.admin_last_name);
    let admin_email = require_string(&mut errors, "admin_email", req.admin_email);
    let admin_password = require_string(&mut errors, "admin_password", req.admin_password);
    if !errors.is_empty() {
        return Err(AppError::validation_fields(errors).into());
    }
    let (name, email, admin_first_name, admin_last_name, admin_email, admin_password) = (
        name.unwrap(),
        email.unwrap(),
        admin_first_name.unwrap(),
        admin_last_name.unwrap(),
        admin_email.unwrap(),
        admin_password.unwrap(),
    );

    let admin_password_hash =
        password::hash(&admin_password, state.config.bcrypt_cost).map_err(|e| {
            tracing::error!(error = %e, "password hash failed");
            ServiceError::App(AppError::internal())
        })?;

    let mut tx = state.pool.begin().await?;

    if db::merchants::email_exists(&mut *tx, &email).await? {
        return Err(AppError::conflict("Merchant email already exists").into());
    }
    if db::users::email_exists(&mut *tx, &admin_email).await? {
        return Err(AppError::conflict("Admin email already exists").into());
    }

    let mut code = req
        .merchant_code
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| build_merchant_code(&name));
    if db::merchants::code_exists(&mut *tx, &code).await? {
        code = format!("M{}", chrono::Utc::now().timestamp_millis());
    }

    let merchant_id = db::merchants::create(
        &mut *tx,
        &db::merchants::NewMerchant {
            merchant_code: &code,
            name: &name,
            legal_name: req.legal_name.as_deref().unwrap_or(&name),
            email: &email,
            phone: req.phone.as_deref(),
            country: req.country.as_deref(),
            city: req.city.as_deref(),
            address: req.address.as_deref(),
            status: "pending",
        },
    )
    .await?;

    let branch_id = db::branches::create(
        &mut *tx,
        merchant_id,
        None,
        "HQ",
        &format!("{code}-HQ"),
        "hq",
        true,
        "active",
    )
    .await?;

    let role_id = db::branch_roles::create(
        &mut *tx,
        branch_id,
        "Owner",
        Some("Merchant owner"),
        true,
        false,
    )
    .await?;

    db::users::create(
        &mut *tx,
        &db::users::NewUser {
            merchant_id,
            branch_id,
            merchant_role_id: Some(role_id),
            first_name: &admin_first_name,
            last_name: &admin_last_name,
            email: &admin_email,
            phone: req.admin_phone.as_deref(),
            password: &admin_password_hash,
            status: "active",
        },
    )
    .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "merchant_id": merchant_id,
            "branch_id": branch_id,
        })),
    ))
}

/// Merchant code from the first alphanumerics of the name plus a time stamp
fn build_merchant_code(name: &str) -> String {
    let safe: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(4)
        .collect::<String>()
        .to_uppercase();
    let safe = if safe.is_empty() { "MERC".to_string() } else { safe };
    let stamp = chrono::Utc::now().timestamp_millis() % 100_000;
    format!("M{safe}{stamp:05}")
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
                cookies::MERCHANT_ACCESS_COOKIE,
                access,
                state.tokens.access_max_age(),
                production,
            ),
        ),
        (
            SET_COOKIE,
            cookies::session_cookie(
                cookies::MERCHANT_REFRESH_COOKIE,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_merchant_code_shape() {
        let code = build_merchant_code("Demo Merchant");
        assert!(code.starts_with("MDEMO"));
        assert_eq!(code.len(), 10);
    }

    #[test]
    fn test_build_merchant_code_strips_symbols() {
        let code = build_merchant_code("Ötzi & Co!");
        // non-ascii-alphanumerics are dropped before the prefix is taken
        assert!(code.starts_with("MTZIC"));
    }

    #[test]
    fn test_build_merchant_code_empty_name() {
        let code = build_merchant_code("---");
        assert!(code.starts_with("MMERC"));
    }
}
