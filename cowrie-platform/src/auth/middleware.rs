//! Authentication middlewares and the authorization gates
//!
//! Every failure on the token path (missing, corrupt, bad signature,
//! expired, wrong audience) collapses to the same 401 body; nothing in the
//! response distinguishes which check rejected the credential.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::Method;
use shared::error::AppError;

use crate::db;
use crate::state::AppState;

use super::carriage;
use super::cookies::{MERCHANT_ACCESS_COOKIE, PLATFORM_ACCESS_COOKIE};
use super::identity::{DualAudience, MerchantIdentity, PlatformIdentity, ResolvedPermissions};
use super::permissions::{self, PermissionMap};

/// Platform authentication: verify the access token and inject
/// [`PlatformIdentity`]. Authorization is left to the permission gates.
pub async fn platform_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = carriage::access_token(req.headers(), PLATFORM_ACCESS_COOKIE)
        .ok_or_else(AppError::unauthorized)?;
    let claims = state
        .tokens
        .verify_platform_access(&token)
        .map_err(|_| AppError::unauthorized())?;
    req.extensions_mut().insert(PlatformIdentity::from(claims));
    Ok(next.run(req).await)
}

/// Merchant authentication: verify the merchant access token and inject
/// [`MerchantIdentity`]. Branch-role flags are not resolved here; routes that
/// enforce the read-only role go through the dual-audience gate.
pub async fn merchant_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = carriage::access_token(req.headers(), MERCHANT_ACCESS_COOKIE)
        .ok_or_else(AppError::unauthorized)?;
    let claims = state
        .tokens
        .verify_merchant_access(&token)
        .map_err(|_| AppError::unauthorized())?;
    req.extensions_mut().insert(MerchantIdentity::from(claims));
    Ok(next.run(req).await)
}

type GateFuture = Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>;

/// Gate factory for platform-only route groups.
///
/// Layered inside [`platform_auth`]; decides from the verified identity, the
/// full-access override, and the per-resource [`PermissionMap`].
pub fn require_platform_permission(
    state: AppState,
    map: PermissionMap,
) -> impl Fn(Request, Next) -> GateFuture + Clone {
    move |mut req: Request, next: Next| {
        let state = state.clone();
        Box::pin(async move {
            let identity = req
                .extensions()
                .get::<PlatformIdentity>()
                .cloned()
                .ok_or_else(AppError::unauthorized)?;

            // Operator escape hatch: every verified platform token passes.
            if state.config.platform_full_access {
                return Ok(next.run(req).await);
            }

            let Some(required) = map.required_for(req.method()) else {
                return Ok(next.run(req).await);
            };

            let resolved = cached_permissions(&state, &mut req, identity.sub).await?;
            if !resolved.contains(required) {
                tracing::warn!(
                    admin_id = identity.sub,
                    required_permission = required,
                    "permission denied"
                );
                return Err(AppError::forbidden());
            }

            Ok(next.run(req).await)
        })
    }
}

/// Gate factory for route groups shared by platform admins and merchant
/// staff.
///
/// A verifiable platform token takes priority and goes through the platform
/// decision procedure. Otherwise the merchant token is required; its branch
/// role is looked up once, and the designated client role is restricted to
/// read-only methods regardless of the permission map.
pub fn allow_platform_or_merchant(
    state: AppState,
    map: PermissionMap,
) -> impl Fn(Request, Next) -> GateFuture + Clone {
    move |mut req: Request, next: Next| {
        let state = state.clone();
        Box::pin(async move {
            if let Some(token) = carriage::access_token(req.headers(), PLATFORM_ACCESS_COOKIE)
                && let Ok(claims) = state.tokens.verify_platform_access(&token)
            {
                let identity = PlatformIdentity::from(claims);
                let admin_id = identity.sub;
                req.extensions_mut()
                    .insert(DualAudience::Platform(identity.clone()));
                req.extensions_mut().insert(identity);

                if state.config.platform_full_access {
                    return Ok(next.run(req).await);
                }
                let Some(required) = map.required_for(req.method()) else {
                    return Ok(next.run(req).await);
                };
                let resolved = cached_permissions(&state, &mut req, admin_id).await?;
                if !resolved.contains(required) {
                    return Err(AppError::forbidden());
                }
                return Ok(next.run(req).await);
            }

            let token = carriage::access_token(req.headers(), MERCHANT_ACCESS_COOKIE)
                .ok_or_else(AppError::unauthorized)?;
            let claims = state
                .tokens
                .verify_merchant_access(&token)
                .map_err(|_| AppError::unauthorized())?;
            let mut identity = MerchantIdentity::from(claims);

            if let Some(role_id) = identity.merchant_role_id {
                let role = db::branch_roles::find_role(&state.pool, role_id)
                    .await
                    .map_err(|e| {
                        tracing::error!(error = %e, "branch role lookup failed");
                        AppError::internal()
                    })?;
                if let Some(role) = role {
                    identity.is_client =
                        permissions::is_client_role(&role, &state.config.client_role_name);
                    identity.role_name = Some(role.name);
                }
            }

            if identity.is_client && !is_read_method(req.method()) {
                tracing::warn!(
                    user_id = identity.sub,
                    merchant_id = identity.merchant_id,
                    "read-only role attempted a mutating method"
                );
                return Err(AppError::read_only());
            }

            req.extensions_mut()
                .insert(DualAudience::Merchant(identity.clone()));
            req.extensions_mut().insert(identity);
            Ok(next.run(req).await)
        })
    }
}

fn is_read_method(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}

/// Resolve the caller's permission set, at most once per request.
///
/// Stacked gates on the same request reuse the cached set from the request
/// extensions instead of re-querying.
async fn cached_permissions(
    state: &AppState,
    req: &mut Request,
    admin_id: i64,
) -> Result<ResolvedPermissions, AppError> {
    if let Some(cached) = req.extensions().get::<ResolvedPermissions>() {
        return Ok(cached.clone());
    }

    let keys = permissions::resolve(&state.pool, admin_id, state.permissions_available)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, admin_id, "permission resolution failed");
            AppError::internal()
        })?;

    let resolved = ResolvedPermissions(Arc::new(keys));
    req.extensions_mut().insert(resolved.clone());
    Ok(resolved)
}
