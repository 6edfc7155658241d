//! API routes for cowrie-platform
//!
//! Route-group permission bindings are constructed once here and handed to
//! the gate factories; handlers never consult the maps themselves.

pub mod health;
pub mod merchant;
pub mod platform;

use std::collections::HashMap;

use axum::routing::get;
use axum::{Json, Router, middleware};
use http::HeaderValue;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::PermissionMap;
use crate::auth::middleware::{
    allow_platform_or_merchant, platform_auth, require_platform_permission,
};
use crate::config::Config;
use crate::error::ServiceError;
use crate::state::AppState;

/// Handler result carrying a JSON body
pub type ApiResult<T> = Result<Json<T>, ServiceError>;

const PLATFORM_ADMINS: PermissionMap = PermissionMap::crud(
    "view-platform-admin",
    "create-platform-admin",
    "update-platform-admin",
    "delete-platform-admin",
);
const PLATFORM_ROLES: PermissionMap = PermissionMap::crud(
    "view-platform-role",
    "create-platform-role",
    "update-platform-role",
    "delete-platform-role",
);
const PLATFORM_PERMISSIONS: PermissionMap = PermissionMap::crud(
    "view-platform-permission",
    "create-platform-permission",
    "update-platform-permission",
    "delete-platform-permission",
);
const PLATFORM_ROLE_PERMISSIONS: PermissionMap = PermissionMap::crud(
    "view-platform-role-permission",
    "create-platform-role-permission",
    "update-platform-role-permission",
    "delete-platform-role-permission",
);
const MERCHANTS: PermissionMap = PermissionMap::crud(
    "view-merchant",
    "create-merchant",
    "update-merchant",
    "delete-merchant",
);
const BRANCHES: PermissionMap =
    PermissionMap::crud("view-branch", "create-branch", "update-branch", "delete-branch");
const USERS: PermissionMap =
    PermissionMap::crud("view-user", "create-user", "update-user", "delete-user");
const PERMISSIONS: PermissionMap = PermissionMap::crud(
    "view-permission",
    "create-permission",
    "update-permission",
    "delete-permission",
);
const BRANCH_ROLES: PermissionMap = PermissionMap::crud(
    "view-branch-role",
    "create-branch-role",
    "update-branch-role",
    "delete-branch-role",
);
const BRANCH_ROLE_PERMISSIONS: PermissionMap = PermissionMap::crud(
    "view-branch-role-permission",
    "create-branch-role-permission",
    "update-branch-role-permission",
    "delete-branch-role-permission",
);

/// Create the combined router
pub fn router(state: AppState) -> Router {
    let v1 = Router::new()
        .nest("/platform/auth", platform::auth::router(state.clone()))
        .nest("/merchant/auth", merchant::auth::router(state.clone()))
        .nest(
            "/platform-admins",
            platform_guarded(&state, platform::admins::router(), PLATFORM_ADMINS),
        )
        .nest(
            "/platform-roles",
            platform_guarded(&state, platform::roles::router(), PLATFORM_ROLES),
        )
        .nest(
            "/platform-permissions",
            platform_guarded(&state, platform::permissions::router(), PLATFORM_PERMISSIONS),
        )
        .nest(
            "/platform-role-permissions",
            platform_guarded(
                &state,
                platform::role_permissions::router(),
                PLATFORM_ROLE_PERMISSIONS,
            ),
        )
        .nest(
            "/merchants",
            platform_guarded(&state, merchant::merchants::router(), MERCHANTS),
        )
        .nest(
            "/branches",
            dual_guarded(&state, merchant::branches::router(), BRANCHES),
        )
        .nest(
            "/users",
            platform_guarded(&state, merchant::users::router(), USERS),
        )
        .nest(
            "/permissions",
            platform_guarded(&state, merchant::permissions::router(), PERMISSIONS),
        )
        .nest(
            "/branch-roles",
            platform_guarded(&state, merchant::roles::router(), BRANCH_ROLES),
        )
        .nest(
            "/branch-role-permissions",
            platform_guarded(
                &state,
                merchant::role_permissions::router(),
                BRANCH_ROLE_PERMISSIONS,
            ),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", v1)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}

/// Platform-only group: authentication first, then the permission gate
fn platform_guarded(
    state: &AppState,
    routes: Router<AppState>,
    map: PermissionMap,
) -> Router<AppState> {
    routes
        .layer(middleware::from_fn(require_platform_permission(
            state.clone(),
            map,
        )))
        .layer(middleware::from_fn_with_state(state.clone(), platform_auth))
}

/// Dual-audience group: the gate handles both token classes itself
fn dual_guarded(
    state: &AppState,
    routes: Router<AppState>,
    map: PermissionMap,
) -> Router<AppState> {
    routes.layer(middleware::from_fn(allow_platform_or_merchant(
        state.clone(),
        map,
    )))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let mut cors = CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(_) => tracing::warn!(
            origin = %config.cors_origin,
            "invalid CORS_ORIGIN, cross-origin requests disabled"
        ),
    }
    cors
}

// ── Request validation helpers (field-keyed 400 `errors` map) ──

pub(crate) type FieldErrors = HashMap<String, Value>;

pub(crate) fn add_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors.insert(field.to_string(), Value::String(message.to_string()));
}

/// Non-empty trimmed string, or a recorded field error
pub(crate) fn require_string(
    errors: &mut FieldErrors,
    field: &'static str,
    value: Option<String>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            add_error(errors, field, &format!("{field} is required"));
            None
        }
    }
}

/// Plaintext password payloads are hashed before storage; values that are
/// already hash-shaped are stored as-is.
pub(crate) fn hash_for_storage(state: &AppState, value: String) -> Result<String, ServiceError> {
    use shared::error::AppError;

    if crate::auth::password::is_hashed(&value) {
        return Ok(value);
    }
    crate::auth::password::hash(&value, state.config.bcrypt_cost).map_err(|e| {
        tracing::error!(error = %e, "password hash failed");
        ServiceError::App(AppError::internal())
    })
}
