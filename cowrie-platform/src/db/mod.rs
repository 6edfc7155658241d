//! Store adapters: one module per table, plain functions over `PgPool`
//!
//! Email lookups are exact-match and case-sensitive as stored; the adapters
//! perform no normalization.

pub mod branch_permissions;
pub mod branch_role_permissions;
pub mod branch_roles;
pub mod branches;
pub mod merchants;
pub mod platform_admins;
pub mod platform_permissions;
pub mod platform_role_permissions;
pub mod platform_roles;
pub mod users;

use sqlx::PgPool;

/// Capability probe for the permission join schema.
///
/// Run once at startup; the resolver consults the result instead of catching
/// store errors mid-request when a deployment has not migrated yet.
pub async fn permission_schema_available(pool: &PgPool) -> bool {
    let probe: Result<bool, sqlx::Error> = sqlx::query_scalar(
        "SELECT count(*) = 3
         FROM information_schema.tables
         WHERE table_schema = current_schema()
           AND table_name IN ('platform_roles', 'platform_permissions', 'platform_role_permissions')",
    )
    .fetch_one(pool)
    .await;

    match probe {
        Ok(available) => available,
        Err(e) => {
            tracing::warn!(error = %e, "permission schema probe failed");
            false
        }
    }
}
