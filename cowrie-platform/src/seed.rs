//! Idempotent bootstrap of the permission catalog and built-in roles, plus
//! the offline sweep that upgrades legacy plaintext credentials.
//!
//! Invoked as maintenance commands: `cowrie-platform seed` and
//! `cowrie-platform hash-passwords`.

use sqlx::PgPool;

use crate::auth::password;
use crate::db;
use crate::db::merchants::NewMerchant;
use crate::db::users::NewUser;
use crate::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Resource groups covered by the platform permission catalog
const PERMISSION_RESOURCES: &[(&str, &str)] = &[
    ("platform-admin", "Platform"),
    ("platform-role", "Platform"),
    ("platform-permission", "Platform"),
    ("platform-role-permission", "Platform"),
    ("merchant", "Merchant"),
    ("branch", "Merchant"),
    ("user", "Merchant"),
    ("permission", "Merchant"),
    ("branch-role", "Merchant"),
    ("branch-role-permission", "Merchant"),
];

const ACTIONS: &[(&str, &str)] = &[
    ("create", "Create"),
    ("view", "View"),
    ("update", "Update"),
    ("delete", "Delete"),
];

/// Seed the catalog, built-in roles, a bootstrap admin, and a demo merchant.
/// Every step is get-or-create; reruns are no-ops.
pub async fn run(state: &AppState) -> Result<(), BoxError> {
    let pool = &state.pool;
    let cost = state.config.bcrypt_cost;

    for (resource, group) in PERMISSION_RESOURCES {
        for (action, label) in ACTIONS {
            let key = format!("{action}-{resource}");
            let description = format!("{label} {}", resource.replace('-', " "));
            ensure_platform_permission(pool, &key, &description, group).await?;
        }
    }

    let super_admin_role_id =
        ensure_platform_role(pool, "Super Admin", "Full access", true, true).await?;
    let support_role_id =
        ensure_platform_role(pool, "Support", "Support staff", true, false).await?;

    // Superuser resolution bypasses the join table; the bindings are still
    // written so grant listings stay accurate.
    let permission_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM platform_permissions")
        .fetch_all(pool)
        .await?;
    for permission_id in permission_ids {
        db::platform_role_permissions::create(pool, super_admin_role_id, permission_id).await?;
    }

    let approve_merchant_id =
        ensure_platform_permission(pool, "approve-merchant", "Approve merchant", "Merchants")
            .await?;
    ensure_platform_permission(pool, "suspend-branch", "Suspend branch", "Merchants").await?;
    db::platform_role_permissions::create(pool, support_role_id, approve_merchant_id).await?;

    let admin_email = "admin@cowrie.local";
    if db::platform_admins::find_by_email(pool, admin_email)
        .await?
        .is_none()
    {
        let bootstrap_password =
            std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "change-me".into());
        let hash = password::hash(&bootstrap_password, cost)?;
        db::platform_admins::create(
            pool,
            Some(super_admin_role_id),
            "System",
            "Admin",
            admin_email,
            &hash,
            "active",
        )
        .await?;
        tracing::info!(email = admin_email, "bootstrap platform admin created");
    }

    // Demo merchant: HQ branch, Owner/Client roles, branch admin account
    let merchant_id = match sqlx::query_scalar::<_, i64>(
        "SELECT id FROM merchants WHERE merchant_code = $1",
    )
    .bind("M0001")
    .fetch_optional(pool)
    .await?
    {
        Some(id) => id,
        None => {
            db::merchants::create(
                pool,
                &NewMerchant {
                    merchant_code: "M0001",
                    name: "Demo Merchant",
                    legal_name: "Demo Merchant LLC",
                    email: "merchant@cowrie.local",
                    phone: Some("+10000000000"),
                    country: Some("US"),
                    city: Some("New York"),
                    address: Some("123 Demo Street"),
                    status: "active",
                },
            )
            .await?
        }
    };

    let branch_id =
        match sqlx::query_scalar::<_, i64>("SELECT id FROM branches WHERE code = $1")
            .bind("BR001")
            .fetch_optional(pool)
            .await?
        {
            Some(id) => id,
            None => {
                db::branches::create(pool, merchant_id, None, "HQ", "BR001", "hq", true, "active")
                    .await?
            }
        };

    let owner_role_id =
        ensure_branch_role(pool, branch_id, "Owner", "Merchant owner", true, false).await?;
    ensure_branch_role(
        pool,
        branch_id,
        "Client",
        "Read-only storefront access",
        true,
        true,
    )
    .await?;

    let create_product_id =
        ensure_branch_permission(pool, "create-product", "Create product", "Products").await?;
    let view_product_id =
        ensure_branch_permission(pool, "view-product", "View product", "Products").await?;
    for permission_id in [create_product_id, view_product_id] {
        db::branch_role_permissions::create(pool, owner_role_id, permission_id).await?;
    }

    let owner_email = "owner@cowrie.local";
    if db::users::find_by_email(pool, owner_email).await?.is_none() {
        let hash = password::hash("change-me", cost)?;
        db::users::create(
            pool,
            &NewUser {
                merchant_id,
                branch_id,
                merchant_role_id: Some(owner_role_id),
                first_name: "Demo",
                last_name: "Owner",
                email: owner_email,
                phone: None,
                password: &hash,
                status: "active",
            },
        )
        .await?;
        tracing::info!(email = owner_email, "demo merchant owner created");
    }

    tracing::info!("seed complete");
    Ok(())
}

/// Hash every legacy plaintext credential in place.
///
/// The same upgrade happens lazily at login; this sweep covers accounts that
/// never log in again.
pub async fn hash_passwords(pool: &PgPool, cost: u32) -> Result<(), BoxError> {
    #[derive(sqlx::FromRow)]
    struct CredentialRow {
        id: i64,
        password: String,
    }

    for table in ["users", "platform_admins"] {
        let rows: Vec<CredentialRow> =
            sqlx::query_as(&format!("SELECT id, password FROM {table}"))
                .fetch_all(pool)
                .await?;
        let total = rows.len();
        let mut updated = 0usize;
        let mut skipped = 0usize;

        for row in rows {
            if row.password.is_empty() || password::is_hashed(&row.password) {
                skipped += 1;
                continue;
            }
            let hash = password::hash(&row.password, cost)?;
            sqlx::query(&format!("UPDATE {table} SET password = $1 WHERE id = $2"))
                .bind(&hash)
                .bind(row.id)
                .execute(pool)
                .await?;
            updated += 1;
        }

        tracing::info!(table, total, updated, skipped, "password sweep finished");
    }
    Ok(())
}

async fn ensure_platform_permission(
    pool: &PgPool,
    key_name: &str,
    description: &str,
    group_name: &str,
) -> Result<i64, sqlx::Error> {
    if let Some(existing) = db::platform_permissions::find_by_key(pool, key_name).await? {
        return Ok(existing.id);
    }
    db::platform_permissions::create(pool, key_name, Some(description), Some(group_name)).await
}

async fn ensure_platform_role(
    pool: &PgPool,
    name: &str,
    description: &str,
    is_system: bool,
    is_super_admin: bool,
) -> Result<i64, sqlx::Error> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM platform_roles WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if let Some(id) = existing {
        return Ok(id);
    }
    db::platform_roles::create(pool, name, Some(description), is_system, is_super_admin).await
}

async fn ensure_branch_role(
    pool: &PgPool,
    branch_id: i64,
    name: &str,
    description: &str,
    is_system: bool,
    is_client: bool,
) -> Result<i64, sqlx::Error> {
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM branch_roles WHERE branch_id = $1 AND name = $2")
            .bind(branch_id)
            .bind(name)
            .fetch_optional(pool)
            .await?;
    if let Some(id) = existing {
        return Ok(id);
    }
    db::branch_roles::create(pool, branch_id, name, Some(description), is_system, is_client).await
}

async fn ensure_branch_permission(
    pool: &PgPool,
    key_name: &str,
    description: &str,
    group_name: &str,
) -> Result<i64, sqlx::Error> {
    if let Some(existing) = db::branch_permissions::find_by_key(pool, key_name).await? {
        return Ok(existing.id);
    }
    db::branch_permissions::create(pool, key_name, Some(description), Some(group_name)).await
}
