//! Route permission requirements and effective-permission resolution

use http::Method;
use sqlx::PgPool;

/// Per-resource binding of HTTP method to required permission key.
///
/// Built once at router assembly and handed to the gate factory; methods
/// without a binding are unrestricted for authenticated callers.
#[derive(Debug, Clone, Copy)]
pub struct PermissionMap {
    pub get: Option<&'static str>,
    pub post: Option<&'static str>,
    pub put: Option<&'static str>,
    pub delete: Option<&'static str>,
}

impl PermissionMap {
    /// Standard view/create/update/delete binding for a CRUD resource
    pub const fn crud(
        view: &'static str,
        create: &'static str,
        update: &'static str,
        delete: &'static str,
    ) -> Self {
        Self {
            get: Some(view),
            post: Some(create),
            put: Some(update),
            delete: Some(delete),
        }
    }

    /// Required permission for a method; HEAD is treated as GET.
    pub fn required_for(&self, method: &Method) -> Option<&'static str> {
        if method == Method::GET || method == Method::HEAD {
            self.get
        } else if method == Method::POST {
            self.post
        } else if method == Method::PUT {
            self.put
        } else if method == Method::DELETE {
            self.delete
        } else {
            None
        }
    }
}

/// Role row joined from a platform admin
#[derive(Debug, sqlx::FromRow)]
pub struct RoleRow {
    pub id: i64,
    pub name: String,
    pub is_system: bool,
    pub is_super_admin: bool,
}

/// Branch role row consulted for read-only detection
#[derive(Debug, sqlx::FromRow)]
pub struct BranchRoleRow {
    pub name: String,
    pub is_client: bool,
}

pub const SUPER_ADMIN_ROLE_NAME: &str = "Super Admin";

/// Whether a role grants the full permission catalog.
///
/// The `is_super_admin` tag is authoritative; the case-insensitive name
/// comparison remains as a compatibility shim for installs seeded before the
/// tag existed.
pub fn is_superuser_role(role: &RoleRow) -> bool {
    role.is_system && (role.is_super_admin || role.name.eq_ignore_ascii_case(SUPER_ADMIN_ROLE_NAME))
}

/// Whether a branch role is the designated read-only role.
pub fn is_client_role(role: &BranchRoleRow, configured_name: &str) -> bool {
    role.is_client || role.name.eq_ignore_ascii_case(configured_name)
}

/// Effective permission keys for a platform admin.
///
/// Superuser roles get the whole catalog without touching the join table, so
/// newly inserted permissions apply to them with no migration step. An absent
/// role or an empty join is an empty set, not an error. When the permission
/// schema itself is unavailable (`schema_available` probed at startup) the
/// result is deterministically empty.
pub async fn resolve(
    pool: &PgPool,
    admin_id: i64,
    schema_available: bool,
) -> Result<Vec<String>, sqlx::Error> {
    if !schema_available {
        return Ok(Vec::new());
    }

    let role: Option<RoleRow> = sqlx::query_as(
        "SELECT r.id, r.name, r.is_system, r.is_super_admin
         FROM platform_admins a
         JOIN platform_roles r ON r.id = a.platform_role_id
         WHERE a.id = $1",
    )
    .bind(admin_id)
    .fetch_optional(pool)
    .await?;

    let Some(role) = role else {
        return Ok(Vec::new());
    };

    if is_superuser_role(&role) {
        return sqlx::query_scalar("SELECT key_name FROM platform_permissions ORDER BY key_name")
            .fetch_all(pool)
            .await;
    }

    sqlx::query_scalar(
        "SELECT DISTINCT p.key_name
         FROM platform_role_permissions rp
         JOIN platform_permissions p ON p.id = rp.platform_permission_id
         WHERE rp.platform_role_id = $1",
    )
    .bind(role.id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS: PermissionMap =
        PermissionMap::crud("view-user", "create-user", "update-user", "delete-user");

    #[test]
    fn test_required_for_maps_methods() {
        assert_eq!(USERS.required_for(&Method::GET), Some("view-user"));
        assert_eq!(USERS.required_for(&Method::POST), Some("create-user"));
        assert_eq!(USERS.required_for(&Method::PUT), Some("update-user"));
        assert_eq!(USERS.required_for(&Method::DELETE), Some("delete-user"));
    }

    #[test]
    fn test_head_is_treated_as_get() {
        assert_eq!(USERS.required_for(&Method::HEAD), Some("view-user"));
    }

    #[test]
    fn test_unbound_methods_are_unrestricted() {
        let read_only = PermissionMap {
            get: Some("view-user"),
            post: None,
            put: None,
            delete: None,
        };
        assert_eq!(read_only.required_for(&Method::POST), None);
        assert_eq!(read_only.required_for(&Method::PATCH), None);
    }

    fn role(name: &str, is_system: bool, is_super_admin: bool) -> RoleRow {
        RoleRow {
            id: 1,
            name: name.to_string(),
            is_system,
            is_super_admin,
        }
    }

    #[test]
    fn test_superuser_by_tag() {
        assert!(is_superuser_role(&role("Operations", true, true)));
    }

    #[test]
    fn test_superuser_by_legacy_name() {
        assert!(is_superuser_role(&role("Super Admin", true, false)));
        assert!(is_superuser_role(&role("super admin", true, false)));
    }

    #[test]
    fn test_non_system_role_never_superuser() {
        assert!(!is_superuser_role(&role("Super Admin", false, false)));
        assert!(!is_superuser_role(&role("Super Admin", false, true)));
    }

    #[test]
    fn test_ordinary_role_not_superuser() {
        assert!(!is_superuser_role(&role("Support", true, false)));
    }

    #[test]
    fn test_client_role_detection() {
        let tagged = BranchRoleRow {
            name: "Viewer".to_string(),
            is_client: true,
        };
        let named = BranchRoleRow {
            name: "client".to_string(),
            is_client: false,
        };
        let other = BranchRoleRow {
            name: "Owner".to_string(),
            is_client: false,
        };
        assert!(is_client_role(&tagged, "Client"));
        assert!(is_client_role(&named, "Client"));
        assert!(!is_client_role(&other, "Client"));
    }
}
