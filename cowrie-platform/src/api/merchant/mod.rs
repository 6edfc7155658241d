//! Merchant-side routes: tenant staff authentication, self-registration, and
//! the tenant administration resources

pub mod auth;
pub mod branches;
pub mod merchants;
pub mod permissions;
pub mod role_permissions;
pub mod roles;
pub mod users;
