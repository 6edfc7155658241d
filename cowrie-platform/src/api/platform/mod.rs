//! Platform-side routes: operator authentication and control-plane
//! administration

pub mod admins;
pub mod auth;
pub mod permissions;
pub mod role_permissions;
pub mod roles;
