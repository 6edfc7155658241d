//! Authentication and authorization core
//!
//! Token issuance/verification, credential carriage, the plaintext→bcrypt
//! migration policy, permission resolution, and the route gates.

pub mod carriage;
pub mod cookies;
pub mod identity;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod rate_limit;
pub mod tokens;

pub use identity::{MerchantIdentity, PlatformIdentity};
pub use permissions::PermissionMap;
pub use tokens::{Audience, TokenService};
