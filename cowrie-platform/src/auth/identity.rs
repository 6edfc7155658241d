//! Verified identity context injected into request extensions

use std::sync::Arc;

use super::tokens::{MerchantAccessClaims, PlatformAccessClaims};

/// Platform administrator identity, created by the platform auth middleware
#[derive(Debug, Clone)]
pub struct PlatformIdentity {
    pub sub: i64,
    pub email: String,
    pub platform_role_id: Option<i64>,
}

impl From<PlatformAccessClaims> for PlatformIdentity {
    fn from(claims: PlatformAccessClaims) -> Self {
        Self {
            sub: claims.sub,
            email: claims.email,
            platform_role_id: claims.platform_role_id,
        }
    }
}

/// Merchant user identity, created by the merchant auth middleware.
///
/// `is_client`/`role_name` are populated where the gate resolves the branch
/// role (the dual-audience gate); elsewhere they keep their defaults.
#[derive(Debug, Clone)]
pub struct MerchantIdentity {
    pub sub: i64,
    pub email: String,
    pub merchant_id: i64,
    pub branch_id: i64,
    pub merchant_role_id: Option<i64>,
    pub is_client: bool,
    pub role_name: Option<String>,
}

impl From<MerchantAccessClaims> for MerchantIdentity {
    fn from(claims: MerchantAccessClaims) -> Self {
        Self {
            sub: claims.sub,
            email: claims.email,
            merchant_id: claims.merchant_id,
            branch_id: claims.branch_id,
            merchant_role_id: claims.merchant_role_id,
            is_client: false,
            role_name: None,
        }
    }
}

/// Which audience authenticated the request on a dual-audience route.
/// Always present behind the dual gate, so handlers extract it without an
/// optional.
#[derive(Debug, Clone)]
pub enum DualAudience {
    Platform(PlatformIdentity),
    Merchant(MerchantIdentity),
}

impl DualAudience {
    /// The merchant identity, when the caller is merchant-scoped
    pub fn merchant(&self) -> Option<&MerchantIdentity> {
        match self {
            DualAudience::Merchant(identity) => Some(identity),
            DualAudience::Platform(_) => None,
        }
    }
}

/// Permission set resolved at most once per request; stacked gates share it
/// through request extensions.
#[derive(Debug, Clone)]
pub struct ResolvedPermissions(pub Arc<Vec<String>>);

impl ResolvedPermissions {
    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|p| p == key)
    }
}
