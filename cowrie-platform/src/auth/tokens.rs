//! Token issuance and verification
//!
//! Two token classes per audience: short-lived access tokens carrying the
//! identity linkage ids, and long-lived refresh tokens carrying only the
//! subject. Access and refresh tokens are signed with separate secrets, so a
//! refresh token can never pass where an access token is expected even before
//! any claim is inspected.
//!
//! There is no revocation list; expiry is the only lifecycle bound. Logout is
//! client-side cookie clearing, and an already-issued access token stays
//! valid until its natural expiry.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Identity class a token authenticates (the audience discriminant)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Platform,
    Merchant,
}

/// Access-token claims for a platform administrator
#[derive(Debug, Serialize, Deserialize)]
pub struct PlatformAccessClaims {
    #[serde(rename = "type")]
    pub audience: Audience,
    pub sub: i64,
    pub email: String,
    pub platform_role_id: Option<i64>,
    pub iat: i64,
    pub exp: i64,
}

/// Access-token claims for a merchant user
#[derive(Debug, Serialize, Deserialize)]
pub struct MerchantAccessClaims {
    #[serde(rename = "type")]
    pub audience: Audience,
    pub sub: i64,
    pub email: String,
    pub merchant_id: i64,
    pub branch_id: i64,
    pub merchant_role_id: Option<i64>,
    pub iat: i64,
    pub exp: i64,
}

/// Refresh-token claims: minimal surface to limit replay value
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    #[serde(rename = "type")]
    pub audience: Audience,
    pub sub: i64,
    pub iat: i64,
    pub exp: i64,
}

/// Token errors
///
/// Verification failures are a single opaque variant: signature mismatch,
/// structural corruption, expiry, and a wrong audience discriminant must be
/// indistinguishable to callers.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token rejected")]
    Rejected,
    #[error("token generation failed: {0}")]
    Generation(String),
}

/// Token signer/verifier holding both secret classes and the parsed TTLs
#[derive(Clone)]
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, BoxError> {
        let access_ttl = parse_ttl(&config.access_ttl)
            .ok_or_else(|| format!("invalid JWT_ACCESS_TTL: {}", config.access_ttl))?;
        let refresh_ttl = parse_ttl(&config.refresh_ttl)
            .ok_or_else(|| format!("invalid JWT_REFRESH_TTL: {}", config.refresh_ttl))?;
        Ok(Self::new(
            &config.jwt_access_secret,
            &config.jwt_refresh_secret,
            access_ttl,
            refresh_ttl,
        ))
    }

    /// Access-token lifetime in seconds (cookie Max-Age)
    pub fn access_max_age(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Refresh-token lifetime in seconds (cookie Max-Age)
    pub fn refresh_max_age(&self) -> i64 {
        self.refresh_ttl.num_seconds()
    }

    pub fn issue_platform_access(
        &self,
        sub: i64,
        email: &str,
        platform_role_id: Option<i64>,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = PlatformAccessClaims {
            audience: Audience::Platform,
            sub,
            email: email.to_string(),
            platform_role_id,
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    pub fn issue_merchant_access(
        &self,
        sub: i64,
        email: &str,
        merchant_id: i64,
        branch_id: i64,
        merchant_role_id: Option<i64>,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = MerchantAccessClaims {
            audience: Audience::Merchant,
            sub,
            email: email.to_string(),
            merchant_id,
            branch_id,
            merchant_role_id,
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    pub fn issue_refresh(&self, audience: Audience, sub: i64) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            audience,
            sub,
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    pub fn verify_platform_access(&self, token: &str) -> Result<PlatformAccessClaims, TokenError> {
        let data = decode::<PlatformAccessClaims>(token, &self.access_decoding, &validation())
            .map_err(|_| TokenError::Rejected)?;
        if data.claims.audience != Audience::Platform {
            return Err(TokenError::Rejected);
        }
        Ok(data.claims)
    }

    pub fn verify_merchant_access(&self, token: &str) -> Result<MerchantAccessClaims, TokenError> {
        let data = decode::<MerchantAccessClaims>(token, &self.access_decoding, &validation())
            .map_err(|_| TokenError::Rejected)?;
        if data.claims.audience != Audience::Merchant {
            return Err(TokenError::Rejected);
        }
        Ok(data.claims)
    }

    pub fn verify_refresh(
        &self,
        token: &str,
        expected: Audience,
    ) -> Result<RefreshClaims, TokenError> {
        let data = decode::<RefreshClaims>(token, &self.refresh_decoding, &validation())
            .map_err(|_| TokenError::Rejected)?;
        if data.claims.audience != expected {
            return Err(TokenError::Rejected);
        }
        Ok(data.claims)
    }
}

fn validation() -> Validation {
    Validation::default()
}

/// Parse a TTL string: "45s", "15m", "12h", "7d", or bare seconds.
pub fn parse_ttl(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Some(days) = value.strip_suffix('d') {
        days.parse().ok().map(Duration::days)
    } else if let Some(hours) = value.strip_suffix('h') {
        hours.parse().ok().map(Duration::hours)
    } else if let Some(minutes) = value.strip_suffix('m') {
        minutes.parse().ok().map(Duration::minutes)
    } else if let Some(seconds) = value.strip_suffix('s') {
        seconds.parse().ok().map(Duration::seconds)
    } else {
        value.parse().ok().map(Duration::seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(
            "test-access-secret",
            "test-refresh-secret",
            Duration::minutes(15),
            Duration::days(7),
        )
    }

    #[test]
    fn test_platform_access_roundtrip() {
        let svc = service();
        let token = svc
            .issue_platform_access(7, "admin@example.com", Some(3))
            .unwrap();
        let claims = svc.verify_platform_access(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.platform_role_id, Some(3));
        assert_eq!(claims.audience, Audience::Platform);
    }

    #[test]
    fn test_merchant_access_roundtrip() {
        let svc = service();
        let token = svc
            .issue_merchant_access(12, "staff@example.com", 4, 9, None)
            .unwrap();
        let claims = svc.verify_merchant_access(&token).unwrap();
        assert_eq!(claims.sub, 12);
        assert_eq!(claims.merchant_id, 4);
        assert_eq!(claims.branch_id, 9);
        assert_eq!(claims.merchant_role_id, None);
    }

    #[test]
    fn test_cross_audience_rejected() {
        let svc = service();
        let merchant = svc
            .issue_merchant_access(12, "staff@example.com", 4, 9, Some(2))
            .unwrap();
        // structurally valid signature, wrong discriminant
        assert!(svc.verify_platform_access(&merchant).is_err());

        let platform = svc.issue_platform_access(7, "a@b.c", None).unwrap();
        assert!(svc.verify_merchant_access(&platform).is_err());
    }

    #[test]
    fn test_secret_classes_are_separate() {
        let svc = service();
        let refresh = svc.issue_refresh(Audience::Platform, 7).unwrap();
        // a refresh token must never pass access verification
        assert!(svc.verify_platform_access(&refresh).is_err());

        let access = svc.issue_platform_access(7, "a@b.c", None).unwrap();
        assert!(svc.verify_refresh(&access, Audience::Platform).is_err());
    }

    #[test]
    fn test_refresh_audience_checked() {
        let svc = service();
        let refresh = svc.issue_refresh(Audience::Merchant, 12).unwrap();
        assert!(svc.verify_refresh(&refresh, Audience::Merchant).is_ok());
        assert!(svc.verify_refresh(&refresh, Audience::Platform).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // expired well past the default validation leeway
        let svc = TokenService::new(
            "test-access-secret",
            "test-refresh-secret",
            Duration::seconds(-120),
            Duration::seconds(-120),
        );
        let token = svc.issue_platform_access(7, "a@b.c", None).unwrap();
        assert!(svc.verify_platform_access(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let svc = service();
        let other = TokenService::new(
            "other-access-secret",
            "other-refresh-secret",
            Duration::minutes(15),
            Duration::days(7),
        );
        let token = other.issue_platform_access(7, "a@b.c", None).unwrap();
        assert!(svc.verify_platform_access(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let svc = service();
        assert!(svc.verify_platform_access("not-a-token").is_err());
        assert!(svc.verify_refresh("", Audience::Platform).is_err());
    }

    #[test]
    fn test_parse_ttl() {
        assert_eq!(parse_ttl("15m"), Some(Duration::minutes(15)));
        assert_eq!(parse_ttl("7d"), Some(Duration::days(7)));
        assert_eq!(parse_ttl("45s"), Some(Duration::seconds(45)));
        assert_eq!(parse_ttl("12h"), Some(Duration::hours(12)));
        assert_eq!(parse_ttl("900"), Some(Duration::seconds(900)));
        assert_eq!(parse_ttl("soon"), None);
        assert_eq!(parse_ttl(""), None);
    }
}
