//! Session cookie construction and parsing
//!
//! Tokens ride in httpOnly cookies. In production the admin frontends are
//! served cross-site, so cookies carry `SameSite=None; Secure`; everywhere
//! else `SameSite=Lax` keeps local development on plain HTTP working.

use http::HeaderMap;

pub const PLATFORM_ACCESS_COOKIE: &str = "access_token";
pub const PLATFORM_REFRESH_COOKIE: &str = "refresh_token";
pub const MERCHANT_ACCESS_COOKIE: &str = "merchant_access_token";
pub const MERCHANT_REFRESH_COOKIE: &str = "merchant_refresh_token";

/// Build a `Set-Cookie` value for a session token
pub fn session_cookie(name: &str, value: &str, max_age_secs: i64, production: bool) -> String {
    let site_policy = if production {
        "SameSite=None; Secure"
    } else {
        "SameSite=Lax"
    };
    format!("{name}={value}; Path=/; HttpOnly; Max-Age={max_age_secs}; {site_policy}")
}

/// Build a `Set-Cookie` value that clears the named cookie
pub fn expired_cookie(name: &str, production: bool) -> String {
    session_cookie(name, "", 0, production)
}

/// Read a named cookie from the request `Cookie` header
pub fn request_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(http::header::COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::COOKIE;

    #[test]
    fn test_session_cookie_development() {
        let cookie = session_cookie(PLATFORM_ACCESS_COOKIE, "tok", 900, false);
        assert_eq!(
            cookie,
            "access_token=tok; Path=/; HttpOnly; Max-Age=900; SameSite=Lax"
        );
    }

    #[test]
    fn test_session_cookie_production() {
        let cookie = session_cookie(MERCHANT_REFRESH_COOKIE, "tok", 604800, true);
        assert!(cookie.contains("SameSite=None; Secure"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_expired_cookie() {
        let cookie = expired_cookie(PLATFORM_REFRESH_COOKIE, false);
        assert!(cookie.starts_with("refresh_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_request_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            "access_token=abc; merchant_access_token=def".parse().unwrap(),
        );
        assert_eq!(
            request_cookie(&headers, "access_token").as_deref(),
            Some("abc")
        );
        assert_eq!(
            request_cookie(&headers, "merchant_access_token").as_deref(),
            Some("def")
        );
        assert_eq!(request_cookie(&headers, "refresh_token"), None);
    }

    #[test]
    fn test_request_cookie_no_header() {
        assert_eq!(request_cookie(&HeaderMap::new(), "access_token"), None);
    }
}
