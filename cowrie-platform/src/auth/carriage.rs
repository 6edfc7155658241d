//! Credential carriage: locating the candidate token on a request
//!
//! Strict resolution order: `Authorization: Bearer` header, then the named
//! cookie, then (refresh only) a `refresh_token` body field. First match
//! wins; no candidate means the caller rejects with 401.

use http::HeaderMap;

use super::cookies;

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}

/// Access-token candidate: bearer header, then the named cookie
pub fn access_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    bearer_token(headers).or_else(|| cookies::request_cookie(headers, cookie_name))
}

/// Refresh-token candidate: bearer header, named cookie, then the body field
pub fn refresh_token(
    headers: &HeaderMap,
    cookie_name: &str,
    body_token: Option<&str>,
) -> Option<String> {
    bearer_token(headers)
        .or_else(|| cookies::request_cookie(headers, cookie_name))
        .or_else(|| body_token.map(str::to_owned))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{AUTHORIZATION, COOKIE};

    fn headers(auth: Option<&str>, cookie: Option<&str>) -> HeaderMap {
        let mut h = HeaderMap::new();
        if let Some(auth) = auth {
            h.insert(AUTHORIZATION, auth.parse().unwrap());
        }
        if let Some(cookie) = cookie {
            h.insert(COOKIE, cookie.parse().unwrap());
        }
        h
    }

    #[test]
    fn test_bearer_wins_over_cookie() {
        let h = headers(Some("Bearer header-tok"), Some("access_token=cookie-tok"));
        assert_eq!(
            access_token(&h, "access_token").as_deref(),
            Some("header-tok")
        );
    }

    #[test]
    fn test_cookie_fallback() {
        let h = headers(None, Some("access_token=cookie-tok"));
        assert_eq!(
            access_token(&h, "access_token").as_deref(),
            Some("cookie-tok")
        );
    }

    #[test]
    fn test_non_bearer_scheme_ignored() {
        let h = headers(Some("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_token(&h), None);
    }

    #[test]
    fn test_refresh_body_is_last_resort() {
        let h = headers(None, Some("refresh_token=cookie-tok"));
        assert_eq!(
            refresh_token(&h, "refresh_token", Some("body-tok")).as_deref(),
            Some("cookie-tok")
        );

        let h = headers(None, None);
        assert_eq!(
            refresh_token(&h, "refresh_token", Some("body-tok")).as_deref(),
            Some("body-tok")
        );
    }

    #[test]
    fn test_no_candidates() {
        let h = headers(None, None);
        assert_eq!(access_token(&h, "access_token"), None);
        assert_eq!(refresh_token(&h, "refresh_token", None), None);
    }
}
