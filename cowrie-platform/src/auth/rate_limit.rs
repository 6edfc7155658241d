//! Application-layer rate limiting for credential endpoints

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

struct Window {
    count: u32,
    started: Instant,
}

/// Fixed-window request counter keyed by route and client IP
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<(&'static str, String), Window>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
        }
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    pub fn check(&self, route: &'static str, ip: &str, max_requests: u32, window_secs: u64) -> bool {
        let mut entry = self
            .windows
            .entry((route, ip.to_owned()))
            .or_insert_with(|| Window {
                count: 0,
                started: Instant::now(),
            });

        if entry.started.elapsed().as_secs() >= window_secs {
            entry.count = 0;
            entry.started = Instant::now();
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Drop windows idle for more than 5 minutes
    pub fn cleanup(&self) {
        let cutoff = Duration::from_secs(300);
        self.windows.retain(|_, w| w.started.elapsed() < cutoff);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract client IP: `X-Forwarded-For` first (load balancer), then the peer
/// address.
fn extract_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
    {
        // comma-separated; the first entry is the original client
        if let Some(first) = val.split(',').next() {
            let ip = first.trim();
            if !ip.is_empty() {
                return ip.to_owned();
            }
        }
    }

    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

fn too_many_requests() -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        axum::Json(serde_json::json!({"error": "Too many requests, try again later"})),
    )
        .into_response()
}

/// Rate limit middleware for login routes: 5 requests/minute per IP
pub async fn login_rate_limit(
    State(state): State<crate::state::AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let ip = extract_ip(&request);
    if !state.rate_limiter.check("login", &ip, 5, 60) {
        return Err(too_many_requests());
    }
    Ok(next.run(request).await)
}

/// Rate limit middleware for merchant registration: 3 requests/minute per IP
pub async fn register_rate_limit(
    State(state): State<crate::state::AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let ip = extract_ip(&request);
    if !state.rate_limiter.check("register", &ip, 3, 60) {
        return Err(too_many_requests());
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_enforced_within_window() {
        let limiter = RateLimiter::new();
        for _ in 0..5 {
            assert!(limiter.check("login", "10.0.0.1", 5, 60));
        }
        assert!(!limiter.check("login", "10.0.0.1", 5, 60));
    }

    #[test]
    fn test_routes_and_ips_are_independent() {
        let limiter = RateLimiter::new();
        for _ in 0..5 {
            assert!(limiter.check("login", "10.0.0.1", 5, 60));
        }
        assert!(limiter.check("login", "10.0.0.2", 5, 60));
        assert!(limiter.check("register", "10.0.0.1", 3, 60));
    }

    #[test]
    fn test_cleanup_keeps_fresh_windows() {
        let limiter = RateLimiter::new();
        limiter.check("login", "10.0.0.1", 5, 60);
        limiter.cleanup();
        // fresh entry survives, counting continues
        assert!(limiter.check("login", "10.0.0.1", 5, 60));
    }
}
