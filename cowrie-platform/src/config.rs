//! Service configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Platform server configuration, loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Allowed CORS origin for the admin frontends
    pub cors_origin: String,
    /// Signing secret for access tokens
    pub jwt_access_secret: String,
    /// Signing secret for refresh tokens (distinct from the access secret)
    pub jwt_refresh_secret: String,
    /// Access token TTL, e.g. "15m"
    pub access_ttl: String,
    /// Refresh token TTL, e.g. "7d"
    pub refresh_ttl: String,
    /// bcrypt work factor for password hashing
    pub bcrypt_cost: u32,
    /// Operator escape hatch: every verified platform token passes every
    /// permission gate. Threaded into the gates via AppState.
    pub platform_full_access: bool,
    /// Name of the read-only merchant role
    pub client_role_name: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            jwt_access_secret: Self::require_secret("JWT_ACCESS_SECRET", &environment)?,
            jwt_refresh_secret: Self::require_secret("JWT_REFRESH_SECRET", &environment)?,
            access_ttl: std::env::var("JWT_ACCESS_TTL").unwrap_or_else(|_| "15m".into()),
            refresh_ttl: std::env::var("JWT_REFRESH_TTL").unwrap_or_else(|_| "7d".into()),
            bcrypt_cost: std::env::var("BCRYPT_COST")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(10),
            platform_full_access: std::env::var("PLATFORM_ADMIN_FULL_ACCESS")
                .is_ok_and(|v| v == "true"),
            client_role_name: std::env::var("CLIENT_ROLE_NAME").unwrap_or_else(|_| "Client".into()),
            environment,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
