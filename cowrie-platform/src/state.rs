//! Application state

use sqlx::PgPool;

use crate::auth::rate_limit::RateLimiter;
use crate::auth::tokens::TokenService;
use crate::config::Config;
use crate::db;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Service configuration
    pub config: Config,
    /// Token signer/verifier (both secret classes)
    pub tokens: TokenService,
    /// Rate limiter for login/registration routes
    pub rate_limiter: RateLimiter,
    /// Whether the permission join schema exists, probed once at startup.
    /// When false the resolver degrades to an empty permission set instead
    /// of surfacing low-level store errors mid-request.
    pub permissions_available: bool,
}

impl AppState {
    /// Create a new AppState: connect, migrate, probe the permission schema.
    pub async fn new(config: Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let permissions_available = db::permission_schema_available(&pool).await;
        if !permissions_available {
            tracing::warn!(
                "permission schema unavailable; platform admins resolve to an empty permission set"
            );
        }

        let tokens = TokenService::from_config(&config)?;

        Ok(Self {
            pool,
            tokens,
            rate_limiter: RateLimiter::new(),
            permissions_available,
            config,
        })
    }
}
