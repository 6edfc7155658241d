//! cowrie-platform — multi-tenant commerce control plane
//!
//! Long-running service that:
//! - Authenticates platform operators and merchant staff (JWT, dual audience)
//! - Resolves dynamic role/permission grants on every protected route
//! - Serves the control-plane CRUD API for merchants, branches, and staff

use cowrie_platform::{AppState, Config, api, seed};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cowrie_platform=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting cowrie-platform (env: {})", config.environment);

    // Initialize application state (connects, migrates, probes)
    let state = AppState::new(config).await?;

    // Maintenance commands run against the initialized state and exit
    match std::env::args().nth(1).as_deref() {
        Some("seed") => {
            seed::run(&state).await?;
            return Ok(());
        }
        Some("hash-passwords") => {
            seed::hash_passwords(&state.pool, state.config.bcrypt_cost).await?;
            return Ok(());
        }
        Some(other) => {
            return Err(format!("unknown command: {other}").into());
        }
        None => {}
    }

    let app = api::router(state.clone());

    // Periodic rate limiter cleanup (every 5 minutes)
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.cleanup();
        }
    });

    let addr = format!("0.0.0.0:{}", state.config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("cowrie-platform listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
