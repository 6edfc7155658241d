//! Cowrie Platform — multi-tenant commerce control plane
//!
//! REST backend for two actor classes:
//!
//! - **Platform administrators**: operators of the control plane, authorized
//!   through a dynamic role/permission model.
//! - **Merchant users**: tenant staff scoped to a merchant and branch, with
//!   their own role table per branch.
//!
//! # Module structure
//!
//! ```text
//! cowrie-platform/src/
//! ├── config.rs      # Environment configuration
//! ├── state.rs       # Shared application state
//! ├── error.rs       # Service-layer error bridging sqlx -> AppError
//! ├── auth/          # Passwords, tokens, carriage, gates
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # Store adapters (one module per table)
//! └── seed.rs        # Catalog/role bootstrap + password migration sweep
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod seed;
pub mod state;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use state::AppState;
