//! Shared types for the Cowrie platform
//!
//! Currently holds the unified error system used by the service crates.

pub mod error;

pub use error::{AppError, AppResult, ErrorCode};
