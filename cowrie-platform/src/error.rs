//! Unified service-layer error type
//!
//! `ServiceError` bridges DB-layer errors (`sqlx::Error`) and the API-layer
//! error (`AppError`) so handlers can use `?` without per-call
//! `.map_err(|e| { tracing::error!(...); ... })` boilerplate.

use axum::response::IntoResponse;
use shared::error::AppError;

/// Service-layer error, only two variants.
///
/// - `Db`: database/infrastructure errors (logged, mapped to a generic 500;
///   uniqueness violations become 409)
/// - `App`: business-rule errors (pass-through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Db(sqlx::Error),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                if let sqlx::Error::Database(ref inner) = db_err {
                    // A check/insert race on a unique key surfaces here
                    // instead of as a silent duplicate.
                    if inner.is_unique_violation() {
                        return AppError::conflict("Already exists");
                    }
                    if inner.is_foreign_key_violation() {
                        return AppError::validation("Referenced row does not exist");
                    }
                }
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(shared::error::ErrorCode::DatabaseError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;
