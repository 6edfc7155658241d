//! Error type and axum response integration

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with a structured error code
///
/// The wire format is intentionally small: `{"error": "<message>"}`, plus a
/// field-keyed `errors` map for validation failures.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Client-facing message
    pub message: String,
    /// Optional field-level details (validation errors)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a field-level detail entry
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// 400 with a custom message; add fields via [`AppError::with_detail`]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// 400 with a prebuilt field-keyed `errors` map
    pub fn validation_fields(errors: HashMap<String, Value>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: ErrorCode::ValidationFailed.message().to_string(),
            details: Some(errors),
        }
    }

    /// 401 `{"error":"Unauthorized"}`: missing/invalid/expired/wrong-audience token
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// 401 `{"error":"Invalid credentials"}`: bad email or password
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    /// 401: account exists but is not allowed to log in
    pub fn account_disabled() -> Self {
        Self::new(ErrorCode::AccountDisabled)
    }

    /// 403 `{"error":"Forbidden"}`: valid identity, insufficient permission
    pub fn forbidden() -> Self {
        Self::new(ErrorCode::PermissionDenied)
    }

    /// 403: read-only role attempted a mutating method
    pub fn read_only() -> Self {
        Self::new(ErrorCode::ReadOnlyRole)
    }

    /// 404
    pub fn not_found() -> Self {
        Self::new(ErrorCode::NotFound)
    }

    /// 409 with a custom message (duplicate email, duplicate key, ...)
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::AlreadyExists, msg)
    }

    /// 500, generic body; log the cause before constructing this
    pub fn internal() -> Self {
        Self::new(ErrorCode::InternalError)
    }
}

/// Serialized error body: `{"error": msg}` (+ `errors` field map when present)
#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a HashMap<String, Value>>,
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        // System faults are logged here; the client only sees a generic body
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "System error occurred");
        }

        let body = ErrorBody {
            error: &self.message,
            errors: self.details.as_ref(),
        };
        (self.http_status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::NotFound);
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_message() {
        let err = AppError::with_message(ErrorCode::AlreadyExists, "Merchant email already exists");
        assert_eq!(err.code, ErrorCode::AlreadyExists);
        assert_eq!(err.message, "Merchant email already exists");
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::validation("Missing required fields")
            .with_detail("email", "required")
            .with_detail("password", "required");

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details.get("email").unwrap(), "required");
        assert_eq!(details.get("password").unwrap(), "required");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(AppError::unauthorized().http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden().http_status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::conflict("dup").http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::internal().http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_shape() {
        let err = AppError::unauthorized();
        let body = ErrorBody {
            error: &err.message,
            errors: err.details.as_ref(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Unauthorized" }));
    }

    #[test]
    fn test_error_body_with_field_errors() {
        let err = AppError::validation("Validation failed").with_detail("name", "name is required");
        let body = ErrorBody {
            error: &err.message,
            errors: err.details.as_ref(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "Validation failed");
        assert_eq!(json["errors"]["name"], "name is required");
    }

    #[test]
    fn test_display() {
        let err = AppError::invalid_credentials();
        assert_eq!(format!("{}", err), "Invalid credentials");
    }
}
