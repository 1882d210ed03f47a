//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; the `IntoResponse` impl translates each variant to
//! an HTTP status and a `{ "success": false, "error": "…" }` JSON body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::{CheckoutError, RepositoryError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input: bad quantity bounds, missing fields, invalid enums.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found (or not owned by the requesting user).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Requested quantity exceeds live stock.
    #[error("Insufficient stock. Available: {available}")]
    InsufficientStock {
        /// Units currently in stock.
        available: i32,
    },

    /// Uniqueness conflict: duplicate wishlist entry, taken email/slug/SKU.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing, invalid, or expired credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not allowed (non-admin on an admin route).
    #[error("Forbidden")]
    Forbidden,

    /// Payment gateway failure (after compensation has run).
    #[error("Payment gateway error: {0}")]
    BadGateway(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::ProductNotFound(_) => Self::NotFound("Product"),
            CheckoutError::InsufficientStock { available, .. } => {
                Self::InsufficientStock { available }
            }
            CheckoutError::OrderNumberExhausted => Self::Internal(err.to_string()),
            CheckoutError::Repository(repo) => Self::Database(repo),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Validation(_) | Self::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::BadGateway(_) => "Payment could not be initiated".to_string(),
            _ => self.to_string(),
        };

        let body = serde_json::json!({
            "success": false,
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Map repository errors where "not found" has a resource name.
    ///
    /// `RepositoryError::NotFound` carries no context; handlers that know
    /// what they were looking up use this to produce a useful 404.
    #[must_use]
    pub fn from_repo(err: RepositoryError, what: &'static str) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound(what),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Product");
        assert_eq!(err.to_string(), "Product not found");

        let err = AppError::InsufficientStock { available: 3 };
        assert_eq!(err.to_string(), "Insufficient stock. Available: 3");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Validation("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::InsufficientStock { available: 0 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(AppError::NotFound("test")), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(AppError::Conflict("dup".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(get_status(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(AppError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            get_status(AppError::BadGateway("down".to_string())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repo_not_found_gets_resource_name() {
        let err = AppError::from_repo(RepositoryError::NotFound, "Cart item");
        assert_eq!(err.to_string(), "Cart item not found");
    }

    #[test]
    fn test_repo_conflict_passes_through() {
        let err = AppError::from_repo(
            RepositoryError::Conflict("email already exists".to_string()),
            "User",
        );
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_internal_details_are_redacted() {
        let response = AppError::Internal("connection pool exhausted".to_string()).into_response();
        // Body redaction is asserted via the message mapping; the status is
        // checked here since the body is consumed by the response.
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
