//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-class errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; every error becomes a structured JSON response
//! and none crashes the process.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::images::CloudinaryError;
use crate::services::orders::OrderError;
use crate::services::payments::StripeError;

/// Application-level error taxonomy.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid bearer token.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Valid identity, wrong role.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Referenced entity absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness conflict (e.g. email already registered).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Requested quantity exceeds current stock.
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    /// Payment processor failure.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Unauthorized(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::InsufficientStock(_) => StatusCode::CONFLICT,
            Self::Gateway(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal detail is never leaked.
    fn message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Gateway(_) => "Payment service error".to_string(),
            Self::Validation(msg)
            | Self::Unauthenticated(msg)
            | Self::Unauthorized(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::InsufficientStock(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_) | Self::Gateway(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = json!({ "message": self.message() });
        (self.status(), Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(e) => Self::Validation(e.to_string()),
            AuthError::WeakPassword(msg) => Self::Validation(msg),
            AuthError::InvalidCredentials => {
                Self::Unauthenticated("Invalid email or password".to_string())
            }
            AuthError::UserAlreadyExists => {
                Self::Conflict("An account with this email already exists".to_string())
            }
            AuthError::InvalidToken | AuthError::UserNotFound => {
                Self::Unauthenticated("Not authorized, token failed".to_string())
            }
            AuthError::TokenExpired => Self::Unauthenticated("Token expired".to_string()),
            AuthError::Repository(e) => Self::Database(e),
            AuthError::PasswordHash | AuthError::TokenSigning => {
                Self::Internal("authentication backend failure".to_string())
            }
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::EmptyOrder | OrderError::ZeroQuantity => {
                Self::Validation(err.to_string())
            }
            OrderError::ProductNotFound(_) => Self::NotFound("Product not found".to_string()),
            OrderError::OrderNotFound => Self::NotFound("Order not found".to_string()),
            OrderError::InsufficientStock(name) => Self::InsufficientStock(format!(
                "Insufficient stock for {name}"
            )),
            OrderError::NotPurchaser => Self::Unauthorized("Not your order".to_string()),
            OrderError::OrderVoided | OrderError::MissingIntent | OrderError::PaymentNotSettled => {
                Self::Validation(err.to_string())
            }
            OrderError::AmountOutOfRange => Self::Internal(err.to_string()),
            OrderError::Gateway(e) => Self::Gateway(e.to_string()),
            OrderError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<StripeError> for AppError {
    fn from(err: StripeError) -> Self {
        Self::Gateway(err.to_string())
    }
}

impl From<CloudinaryError> for AppError {
    fn from(err: CloudinaryError) -> Self {
        Self::Gateway(err.to_string())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use farmlink_core::ProductId;

    #[test]
    fn test_status_classes() {
        assert_eq!(
            AppError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthenticated("no token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Unauthorized("wrong role".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("gone".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InsufficientStock("tomatoes".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Gateway("down".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let err = AppError::Internal("connection string was postgres://...".to_string());
        assert_eq!(err.message(), "Internal server error");

        let err = AppError::Gateway("stripe key sk_live_x rejected".to_string());
        assert_eq!(err.message(), "Payment service error");
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let err = AppError::NotFound("Product not found".to_string());
        assert_eq!(err.message(), "Product not found");
    }

    #[test]
    fn test_order_error_mapping() {
        let err: AppError = OrderError::EmptyOrder.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: AppError = OrderError::ProductNotFound(ProductId::generate()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: AppError = OrderError::InsufficientStock("Milk".into()).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.message(), "Insufficient stock for Milk");

        let err: AppError = OrderError::NotPurchaser.into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_auth_error_mapping() {
        let err: AppError = AuthError::InvalidCredentials.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err: AppError = AuthError::UserAlreadyExists.into();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: AppError = AuthError::WeakPassword("too short".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
