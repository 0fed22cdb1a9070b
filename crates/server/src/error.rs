//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//! Bodies are always `{"error": "<message>"}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::{ErrorKind, ServiceError};
use crate::services::auth::AuthError;

/// Status used for an absent, invalid, expired, or revoked session token.
pub const SESSION_INVALID_STATUS: u16 = 498;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// A service operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Malformed request: bad JSON, bad id, missing query parameter.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        Self::Service(err.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    /// Status code for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Service(err) => match err.kind() {
                ErrorKind::ValidationFailed
                | ErrorKind::NotFound
                | ErrorKind::DuplicateEmail
                | ErrorKind::PartialFailure => StatusCode::BAD_REQUEST,
                ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
                ErrorKind::SessionInvalid => StatusCode::from_u16(SESSION_INVALID_STATUS)
                    .unwrap_or(StatusCode::UNAUTHORIZED),
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Internal(_) | Self::Service(ServiceError::Internal(_))
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if self.is_server_error() {
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from the acting account.
///
/// Call this after a token resolves so errors are associated with the caller.
pub fn set_sentry_user(user_id: &impl ToString, role: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
        scope.set_tag("role", role);
    });
}
