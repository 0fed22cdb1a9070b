//! Service error taxonomy.

use thiserror::Error;

use crate::authz::{AuthzError, Denial, DenyKind};
use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::batch::BatchOutcome;

/// Client-visible class of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationFailed,
    NotFound,
    Unauthorized,
    DuplicateEmail,
    SessionInvalid,
    PartialFailure,
    Internal,
}

/// Errors returned by every service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    ValidationFailed(String),

    /// The referenced id does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The actor lacks the role or ownership for an existing resource.
    #[error("{0}")]
    Unauthorized(String),

    /// Email already taken within the same account table.
    #[error("email already used try a different one")]
    DuplicateEmail,

    /// Token absent, malformed, or expired.
    #[error("invalid token")]
    SessionInvalid,

    /// Token was logged out. Reported to clients like `SessionInvalid`.
    #[error("invalid token")]
    TokenRevoked,

    /// Some items of one or more batches were refused; the rest were
    /// committed.
    #[error("{}", partial_failure_message(.0))]
    PartialFailure(Vec<BatchOutcome>),

    /// Storage or infrastructure failure. The detail is for logs only.
    #[error("internal error: {0}")]
    Internal(String),
}

fn partial_failure_message(outcomes: &[BatchOutcome]) -> String {
    outcomes
        .iter()
        .map(BatchOutcome::message)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ServiceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationFailed(_) => ErrorKind::ValidationFailed,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::DuplicateEmail => ErrorKind::DuplicateEmail,
            Self::SessionInvalid | Self::TokenRevoked => ErrorKind::SessionInvalid,
            Self::PartialFailure(_) => ErrorKind::PartialFailure,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<Denial> for ServiceError {
    fn from(denial: Denial) -> Self {
        match denial.kind() {
            DenyKind::NotFound => Self::NotFound(denial.to_string()),
            DenyKind::Unauthorized => Self::Unauthorized(denial.to_string()),
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::DuplicateEmail,
            RepositoryError::NotFound => Self::NotFound("resource does not exist".to_string()),
            RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Denied(denial) => denial.into(),
            AuthzError::Store(store) => store.into(),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(e) => Self::ValidationFailed(format!("invalid email: {e}")),
            AuthError::Validation(msg) => Self::ValidationFailed(msg),
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::DuplicateEmail => Self::DuplicateEmail,
            AuthError::SessionInvalid => Self::SessionInvalid,
            AuthError::TokenRevoked => Self::TokenRevoked,
            AuthError::Token(_) | AuthError::PasswordHash => Self::Internal(err.to_string()),
            AuthError::Repository(repo) => repo.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denials_split_by_kind() {
        let err = ServiceError::from(Denial::RestaurantNotFound);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "restaurant does not exist");

        let err = ServiceError::from(Denial::InvalidRestaurantCreator);
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            err.to_string(),
            "can not update restaurant created by other admin"
        );
    }

    #[test]
    fn test_conflict_is_duplicate_email() {
        let err = ServiceError::from(RepositoryError::Conflict("email".into()));
        assert_eq!(err.kind(), ErrorKind::DuplicateEmail);
        assert_eq!(err.to_string(), "email already used try a different one");
    }

    #[test]
    fn test_partial_failure_message() {
        let mut outcome = BatchOutcome::new("Dishes");
        outcome.record_failure(2);
        let err = ServiceError::PartialFailure(vec![outcome]);
        assert_eq!(err.to_string(), "Dishes Deleted Except entry no. 2");
    }
}
