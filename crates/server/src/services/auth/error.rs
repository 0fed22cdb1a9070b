//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] resman_core::EmailError),

    /// Missing field or a role that cannot register.
    #[error("{0}")]
    Validation(String),

    /// Wrong password, unknown email, or unknown role.
    #[error("incorrect login details")]
    InvalidCredentials,

    /// Email already registered in the role's table.
    #[error("email already used try a different one")]
    DuplicateEmail,

    /// Token absent, malformed, expired, or carrying an unknown role.
    #[error("invalid token")]
    SessionInvalid,

    /// Token was well-formed but has been logged out.
    #[error("invalid token")]
    TokenRevoked,

    /// Token could not be signed.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
