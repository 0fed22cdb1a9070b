//! Session extractor.
//!
//! The token is read from the `token` header, falling back to
//! `Authorization: Bearer`. It is resolved through the auth service, which
//! checks the revocation list before the signature.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};

use crate::authz::Actor;
use crate::error::{AppError, set_sentry_user};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "token";

/// Extractor that requires a live session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireActor { actor, .. }: RequireActor) -> String {
///     actor.id.to_string()
/// }
/// ```
pub struct RequireActor {
    pub actor: Actor,
    /// The raw token, needed to log out.
    pub token: String,
}

/// Why a session was refused.
#[derive(Debug)]
pub enum SessionRejection {
    /// Token missing, forged, or expired.
    Invalid,
    /// Token was logged out.
    Revoked,
    /// The revocation list could not be read.
    Store(AuthError),
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Invalid => AppError::from(AuthError::SessionInvalid).into_response(),
            Self::Revoked => AppError::from(AuthError::TokenRevoked).into_response(),
            Self::Store(err) => AppError::from(err).into_response(),
        }
    }
}

/// Pull the token out of the request headers.
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(token.trim()).filter(|t| !t.is_empty());
    }
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for RequireActor {
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers)
            .ok_or(SessionRejection::Invalid)?
            .to_string();

        let actor = AuthService::new(state.store(), state.tokens())
            .resolve(&token)
            .await
            .map_err(|e| match e {
                AuthError::SessionInvalid => SessionRejection::Invalid,
                AuthError::TokenRevoked => {
                    tracing::debug!("Rejected logged-out token");
                    SessionRejection::Revoked
                }
                other => SessionRejection::Store(other),
            })?;

        tracing::Span::current().record("account_id", actor.id.as_str());
        set_sentry_user(&actor.id, actor.role.as_str());
        Ok(Self { actor, token })
    }
}
