//! Identity and session.
//!
//! Registration and login for admins, super admins and owners, session
//! tokens, and logout. A token is resolved to an [`Actor`] by checking the
//! revocation list first and only then verifying the signature and expiry,
//! so a logged-out token is refused even while it would still verify.

mod error;
mod password;
mod token;

pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use token::{Claims, IssuedToken, TokenIssuer};

use chrono::Utc;

use resman_core::{AccountId, Email, Role};

use crate::authz::Actor;
use crate::db::{RepositoryError, SharedStore};
use crate::models::{Account, NewAccount};

/// Registration input as received from the client.
#[derive(Debug, Clone)]
pub struct Registration<'a> {
    pub role: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Login input as received from the client.
#[derive(Debug, Clone)]
pub struct Credentials<'a> {
    pub role: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// A signed-in account.
#[derive(Debug, Clone)]
pub struct Session {
    pub actor: Actor,
    pub token: IssuedToken,
}

/// Authentication service.
pub struct AuthService<'a> {
    store: &'a SharedStore,
    tokens: &'a TokenIssuer,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(store: &'a SharedStore, tokens: &'a TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Create an admin or super admin account and sign it in.
    ///
    /// # Errors
    ///
    /// - `AuthError::Validation` for a blank field or a role other than
    ///   `admin`/`superAdmin`
    /// - `AuthError::InvalidEmail` for a malformed email
    /// - `AuthError::DuplicateEmail` if the email is taken in that role's table
    pub async fn register(&self, input: Registration<'_>) -> Result<Session, AuthError> {
        for (value, field) in [
            (input.name, "name"),
            (input.email, "email"),
            (input.password, "password"),
            (input.role, "role"),
        ] {
            if value.trim().is_empty() {
                return Err(AuthError::Validation(format!("{field} is required")));
            }
        }
        let role = input
            .role
            .parse::<Role>()
            .ok()
            .filter(|role| role.can_register())
            .ok_or_else(|| AuthError::Validation("invalid role".to_string()))?;
        let email = Email::parse(input.email)?;

        let account = self
            .create_account(role, email, input.name.trim(), input.password, None)
            .await?;
        tracing::info!(account_id = %account.id, role = %role, "Account registered");
        self.issue_session(&account.id, role)
    }

    /// Insert an account of any role with a freshly hashed password. Owners
    /// are created through here by the owner service.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::DuplicateEmail` on an email clash and
    /// `AuthError::PasswordHash` if hashing fails.
    pub async fn create_account(
        &self,
        role: Role,
        email: Email,
        name: &str,
        password: &str,
        created_by: Option<AccountId>,
    ) -> Result<Account, AuthError> {
        let password_hash = hash_password(password)?;
        self.store
            .insert_account(NewAccount {
                role,
                email,
                name: name.to_string(),
                password_hash,
                created_by,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateEmail,
                other => AuthError::Repository(other),
            })
    }

    /// Check credentials and return the account id.
    ///
    /// Unknown roles, unknown emails and wrong passwords all fail the same way.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on any mismatch.
    pub async fn authenticate(&self, credentials: Credentials<'_>) -> Result<Actor, AuthError> {
        let role = credentials
            .role
            .parse::<Role>()
            .map_err(|_| AuthError::InvalidCredentials)?;
        let email = Email::parse(credentials.email).map_err(|_| AuthError::InvalidCredentials)?;
        let account = self
            .store
            .account_by_email(role, &email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(credentials.password, &account.password_hash)?;
        Ok(Actor::new(account.id, role))
    }

    /// Sign a session token for `id`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if signing fails.
    pub fn issue_session(&self, id: &AccountId, role: Role) -> Result<Session, AuthError> {
        let token = self.tokens.issue(id, role)?;
        Ok(Session {
            actor: Actor::new(id.clone(), role),
            token,
        })
    }

    /// Authenticate and sign in.
    ///
    /// # Errors
    ///
    /// See [`Self::authenticate`] and [`Self::issue_session`].
    pub async fn login(&self, credentials: Credentials<'_>) -> Result<Session, AuthError> {
        let actor = self.authenticate(credentials).await?;
        tracing::info!(account_id = %actor.id, role = %actor.role, "Login");
        self.issue_session(&actor.id, actor.role)
    }

    /// Revoke `token` until its natural expiry. Revoking twice is fine.
    ///
    /// Tokens that no longer verify are kept for one full validity window.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the revocation cannot be stored.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let expires_at = self.tokens.verify(token).map_or_else(
            |_| Utc::now() + self.tokens.validity(),
            |claims| claims.expires_at(),
        );
        self.store.revoke_token(token, expires_at).await?;
        Ok(())
    }

    /// Log out the session carried by `token`.
    ///
    /// # Errors
    ///
    /// See [`Self::revoke`].
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.revoke(token).await?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Whether `token` has been logged out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` on a storage failure.
    pub async fn check_revoked(&self, token: &str) -> Result<bool, AuthError> {
        Ok(self.store.is_token_revoked(token).await?)
    }

    /// Turn a presented token into the acting identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenRevoked` for a logged-out token,
    /// `AuthError::SessionInvalid` for an empty, forged, expired, or
    /// unknown-role token, and `AuthError::Repository` if the revocation
    /// list cannot be read.
    pub async fn resolve(&self, token: &str) -> Result<Actor, AuthError> {
        if token.is_empty() {
            return Err(AuthError::SessionInvalid);
        }
        if self.check_revoked(token).await? {
            return Err(AuthError::TokenRevoked);
        }
        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            AuthError::SessionInvalid
        })?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| AuthError::SessionInvalid)?;
        if claims.id.is_empty() {
            return Err(AuthError::SessionInvalid);
        }
        Ok(Actor::new(AccountId::new(claims.id), role))
    }
}
