//! Account bootstrap.
//!
//! ```bash
//! RESMAN_ADMIN_PASSWORD=... resman admin create -e root@example.com -n "Root" -r superAdmin
//! ```
//!
//! The first super admin has to come from somewhere; this inserts it
//! directly into the database with an Argon2 password hash.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use resman_core::{AccountId, Email, EmailError, Role};
use resman_server::db::{PgStore, RepositoryError, ResmanStore, create_pool};
use resman_server::models::NewAccount;
use resman_server::services::auth::{AuthError, hash_password};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Missing environment variable: RESMAN_DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid role: {0}. Valid roles: superAdmin, admin")]
    InvalidRole(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("An account already exists with email: {0}")]
    AccountExists(String),

    #[error("Could not hash password: {0}")]
    Hash(#[from] AuthError),

    #[error("Storage error: {0}")]
    Repository(RepositoryError),
}

/// Create an admin or super admin account.
///
/// # Errors
///
/// Returns `AdminError` for an invalid role, email, or password, a taken
/// email, or a database failure.
pub async fn create(
    email: &str,
    name: &str,
    role: &str,
    password: &SecretString,
) -> Result<AccountId, AdminError> {
    let role: Role = role
        .parse()
        .ok()
        .filter(|role: &Role| role.can_register())
        .ok_or_else(|| AdminError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email)?;
    if password.expose_secret().trim().is_empty() {
        return Err(AdminError::EmptyPassword);
    }

    let database_url = super::database_url().ok_or(AdminError::MissingDatabaseUrl)?;
    tracing::info!("Connecting to database...");
    let store = PgStore::new(create_pool(&database_url).await?);

    tracing::info!("Creating {} account: {}", role, email);
    let account = store
        .insert_account(NewAccount {
            role,
            email: email.clone(),
            name: name.trim().to_string(),
            password_hash: hash_password(password.expose_secret())?,
            created_by: None,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::AccountExists(email.to_string()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!(
        "Account created successfully! ID: {}, Email: {}, Role: {}",
        account.id,
        account.email,
        role
    );
    Ok(account.id)
}
