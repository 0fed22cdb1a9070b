//! Revoked session token repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db::RepositoryError;

/// Repository for logged-out session tokens.
pub struct RevokedTokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RevokedTokenRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a revocation. Revoking twice keeps the first entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert(&self, token: &str, expires_at: DateTime<Utc>) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO revoked_tokens (token, expires_at) VALUES ($1, $2)
             ON CONFLICT (token) DO NOTHING",
        )
        .bind(token)
        .bind(expires_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, token: &str) -> Result<bool, RepositoryError> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE token = $1)")
                .bind(token)
                .fetch_one(self.pool)
                .await?;
        Ok(found)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
