//! Account repository for the three role tables.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use resman_core::{AccountId, Email, Role};

use super::map_unique_violation;
use crate::db::RepositoryError;
use crate::models::{Account, AccountUpdate, NewAccount};

const ACCOUNT_COLUMNS: &str = "id, email, name, password_hash, created_by, created_at";

/// Table holding accounts of `role`.
const fn table(role: Role) -> &'static str {
    match role {
        Role::SuperAdmin => "super_admins",
        Role::Admin => "admins",
        Role::Owner => "owners",
    }
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: String,
    email: String,
    name: String,
    password_hash: String,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self, role: Role) -> Result<Account, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in {}: {e}", table(role)))
        })?;

        Ok(Account {
            id: AccountId::from(self.id),
            role,
            email,
            name: self.name,
            password_hash: self.password_hash,
            created_by: self.created_by.map(AccountId::from),
            created_at: self.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for account database operations.
pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an account with a freshly minted id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken in the role's table.
    pub async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let role = account.role;
        let sql = format!(
            "INSERT INTO {} (id, email, name, password_hash, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ACCOUNT_COLUMNS}",
            table(role)
        );

        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(AccountId::generate())
            .bind(&account.email)
            .bind(&account.name)
            .bind(&account.password_hash)
            .bind(account.created_by.as_ref())
            .fetch_one(self.pool)
            .await
            .map_err(|e| map_unique_violation(e, &format!("{role} email {} already exists", account.email)))?;

        row.into_account(role)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        role: Role,
        id: &AccountId,
    ) -> Result<Option<Account>, RepositoryError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM {} WHERE id = $1", table(role));
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(|r| r.into_account(role)).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(
        &self,
        role: Role,
        email: &Email,
    ) -> Result<Option<Account>, RepositoryError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM {} WHERE email = $1", table(role));
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        row.map(|r| r.into_account(role)).transpose()
    }

    /// List accounts in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        role: Role,
        created_by: Option<&AccountId>,
    ) -> Result<Vec<Account>, RepositoryError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM {}
             WHERE $1::TEXT IS NULL OR created_by = $1
             ORDER BY created_at, id",
            table(role)
        );
        let rows = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(created_by)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(|r| r.into_account(role)).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown id and
    /// `RepositoryError::Conflict` if the new email is taken.
    pub async fn update(
        &self,
        role: Role,
        id: &AccountId,
        update: &AccountUpdate,
    ) -> Result<Account, RepositoryError> {
        let sql = format!(
            "UPDATE {} SET email = $2, name = $3 WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}",
            table(role)
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .bind(&update.email)
            .bind(&update.name)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| map_unique_violation(e, &format!("{role} email {} already exists", update.email)))?
            .ok_or(RepositoryError::NotFound)?;

        row.into_account(role)
    }

    /// Delete an account. Restaurants of a deleted owner are released by the
    /// `ON DELETE SET NULL` foreign key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, role: Role, id: &AccountId) -> Result<bool, RepositoryError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table(role));
        let result = sqlx::query(&sql).bind(id).execute(self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
