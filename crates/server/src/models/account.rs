//! Super admin, admin, and owner accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use resman_core::{AccountId, Email, Role};

/// A stored account (domain type).
#[derive(Debug, Clone)]
pub struct Account {
    /// Unique account id.
    pub id: AccountId,
    /// Which account table the row lives in.
    pub role: Role,
    /// Login email, unique within `role`.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Creating admin or super admin. Set for owners only, never changes.
    pub created_by: Option<AccountId>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub role: Role,
    pub email: Email,
    pub name: String,
    pub password_hash: String,
    pub created_by: Option<AccountId>,
}

/// Mutable account fields.
#[derive(Debug, Clone)]
pub struct AccountUpdate {
    pub email: Email,
    pub name: String,
}

/// Public representation of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    pub id: AccountId,
    pub email: Email,
    pub name: String,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
        }
    }
}
