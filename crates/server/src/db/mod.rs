//! Storage capability for accounts, restaurants, dishes, and revoked tokens.
//!
//! # Backends
//!
//! - [`memory::InMemoryStore`] - process-local maps, used for tests and when no
//!   database URL is configured
//! - [`postgres::PgStore`] - `PostgreSQL` via `sqlx`
//!
//! Both are consumed through [`ResmanStore`] as an `Arc<dyn ResmanStore>`. The
//! store is the only shared mutable state in the server; every write is
//! visible to the next read.
//!
//! # Tables
//!
//! - `super_admins`, `admins`, `owners` - one account table per role, email
//!   unique per table
//! - `restaurants` - `creator_id` (immutable) and nullable `owner_id`
//! - `dishes` - one row per menu item, cascades with its restaurant
//! - `revoked_tokens` - session tokens logged out before expiry
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p resman-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use resman_core::{AccountId, DishId, Email, Location, RestaurantId, Role};

use crate::models::{
    Account, AccountUpdate, Dish, DishUpdate, NewAccount, NewDish, NewRestaurant, Restaurant,
    RestaurantFilter, RestaurantUpdate,
};

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, RepositoryError>;

/// Shared handle to the configured backend.
pub type SharedStore = Arc<dyn ResmanStore>;

/// Everything the services need from persistent storage.
///
/// Methods returning `bool` report whether a row was affected, so callers can
/// tell "already gone" apart from a storage failure.
#[async_trait]
pub trait ResmanStore: Send + Sync {
    /// Short backend name for logs and readiness output.
    fn backend_name(&self) -> &'static str;

    /// Round-trip to the backend.
    async fn health_check(&self) -> StoreResult<()>;

    // ---- accounts -----------------------------------------------------------

    /// Insert an account. Fails with `Conflict` if the email is taken in the
    /// role's table.
    async fn insert_account(&self, account: NewAccount) -> StoreResult<Account>;
    async fn account(&self, role: Role, id: &AccountId) -> StoreResult<Option<Account>>;
    async fn account_by_email(&self, role: Role, email: &Email) -> StoreResult<Option<Account>>;
    /// Accounts of `role` in creation order, optionally only those created by
    /// `created_by`.
    async fn list_accounts(
        &self,
        role: Role,
        created_by: Option<&AccountId>,
    ) -> StoreResult<Vec<Account>>;
    /// Fails with `NotFound` for an unknown id and `Conflict` for a taken email.
    async fn update_account(
        &self,
        role: Role,
        id: &AccountId,
        update: &AccountUpdate,
    ) -> StoreResult<Account>;
    /// Deleting an owner also clears it from every restaurant it was assigned.
    async fn delete_account(&self, role: Role, id: &AccountId) -> StoreResult<bool>;

    // ---- restaurants --------------------------------------------------------

    async fn insert_restaurant(&self, restaurant: NewRestaurant) -> StoreResult<Restaurant>;
    async fn restaurant(&self, id: RestaurantId) -> StoreResult<Option<Restaurant>>;
    /// Restaurants matching `filter`, ordered by id.
    async fn list_restaurants(&self, filter: &RestaurantFilter) -> StoreResult<Vec<Restaurant>>;
    /// Restaurants whose great-circle distance from `center` is below
    /// `radius_km`, ordered by id.
    async fn list_restaurants_within(
        &self,
        center: Location,
        radius_km: f64,
    ) -> StoreResult<Vec<Restaurant>> {
        let all = self.list_restaurants(&RestaurantFilter::All).await?;
        Ok(all
            .into_iter()
            .filter(|r| r.location.distance_km(&center) < radius_km)
            .collect())
    }
    async fn update_restaurant(
        &self,
        id: RestaurantId,
        update: &RestaurantUpdate,
    ) -> StoreResult<Restaurant>;
    /// Set or clear the assigned owner. Idempotent.
    async fn set_restaurant_owner(
        &self,
        id: RestaurantId,
        owner: Option<&AccountId>,
    ) -> StoreResult<bool>;
    /// Deleting a restaurant deletes its dishes.
    async fn delete_restaurant(&self, id: RestaurantId) -> StoreResult<bool>;

    // ---- dishes -------------------------------------------------------------

    async fn insert_dish(&self, dish: NewDish) -> StoreResult<Dish>;
    async fn dish(&self, id: DishId) -> StoreResult<Option<Dish>>;
    /// Menu of a restaurant ordered by dish id.
    async fn list_dishes(&self, restaurant: RestaurantId) -> StoreResult<Vec<Dish>>;
    async fn update_dish(&self, id: DishId, update: &DishUpdate) -> StoreResult<Dish>;
    async fn delete_dish(&self, id: DishId) -> StoreResult<bool>;

    // ---- revoked tokens -----------------------------------------------------

    /// Record `token` as revoked until `expires_at`. Idempotent.
    async fn revoke_token(&self, token: &str, expires_at: DateTime<Utc>) -> StoreResult<()>;
    async fn is_token_revoked(&self, token: &str) -> StoreResult<bool>;
    /// Drop revocations whose token would have expired by `now`. Returns the
    /// number of entries removed.
    async fn purge_revoked_tokens(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Build the backend selected by configuration.
///
/// # Errors
///
/// Returns `sqlx::Error` if a database URL is configured but unreachable.
pub async fn connect(database_url: Option<&SecretString>) -> Result<SharedStore, sqlx::Error> {
    match database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        None => {
            tracing::warn!("No database URL configured, using in-memory store");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}
