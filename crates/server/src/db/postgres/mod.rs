//! `PostgreSQL` implementation of [`ResmanStore`].
//!
//! Queries are checked at runtime (`sqlx::query_as` with `FromRow` rows), so
//! the crate builds without a live database. Each table has its own
//! repository; [`PgStore`] stitches them together behind the trait.

pub mod accounts;
pub mod dishes;
pub mod restaurants;
pub mod revoked_tokens;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::migrate::Migrator;

use resman_core::{AccountId, DishId, Email, Location, RestaurantId, Role};

pub use accounts::AccountRepository;
pub use dishes::DishRepository;
pub use restaurants::RestaurantRepository;
pub use revoked_tokens::RevokedTokenRepository;

use super::{RepositoryError, ResmanStore, StoreResult};
use crate::models::{
    Account, AccountUpdate, Dish, DishUpdate, NewAccount, NewDish, NewRestaurant, Restaurant,
    RestaurantFilter, RestaurantUpdate,
};

/// Embedded schema migrations from `crates/server/migrations/`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
pub(crate) fn map_unique_violation(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

/// Store backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    const fn accounts(&self) -> AccountRepository<'_> {
        AccountRepository::new(&self.pool)
    }

    const fn restaurants(&self) -> RestaurantRepository<'_> {
        RestaurantRepository::new(&self.pool)
    }

    const fn dishes(&self) -> DishRepository<'_> {
        DishRepository::new(&self.pool)
    }

    const fn revoked_tokens(&self) -> RevokedTokenRepository<'_> {
        RevokedTokenRepository::new(&self.pool)
    }
}

#[async_trait]
impl ResmanStore for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_account(&self, account: NewAccount) -> StoreResult<Account> {
        self.accounts().create(account).await
    }

    async fn account(&self, role: Role, id: &AccountId) -> StoreResult<Option<Account>> {
        self.accounts().get_by_id(role, id).await
    }

    async fn account_by_email(&self, role: Role, email: &Email) -> StoreResult<Option<Account>> {
        self.accounts().get_by_email(role, email).await
    }

    async fn list_accounts(
        &self,
        role: Role,
        created_by: Option<&AccountId>,
    ) -> StoreResult<Vec<Account>> {
        self.accounts().list(role, created_by).await
    }

    async fn update_account(
        &self,
        role: Role,
        id: &AccountId,
        update: &AccountUpdate,
    ) -> StoreResult<Account> {
        self.accounts().update(role, id, update).await
    }

    async fn delete_account(&self, role: Role, id: &AccountId) -> StoreResult<bool> {
        self.accounts().delete(role, id).await
    }

    async fn insert_restaurant(&self, restaurant: NewRestaurant) -> StoreResult<Restaurant> {
        self.restaurants().create(restaurant).await
    }

    async fn restaurant(&self, id: RestaurantId) -> StoreResult<Option<Restaurant>> {
        self.restaurants().get_by_id(id).await
    }

    async fn list_restaurants(&self, filter: &RestaurantFilter) -> StoreResult<Vec<Restaurant>> {
        self.restaurants().list(filter).await
    }

    async fn list_restaurants_within(
        &self,
        center: Location,
        radius_km: f64,
    ) -> StoreResult<Vec<Restaurant>> {
        self.restaurants().list_within(center, radius_km).await
    }

    async fn update_restaurant(
        &self,
        id: RestaurantId,
        update: &RestaurantUpdate,
    ) -> StoreResult<Restaurant> {
        self.restaurants().update(id, update).await
    }

    async fn set_restaurant_owner(
        &self,
        id: RestaurantId,
        owner: Option<&AccountId>,
    ) -> StoreResult<bool> {
        self.restaurants().set_owner(id, owner).await
    }

    async fn delete_restaurant(&self, id: RestaurantId) -> StoreResult<bool> {
        self.restaurants().delete(id).await
    }

    async fn insert_dish(&self, dish: NewDish) -> StoreResult<Dish> {
        self.dishes().create(dish).await
    }

    async fn dish(&self, id: DishId) -> StoreResult<Option<Dish>> {
        self.dishes().get_by_id(id).await
    }

    async fn list_dishes(&self, restaurant: RestaurantId) -> StoreResult<Vec<Dish>> {
        self.dishes().list_for_restaurant(restaurant).await
    }

    async fn update_dish(&self, id: DishId, update: &DishUpdate) -> StoreResult<Dish> {
        self.dishes().update(id, update).await
    }

    async fn delete_dish(&self, id: DishId) -> StoreResult<bool> {
        self.dishes().delete(id).await
    }

    async fn revoke_token(&self, token: &str, expires_at: DateTime<Utc>) -> StoreResult<()> {
        self.revoked_tokens().insert(token, expires_at).await
    }

    async fn is_token_revoked(&self, token: &str) -> StoreResult<bool> {
        self.revoked_tokens().exists(token).await
    }

    async fn purge_revoked_tokens(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        self.revoked_tokens().delete_expired(now).await
    }
}
