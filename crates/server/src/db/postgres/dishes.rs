//! Dish repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use resman_core::{DishId, Price, RestaurantId};

use crate::db::RepositoryError;
use crate::models::{Dish, DishUpdate, NewDish};

const DISH_COLUMNS: &str = "id, restaurant_id, name, price, created_at";

#[derive(Debug, sqlx::FromRow)]
struct DishRow {
    id: DishId,
    restaurant_id: RestaurantId,
    name: String,
    price: Price,
    created_at: DateTime<Utc>,
}

impl From<DishRow> for Dish {
    fn from(row: DishRow) -> Self {
        Self {
            id: row.id,
            restaurant_id: row.restaurant_id,
            name: row.name,
            price: row.price,
            created_at: row.created_at,
        }
    }
}

/// Repository for dish database operations.
pub struct DishRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DishRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the restaurant does not exist.
    pub async fn create(&self, dish: NewDish) -> Result<Dish, RepositoryError> {
        let sql = format!(
            "INSERT INTO dishes (restaurant_id, name, price)
             VALUES ($1, $2, $3)
             RETURNING {DISH_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DishRow>(&sql)
            .bind(dish.restaurant_id)
            .bind(&dish.name)
            .bind(dish.price)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::NotFound;
                }
                RepositoryError::Database(e)
            })?;
        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: DishId) -> Result<Option<Dish>, RepositoryError> {
        let sql = format!("SELECT {DISH_COLUMNS} FROM dishes WHERE id = $1");
        let row = sqlx::query_as::<_, DishRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_restaurant(
        &self,
        restaurant: RestaurantId,
    ) -> Result<Vec<Dish>, RepositoryError> {
        let sql = format!("SELECT {DISH_COLUMNS} FROM dishes WHERE restaurant_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, DishRow>(&sql)
            .bind(restaurant)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown id.
    pub async fn update(&self, id: DishId, update: &DishUpdate) -> Result<Dish, RepositoryError> {
        let sql = format!(
            "UPDATE dishes SET name = $2, price = $3 WHERE id = $1 RETURNING {DISH_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DishRow>(&sql)
            .bind(id)
            .bind(&update.name)
            .bind(update.price)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: DishId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM dishes WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
