//! Restaurant repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use resman_core::{AccountId, Location, RestaurantId};

use crate::db::RepositoryError;
use crate::models::{NewRestaurant, Restaurant, RestaurantFilter, RestaurantUpdate};

const RESTAURANT_COLUMNS: &str = "id, name, lat, lng, creator_id, owner_id, created_at";

/// Haversine distance in km from (`$1`, `$2`). The root is clamped to 1 so
/// rounding near the antipode cannot push `ASIN` out of its domain.
const DISTANCE_KM_SQL: &str = "2 * 6371.0088 * ASIN(LEAST(1.0, SQRT(
       POWER(SIN(RADIANS(lat - $1) / 2), 2)
     + COS(RADIANS($1)) * COS(RADIANS(lat)) * POWER(SIN(RADIANS(lng - $2) / 2), 2)
 )))";

#[derive(Debug, sqlx::FromRow)]
struct RestaurantRow {
    id: RestaurantId,
    name: String,
    lat: f64,
    lng: f64,
    creator_id: String,
    owner_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<RestaurantRow> for Restaurant {
    fn from(row: RestaurantRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            location: Location::new(row.lat, row.lng),
            creator_id: AccountId::from(row.creator_id),
            owner_id: row.owner_id.map(AccountId::from),
            created_at: row.created_at,
        }
    }
}

/// Repository for restaurant database operations.
pub struct RestaurantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RestaurantRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, restaurant: NewRestaurant) -> Result<Restaurant, RepositoryError> {
        let sql = format!(
            "INSERT INTO restaurants (name, lat, lng, creator_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {RESTAURANT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RestaurantRow>(&sql)
            .bind(&restaurant.name)
            .bind(restaurant.location.lat)
            .bind(restaurant.location.lng)
            .bind(&restaurant.creator_id)
            .fetch_one(self.pool)
            .await?;
        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: RestaurantId) -> Result<Option<Restaurant>, RepositoryError> {
        let sql = format!("SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = $1");
        let row = sqlx::query_as::<_, RestaurantRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &RestaurantFilter) -> Result<Vec<Restaurant>, RepositoryError> {
        let (predicate, account) = match filter {
            RestaurantFilter::All => ("TRUE", None),
            RestaurantFilter::CreatedBy(id) => ("creator_id = $1", Some(id)),
            RestaurantFilter::OwnedBy(id) => ("owner_id = $1", Some(id)),
            RestaurantFilter::Available => ("owner_id IS NULL", None),
            RestaurantFilter::AvailableCreatedBy(id) => {
                ("owner_id IS NULL AND creator_id = $1", Some(id))
            }
        };
        let sql =
            format!("SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE {predicate} ORDER BY id");

        let mut query = sqlx::query_as::<_, RestaurantRow>(&sql);
        if let Some(account) = account {
            query = query.bind(account);
        }
        let rows = query.fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Restaurants within `radius_km` of `center` (haversine on the mean
    /// earth radius).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_within(
        &self,
        center: Location,
        radius_km: f64,
    ) -> Result<Vec<Restaurant>, RepositoryError> {
        let sql = format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants
             WHERE {DISTANCE_KM_SQL} < $3
             ORDER BY id"
        );
        let rows = sqlx::query_as::<_, RestaurantRow>(&sql)
            .bind(center.lat)
            .bind(center.lng)
            .bind(radius_km)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown id.
    pub async fn update(
        &self,
        id: RestaurantId,
        update: &RestaurantUpdate,
    ) -> Result<Restaurant, RepositoryError> {
        let sql = format!(
            "UPDATE restaurants SET name = $2, lat = $3, lng = $4
             WHERE id = $1
             RETURNING {RESTAURANT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RestaurantRow>(&sql)
            .bind(id)
            .bind(&update.name)
            .bind(update.location.lat)
            .bind(update.location.lng)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_owner(
        &self,
        id: RestaurantId,
        owner: Option<&AccountId>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE restaurants SET owner_id = $2 WHERE id = $1")
            .bind(id)
            .bind(owner)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a restaurant; its dishes go with it (`ON DELETE CASCADE`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: RestaurantId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_root_is_clamped() {
        assert!(DISTANCE_KM_SQL.contains("ASIN(LEAST(1.0, SQRT("));
        assert_eq!(
            DISTANCE_KM_SQL.matches('(').count(),
            DISTANCE_KM_SQL.matches(')').count()
        );
    }
}
