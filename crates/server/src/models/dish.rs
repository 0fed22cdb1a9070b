//! Menu dishes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use resman_core::{DishId, Price, RestaurantId};

/// A stored dish (domain type). Belongs to exactly one restaurant.
#[derive(Debug, Clone)]
pub struct Dish {
    pub id: DishId,
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub price: Price,
    pub created_at: DateTime<Utc>,
}

/// Input for adding a dish to a menu.
#[derive(Debug, Clone)]
pub struct NewDish {
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub price: Price,
}

#[derive(Debug, Clone)]
pub struct DishUpdate {
    pub name: String,
    pub price: Price,
}

/// Public representation of a dish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DishView {
    pub id: DishId,
    pub name: String,
    pub price: Price,
}

impl From<Dish> for DishView {
    fn from(dish: Dish) -> Self {
        Self {
            id: dish.id,
            name: dish.name,
            price: dish.price,
        }
    }
}
