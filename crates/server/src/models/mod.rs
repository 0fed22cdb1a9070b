//! Domain types for the restaurant-management backend.
//!
//! These types represent validated domain objects. Storage backends convert
//! their rows into these types, and HTTP handlers render them through the
//! `*View` types, which never carry credentials.

pub mod account;
pub mod dish;
pub mod restaurant;

pub use account::{Account, AccountUpdate, AccountView, NewAccount};
pub use dish::{Dish, DishUpdate, DishView, NewDish};
pub use restaurant::{NewRestaurant, Restaurant, RestaurantFilter, RestaurantUpdate, RestaurantView};
