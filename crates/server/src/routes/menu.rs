//! Restaurant menus.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    routing::{get, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use resman_core::{DishId, RestaurantId};

use super::{IdList, Message, parse_id};
use crate::error::AppError;
use crate::middleware::auth::RequireActor;
use crate::models::DishView;
use crate::services::MenuService;
use crate::services::menu::DishInput;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/restaurants/{res_id}/menu",
            get(list_menu).post(add_dish).delete(delete_dishes),
        )
        .route("/restaurants/{res_id}/menu/{dish_id}", put(update_dish))
}

/// Price accepts a JSON number or a decimal string.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DishBody {
    pub name: String,
    pub price: Decimal,
}

impl DishBody {
    fn input(&self) -> DishInput<'_> {
        DishInput {
            name: self.name.as_str(),
            price: self.price,
        }
    }
}

fn restaurant_id(raw: &str) -> Result<RestaurantId, AppError> {
    parse_id(raw, "restaurant")
}

/// # Errors
///
/// 400 for an unknown restaurant.
pub async fn list_menu(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
    Path(res_id): Path<String>,
) -> Result<Json<Vec<DishView>>, AppError> {
    let restaurant = restaurant_id(&res_id)?;
    let dishes = MenuService::new(state.store(), state.graph())
        .list(&actor, restaurant)
        .await?;
    Ok(Json(dishes))
}

/// # Errors
///
/// 400 for bad input or an unknown restaurant, 401 for a foreign menu.
pub async fn add_dish(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
    Path(res_id): Path<String>,
    body: Result<Json<DishBody>, JsonRejection>,
) -> Result<Json<DishView>, AppError> {
    let restaurant = restaurant_id(&res_id)?;
    let Json(body) = body?;
    let dish = MenuService::new(state.store(), state.graph())
        .add(&actor, restaurant, body.input())
        .await?;
    Ok(Json(dish))
}

/// # Errors
///
/// 400 for bad input or unknown ids, 401 for a foreign menu or a dish of
/// another restaurant.
pub async fn update_dish(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
    Path((res_id, dish_id)): Path<(String, String)>,
    body: Result<Json<DishBody>, JsonRejection>,
) -> Result<Json<DishView>, AppError> {
    let restaurant = restaurant_id(&res_id)?;
    let dish: DishId = parse_id(&dish_id, "dish")?;
    let Json(body) = body?;
    let updated = MenuService::new(state.store(), state.graph())
        .update(&actor, restaurant, dish, body.input())
        .await?;
    Ok(Json(updated))
}

/// # Errors
///
/// 400 for a malformed id list or with the refused positions.
pub async fn delete_dishes(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
    Path(res_id): Path<String>,
    Query(ids): Query<IdList>,
) -> Result<Json<Message>, AppError> {
    let restaurant = restaurant_id(&res_id)?;
    let ids: Vec<DishId> = ids.parse("dish")?;
    MenuService::new(state.store(), state.graph())
        .delete(&actor, restaurant, &ids)
        .await?;
    Ok(Message::new("Dishes deleted successfully"))
}
