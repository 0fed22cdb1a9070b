//! Restaurant management.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    routing::{get, put},
};
use serde::Deserialize;

use resman_core::RestaurantId;

use super::{IdList, Message, parse_id};
use crate::error::AppError;
use crate::middleware::auth::RequireActor;
use crate::models::RestaurantView;
use crate::services::RestaurantService;
use crate::services::restaurants::RestaurantInput;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/restaurants",
            get(list_restaurants)
                .post(create_restaurant)
                .delete(delete_restaurants),
        )
        .route("/restaurants/{res_id}", put(update_restaurant))
        .route("/available/restaurants", get(available_restaurants))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RestaurantBody {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl RestaurantBody {
    fn input(&self) -> RestaurantInput<'_> {
        RestaurantInput {
            name: self.name.as_str(),
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// # Errors
///
/// Storage failures only.
pub async fn list_restaurants(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
) -> Result<Json<Vec<RestaurantView>>, AppError> {
    let restaurants = RestaurantService::new(state.store(), state.graph())
        .list(&actor)
        .await?;
    Ok(Json(restaurants))
}

/// # Errors
///
/// 401 for owners.
pub async fn available_restaurants(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
) -> Result<Json<Vec<RestaurantView>>, AppError> {
    let restaurants = RestaurantService::new(state.store(), state.graph())
        .available(&actor)
        .await?;
    Ok(Json(restaurants))
}

/// # Errors
///
/// 400 for bad input, 401 for owners.
pub async fn create_restaurant(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
    body: Result<Json<RestaurantBody>, JsonRejection>,
) -> Result<Json<RestaurantView>, AppError> {
    let Json(body) = body?;
    let restaurant = RestaurantService::new(state.store(), state.graph())
        .create(&actor, body.input())
        .await?;
    Ok(Json(restaurant))
}

/// # Errors
///
/// 400 for bad input or an unknown restaurant, 401 unless the actor created
/// it or is a super admin.
pub async fn update_restaurant(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
    Path(res_id): Path<String>,
    body: Result<Json<RestaurantBody>, JsonRejection>,
) -> Result<Json<RestaurantView>, AppError> {
    let id: RestaurantId = parse_id(&res_id, "restaurant")?;
    let Json(body) = body?;
    let restaurant = RestaurantService::new(state.store(), state.graph())
        .update(&actor, id, body.input())
        .await?;
    Ok(Json(restaurant))
}

/// # Errors
///
/// 400 for a malformed id list or with the refused positions.
pub async fn delete_restaurants(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
    Query(ids): Query<IdList>,
) -> Result<Json<Message>, AppError> {
    let ids: Vec<RestaurantId> = ids.parse("restaurant")?;
    RestaurantService::new(state.store(), state.graph())
        .delete(&actor, &ids)
        .await?;
    Ok(Message::new("Restaurants deleted Successfully"))
}
