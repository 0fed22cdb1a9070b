//! Public near-by search.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use resman_core::Location;

use crate::error::AppError;
use crate::models::RestaurantView;
use crate::services::RestaurantService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/restaurantsNearBy", get(near_by))
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Restaurants within the configured radius of `?lat=&lng=`.
///
/// # Errors
///
/// 400 if either coordinate is missing or out of range.
pub async fn near_by(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<RestaurantView>>, AppError> {
    let (Some(lat), Some(lng)) = (query.lat, query.lng) else {
        return Err(AppError::BadRequest("lat and lng are required".to_string()));
    };
    let restaurants = RestaurantService::new(state.store(), state.graph())
        .near_by(Location::new(lat, lng), state.config().nearby_radius_km)
        .await?;
    Ok(Json(restaurants))
}
