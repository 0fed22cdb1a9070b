//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness
//! GET  /health/ready                        - Store round-trip
//! GET  /metrics                             - Prometheus exposition
//!
//! # Sessions (public)
//! POST /register                            - Create admin/superAdmin, sign in
//! POST /login                               - Sign in
//! GET  /logout                              - Revoke the presented token
//! GET  /restaurantsNearBy?lat=&lng=         - Restaurants around a point
//!
//! # Admins (superAdmin)
//! GET    /manage/admins                     - List admins
//! PUT    /manage/admins/{adminId}           - Edit an admin
//! DELETE /manage/admins?id=a,b              - Delete admins
//!
//! # Owners (admin+)
//! GET    /manage/owners                     - Owners in scope
//! POST   /manage/owners                     - Create an owner
//! PUT    /manage/owners/{ownerId}           - Edit an owner
//! DELETE /manage/owners?id=a,b              - Delete owners
//! GET    /manage/owners/{ownerId}/restaurants - Restaurants held by an owner
//! POST   /manage/owners/{ownerId}/restaurants - Assign / unassign restaurants
//!
//! # Restaurants
//! GET    /manage/restaurants                - Restaurants in scope (any role)
//! POST   /manage/restaurants                - Add a restaurant (admin+)
//! DELETE /manage/restaurants?id=1,2         - Delete restaurants (admin+)
//! GET    /manage/available/restaurants      - Unassigned restaurants (admin+)
//! PUT    /manage/restaurants/{resId}        - Edit a restaurant (creator)
//!
//! # Menus (any role, ownership checked)
//! GET    /manage/restaurants/{resId}/menu   - List dishes
//! POST   /manage/restaurants/{resId}/menu   - Add a dish
//! DELETE /manage/restaurants/{resId}/menu?id=1,2 - Delete dishes
//! PUT    /manage/restaurants/{resId}/menu/{dishId} - Edit a dish
//! ```

pub mod admins;
pub mod auth;
pub mod menu;
pub mod nearby;
pub mod owners;
pub mod restaurants;

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;
use crate::telemetry::{self, METRICS_PATH};

/// Build the full API router.
pub fn routes() -> Router<AppState> {
    let manage = Router::new()
        .merge(admins::router())
        .merge(owners::router())
        .merge(restaurants::router())
        .merge(menu::router());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .route(METRICS_PATH, get(telemetry::render))
        .merge(auth::router())
        .merge(nearby::router())
        .nest("/manage", manage)
}

async fn health() -> &'static str {
    "ok"
}

async fn ready(State(state): State<AppState>) -> Response {
    match state.store().health_check().await {
        Ok(()) => Json(json!({ "status": "ready", "store": state.store().backend_name() }))
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}

/// `{"msg": "..."}` acknowledgement for writes that return no entity.
#[derive(Debug, Serialize)]
pub struct Message {
    pub msg: &'static str,
}

impl Message {
    #[must_use]
    pub const fn new(msg: &'static str) -> Json<Self> {
        Json(Self { msg })
    }
}

/// `?id=a,b,c` on batch deletes.
#[derive(Debug, Default, Deserialize)]
pub struct IdList {
    #[serde(default)]
    pub id: String,
}

impl IdList {
    /// Split the comma-separated list, dropping blank entries.
    ///
    /// # Errors
    ///
    /// `BadRequest("empty id parameter")` if nothing is left.
    pub fn entries(&self) -> Result<Vec<&str>, AppError> {
        let entries: Vec<&str> = self
            .id
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if entries.is_empty() {
            return Err(AppError::BadRequest("empty id parameter".to_string()));
        }
        Ok(entries)
    }

    /// Parse every entry as `T`, naming `what` on the first bad one.
    ///
    /// # Errors
    ///
    /// `BadRequest` for an empty list or an unparsable entry.
    pub fn parse<T: FromStr>(&self, what: &str) -> Result<Vec<T>, AppError> {
        self.entries()?
            .into_iter()
            .map(|s| parse_id(s, what))
            .collect()
    }
}

/// Parse one id from a path segment.
///
/// # Errors
///
/// `BadRequest("invalid <what> id")`.
pub fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid {what} id")))
}
