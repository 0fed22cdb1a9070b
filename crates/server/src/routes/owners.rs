//! Owner management and restaurant assignment.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    routing::{get, put},
};
use serde::Deserialize;

use resman_core::{AccountId, RestaurantId};

use super::admins::AccountBody;
use super::{IdList, Message};
use crate::error::AppError;
use crate::middleware::auth::RequireActor;
use crate::models::{AccountView, RestaurantView};
use crate::services::OwnerService;
use crate::services::owners::NewOwnerInput;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/owners",
            get(list_owners).post(create_owner).delete(delete_owners),
        )
        .route("/owners/{owner_id}", put(update_owner))
        .route(
            "/owners/{owner_id}/restaurants",
            get(owner_restaurants).post(update_assignments),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewOwnerBody {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Restaurants to hand to an owner and restaurants to take back.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssignmentBody {
    pub assign: Vec<RestaurantId>,
    pub de_assign: Vec<RestaurantId>,
}

fn service(state: &AppState) -> OwnerService<'_> {
    OwnerService::new(state.store(), state.graph(), state.tokens())
}

/// # Errors
///
/// 401 for owners.
pub async fn list_owners(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountView>>, AppError> {
    Ok(Json(service(&state).list(&actor).await?))
}

/// # Errors
///
/// 400 for bad input or a taken email, 401 for owners.
pub async fn create_owner(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
    body: Result<Json<NewOwnerBody>, JsonRejection>,
) -> Result<Json<AccountView>, AppError> {
    let Json(body) = body?;
    let owner = service(&state)
        .create(
            &actor,
            NewOwnerInput {
                name: &body.name,
                email: &body.email,
                password: &body.password,
            },
        )
        .await?;
    Ok(Json(owner))
}

/// # Errors
///
/// 400 for bad input or an unknown owner, 401 for another admin's owner.
pub async fn update_owner(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
    body: Result<Json<AccountBody>, JsonRejection>,
) -> Result<Json<AccountView>, AppError> {
    let Json(body) = body?;
    let owner = service(&state)
        .update(&actor, &AccountId::new(owner_id), body.input())
        .await?;
    Ok(Json(owner))
}

/// # Errors
///
/// 400 with the refused positions when some ids could not be deleted.
pub async fn delete_owners(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
    Query(ids): Query<IdList>,
) -> Result<Json<Message>, AppError> {
    let ids: Vec<AccountId> = ids.entries()?.into_iter().map(AccountId::from).collect();
    service(&state).delete(&actor, &ids).await?;
    Ok(Message::new("owner deleted successfully"))
}

/// # Errors
///
/// 400 for an unknown owner, 401 for another admin's owner.
pub async fn owner_restaurants(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Result<Json<Vec<RestaurantView>>, AppError> {
    let restaurants = service(&state)
        .restaurants(&actor, &AccountId::new(owner_id))
        .await?;
    Ok(Json(restaurants))
}

/// # Errors
///
/// 400/401 if the owner is off limits; 400 with the refused positions when
/// some restaurants could not be moved.
pub async fn update_assignments(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
    body: Result<Json<AssignmentBody>, JsonRejection>,
) -> Result<Json<Message>, AppError> {
    let Json(body) = body?;
    service(&state)
        .update_assignments(
            &actor,
            &AccountId::new(owner_id),
            &body.assign,
            &body.de_assign,
        )
        .await?;
    Ok(Message::new("List Updated Successfully"))
}
