//! Admin management, super admins only.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    routing::{get, put},
};
use serde::Deserialize;

use resman_core::AccountId;

use super::{IdList, Message};
use crate::error::AppError;
use crate::middleware::auth::RequireActor;
use crate::models::AccountView;
use crate::services::AdminService;
use crate::services::admins::AccountInput;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admins", get(list_admins).delete(delete_admins))
        .route("/admins/{admin_id}", put(update_admin))
}

/// Name and email of an account, as sent on edits.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AccountBody {
    pub name: String,
    pub email: String,
}

impl AccountBody {
    pub(crate) fn input(&self) -> AccountInput<'_> {
        AccountInput {
            name: &self.name,
            email: &self.email,
        }
    }
}

/// # Errors
///
/// 401 for anyone but a super admin.
pub async fn list_admins(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountView>>, AppError> {
    let admins = AdminService::new(state.store(), state.graph())
        .list(&actor)
        .await?;
    Ok(Json(admins))
}

/// # Errors
///
/// 400 for bad input or an unknown admin, 401 for non super admins.
pub async fn update_admin(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
    Path(admin_id): Path<String>,
    body: Result<Json<AccountBody>, JsonRejection>,
) -> Result<Json<AccountView>, AppError> {
    let Json(body) = body?;
    let admin = AdminService::new(state.store(), state.graph())
        .update(&actor, &AccountId::new(admin_id), body.input())
        .await?;
    Ok(Json(admin))
}

/// # Errors
///
/// 400 with the refused positions when some ids could not be deleted.
pub async fn delete_admins(
    RequireActor { actor, .. }: RequireActor,
    State(state): State<AppState>,
    Query(ids): Query<IdList>,
) -> Result<Json<Message>, AppError> {
    let ids: Vec<AccountId> = ids.entries()?.into_iter().map(AccountId::from).collect();
    AdminService::new(state.store(), state.graph())
        .delete(&actor, &ids)
        .await?;
    Ok(Message::new("Admins deleted successfully"))
}
