//! Role-scoped authorization.
//!
//! Every mutating operation is decided here before any storage write. The
//! decision table lives in [`policy`] as one pure function per operation,
//! each taking the actor and the ownership facts it needs and returning a
//! [`Decision`]. [`authorize`] gathers those facts from the
//! [`OwnershipGraph`] and calls the matching policy function.
//!
//! Check order is fixed: role first, then existence of the target, then
//! creator/owner match. A missing target is therefore reported as
//! not-found even to an admin who could never have touched it, while a
//! target that exists but belongs to someone else is reported as
//! unauthorized.

pub mod policy;

use thiserror::Error;

use resman_core::{AccountId, DishId, RestaurantId, Role};

use crate::db::RepositoryError;
use crate::graph::OwnershipGraph;

pub use policy::{OwnerScope, RestaurantFacts};

/// The authenticated identity making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: AccountId,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub const fn new(id: AccountId, role: Role) -> Self {
        Self { id, role }
    }
}

/// Class of a denial, used to pick the client-visible status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyKind {
    NotFound,
    Unauthorized,
}

/// Why an operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    /// The actor's role never has this capability.
    #[error("unauthorized")]
    RoleNotPermitted,
    #[error("admin does not exist")]
    AdminNotFound,
    #[error("owner does not exist")]
    OwnerNotFound,
    #[error("can not update owner created by other admin")]
    InvalidOwnerCreator,
    #[error("restaurant does not exist")]
    RestaurantNotFound,
    #[error("can not update restaurant created by other admin")]
    InvalidRestaurantCreator,
    #[error("can not update restaurant owned by others")]
    InvalidRestaurantOwner,
    #[error("dish does not exist")]
    DishNotFound,
    #[error("can not update dish of other restaurant")]
    DishOfOtherRestaurant,
}

impl Denial {
    #[must_use]
    pub const fn kind(&self) -> DenyKind {
        match self {
            Self::AdminNotFound
            | Self::OwnerNotFound
            | Self::RestaurantNotFound
            | Self::DishNotFound => DenyKind::NotFound,
            Self::RoleNotPermitted
            | Self::InvalidOwnerCreator
            | Self::InvalidRestaurantCreator
            | Self::InvalidRestaurantOwner
            | Self::DishOfOtherRestaurant => DenyKind::Unauthorized,
        }
    }
}

/// Allow (carrying an optional grant such as a listing scope) or deny with a reason.
pub type Decision<T = ()> = Result<T, Denial>;

/// A single-target operation checked by [`authorize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ListAdmins,
    /// Update or delete an admin account.
    ManageAdmin(AccountId),
    CreateOwner,
    /// Update or delete an owner account.
    ManageOwner(AccountId),
    /// List or change the restaurants assigned to an owner.
    ManageOwnerRestaurants(AccountId),
    CreateRestaurant,
    /// Update or delete a restaurant.
    ManageRestaurant(RestaurantId),
    /// Assign or unassign the owner of one restaurant in a batch.
    AssignRestaurant(RestaurantId),
    /// Add a dish to a restaurant's menu.
    ManageMenu(RestaurantId),
    /// Update or delete one dish of a restaurant's menu.
    ManageDish {
        restaurant: RestaurantId,
        dish: DishId,
    },
    ViewMenu(RestaurantId),
}

/// Failure of [`authorize`]: either a denial or a storage error while
/// gathering facts.
#[derive(Debug, Error)]
pub enum AuthzError {
    #[error(transparent)]
    Denied(#[from] Denial),
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Decide whether `actor` may perform `op`, consulting `graph` for the
/// ownership facts the decision depends on.
///
/// Facts are only fetched when the role could be allowed at all, so an owner
/// asking to edit a restaurant is refused without a lookup.
///
/// # Errors
///
/// Returns `AuthzError::Denied` with the reason, or `AuthzError::Store` if the
/// graph could not be read.
pub async fn authorize(
    graph: &OwnershipGraph,
    actor: &Actor,
    op: &Operation,
) -> Result<(), AuthzError> {
    match op {
        Operation::ListAdmins => policy::list_admins(actor)?,
        Operation::ManageAdmin(id) => {
            policy::list_admins(actor)?;
            let exists = graph.admin_exists(id).await?;
            policy::manage_admin(actor, exists)?;
        }
        Operation::CreateOwner => {
            policy::create_owner(actor)?;
        }
        Operation::ManageOwner(id) => {
            policy::require_manager(actor)?;
            let creator = graph.creator_of_owner(id).await?;
            policy::manage_owner(actor, creator.as_ref())?;
        }
        Operation::ManageOwnerRestaurants(id) => {
            policy::require_manager(actor)?;
            let creator = graph.creator_of_owner(id).await?;
            policy::manage_owner_restaurants(actor, creator.as_ref())?;
        }
        Operation::CreateRestaurant => {
            policy::create_restaurant(actor)?;
        }
        Operation::ManageRestaurant(id) => {
            policy::require_manager(actor)?;
            let facts = graph.restaurant_facts(*id).await?;
            policy::manage_restaurant(actor, facts.as_ref())?;
        }
        Operation::AssignRestaurant(id) => {
            policy::require_manager(actor)?;
            let facts = graph.restaurant_facts(*id).await?;
            policy::assign_restaurant(actor, facts.as_ref())?;
        }
        Operation::ManageMenu(id) => {
            let facts = graph.restaurant_facts(*id).await?;
            policy::manage_menu(actor, facts.as_ref())?;
        }
        Operation::ManageDish { restaurant, dish } => {
            let facts = graph.restaurant_facts(*restaurant).await?;
            policy::manage_menu(actor, facts.as_ref())?;
            let dish_restaurant = graph.restaurant_of_dish(*dish).await?;
            policy::manage_dish(*restaurant, dish_restaurant)?;
        }
        Operation::ViewMenu(id) => {
            let exists = graph.restaurant_exists(*id).await?;
            policy::view_menu(actor, exists)?;
        }
    }
    Ok(())
}
