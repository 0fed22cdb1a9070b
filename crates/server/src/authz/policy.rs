//! The decision table, one function per operation.
//!
//! Functions here never touch storage. Callers pass in whatever facts the
//! decision needs (`None` when the target does not exist) and get back an
//! allow, optionally carrying a grant such as a listing scope, or a
//! [`Denial`].

use resman_core::{AccountId, RestaurantId, Role};

use super::{Actor, Decision, Denial};
use crate::models::RestaurantFilter;

/// Which owners a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerScope {
    All,
    CreatedBy(AccountId),
}

impl OwnerScope {
    /// Creator filter to hand to the store.
    #[must_use]
    pub const fn created_by(&self) -> Option<&AccountId> {
        match self {
            Self::All => None,
            Self::CreatedBy(id) => Some(id),
        }
    }
}

/// Creator and owner of an existing restaurant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantFacts {
    pub creator_id: AccountId,
    pub owner_id: Option<AccountId>,
}

/// Admin or super admin, whatever the target.
pub const fn require_manager(actor: &Actor) -> Decision {
    if actor.role.is_manager() {
        Ok(())
    } else {
        Err(Denial::RoleNotPermitted)
    }
}

pub const fn list_admins(actor: &Actor) -> Decision {
    match actor.role {
        Role::SuperAdmin => Ok(()),
        Role::Admin | Role::Owner => Err(Denial::RoleNotPermitted),
    }
}

/// Update or delete an admin account.
pub const fn manage_admin(actor: &Actor, admin_exists: bool) -> Decision {
    if let Err(denial) = list_admins(actor) {
        return Err(denial);
    }
    if admin_exists {
        Ok(())
    } else {
        Err(Denial::AdminNotFound)
    }
}

/// Grants the creator id the new owner is stamped with.
pub fn create_owner(actor: &Actor) -> Decision<AccountId> {
    require_manager(actor)?;
    Ok(actor.id.clone())
}

pub fn list_owners(actor: &Actor) -> Decision<OwnerScope> {
    match actor.role {
        Role::SuperAdmin => Ok(OwnerScope::All),
        Role::Admin => Ok(OwnerScope::CreatedBy(actor.id.clone())),
        Role::Owner => Err(Denial::RoleNotPermitted),
    }
}

/// Update or delete an owner. `owner_creator` is `None` when the owner does
/// not exist.
pub fn manage_owner(actor: &Actor, owner_creator: Option<&AccountId>) -> Decision {
    require_manager(actor)?;
    let creator = owner_creator.ok_or(Denial::OwnerNotFound)?;
    match actor.role {
        Role::SuperAdmin => Ok(()),
        Role::Admin if creator == &actor.id => Ok(()),
        Role::Admin | Role::Owner => Err(Denial::InvalidOwnerCreator),
    }
}

/// List or change the restaurants assigned to an owner. Same rule as
/// [`manage_owner`]: an admin only reaches owners it created.
pub fn manage_owner_restaurants(actor: &Actor, owner_creator: Option<&AccountId>) -> Decision {
    manage_owner(actor, owner_creator)
}

/// Grants the creator id the new restaurant is stamped with.
pub fn create_restaurant(actor: &Actor) -> Decision<AccountId> {
    require_manager(actor)?;
    Ok(actor.id.clone())
}

/// Every role may list restaurants, each through its own scope.
#[must_use]
pub fn list_restaurants(actor: &Actor) -> RestaurantFilter {
    match actor.role {
        Role::SuperAdmin => RestaurantFilter::All,
        Role::Admin => RestaurantFilter::CreatedBy(actor.id.clone()),
        Role::Owner => RestaurantFilter::OwnedBy(actor.id.clone()),
    }
}

/// Restaurants with no owner.
pub fn list_available_restaurants(actor: &Actor) -> Decision<RestaurantFilter> {
    match actor.role {
        Role::SuperAdmin => Ok(RestaurantFilter::Available),
        Role::Admin => Ok(RestaurantFilter::AvailableCreatedBy(actor.id.clone())),
        Role::Owner => Err(Denial::RoleNotPermitted),
    }
}

/// Update or delete a restaurant. Owners are refused even for restaurants
/// assigned to them.
pub fn manage_restaurant(actor: &Actor, facts: Option<&RestaurantFacts>) -> Decision {
    require_manager(actor)?;
    let facts = facts.ok_or(Denial::RestaurantNotFound)?;
    match actor.role {
        Role::SuperAdmin => Ok(()),
        Role::Admin if facts.creator_id == actor.id => Ok(()),
        Role::Admin | Role::Owner => Err(Denial::InvalidRestaurantCreator),
    }
}

/// Assign or unassign one restaurant inside a batch. The owner side has
/// already been cleared by [`manage_owner_restaurants`].
pub fn assign_restaurant(actor: &Actor, facts: Option<&RestaurantFacts>) -> Decision {
    manage_restaurant(actor, facts)
}

/// Create, update or delete a dish on a restaurant's menu.
pub fn manage_menu(actor: &Actor, facts: Option<&RestaurantFacts>) -> Decision {
    let facts = facts.ok_or(Denial::RestaurantNotFound)?;
    match actor.role {
        Role::SuperAdmin => Ok(()),
        Role::Admin if facts.creator_id == actor.id => Ok(()),
        Role::Admin => Err(Denial::InvalidRestaurantCreator),
        Role::Owner if facts.owner_id.as_ref() == Some(&actor.id) => Ok(()),
        Role::Owner => Err(Denial::InvalidRestaurantOwner),
    }
}

/// The dish addressed under `restaurant` must exist and sit on that menu.
/// Run after [`manage_menu`] has cleared the restaurant.
pub fn manage_dish(restaurant: RestaurantId, dish_restaurant: Option<RestaurantId>) -> Decision {
    match dish_restaurant {
        None => Err(Denial::DishNotFound),
        Some(owner) if owner == restaurant => Ok(()),
        Some(_) => Err(Denial::DishOfOtherRestaurant),
    }
}

/// Any authenticated role may read any menu.
pub const fn view_menu(_actor: &Actor, restaurant_exists: bool) -> Decision {
    if restaurant_exists {
        Ok(())
    } else {
        Err(Denial::RestaurantNotFound)
    }
}
