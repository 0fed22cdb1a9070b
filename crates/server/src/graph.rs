//! Relationship queries over the store.
//!
//! The graph has four edges: admin to owner (creator), admin to restaurant
//! (creator), owner to restaurant (assignment), and restaurant to dish
//! (containment). Every read goes straight to the store, so a write made by
//! one call is seen by the next.

use resman_core::{AccountId, DishId, RestaurantId, Role};

use crate::authz::RestaurantFacts;
use crate::db::{SharedStore, StoreResult};

#[derive(Clone)]
pub struct OwnershipGraph {
    store: SharedStore,
}

impl OwnershipGraph {
    #[must_use]
    pub const fn new(store: SharedStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub const fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Admin or super admin that created `owner`, `None` if no such owner.
    pub async fn creator_of_owner(&self, owner: &AccountId) -> StoreResult<Option<AccountId>> {
        Ok(self
            .store
            .account(Role::Owner, owner)
            .await?
            .and_then(|account| account.created_by))
    }

    pub async fn creator_of_restaurant(
        &self,
        restaurant: RestaurantId,
    ) -> StoreResult<Option<AccountId>> {
        Ok(self
            .store
            .restaurant(restaurant)
            .await?
            .map(|r| r.creator_id))
    }

    /// Assigned owner. The outer `None` means the restaurant does not exist,
    /// the inner one that it is available.
    pub async fn owner_of(
        &self,
        restaurant: RestaurantId,
    ) -> StoreResult<Option<Option<AccountId>>> {
        Ok(self.store.restaurant(restaurant).await?.map(|r| r.owner_id))
    }

    /// Creator and owner in a single read.
    pub async fn restaurant_facts(
        &self,
        restaurant: RestaurantId,
    ) -> StoreResult<Option<RestaurantFacts>> {
        Ok(self
            .store
            .restaurant(restaurant)
            .await?
            .map(|r| RestaurantFacts {
                creator_id: r.creator_id,
                owner_id: r.owner_id,
            }))
    }

    pub async fn restaurant_of_dish(&self, dish: DishId) -> StoreResult<Option<RestaurantId>> {
        Ok(self.store.dish(dish).await?.map(|d| d.restaurant_id))
    }

    /// Which manager table holds `id`.
    ///
    /// Super admins and admins live in separate tables but share the id
    /// space, so the creator's role is recovered by lookup.
    pub async fn creator_role(&self, id: &AccountId) -> StoreResult<Option<Role>> {
        for role in [Role::SuperAdmin, Role::Admin] {
            if self.store.account(role, id).await?.is_some() {
                return Ok(Some(role));
            }
        }
        Ok(None)
    }

    pub async fn admin_exists(&self, id: &AccountId) -> StoreResult<bool> {
        Ok(self.store.account(Role::Admin, id).await?.is_some())
    }

    pub async fn owner_exists(&self, id: &AccountId) -> StoreResult<bool> {
        Ok(self.store.account(Role::Owner, id).await?.is_some())
    }

    pub async fn restaurant_exists(&self, id: RestaurantId) -> StoreResult<bool> {
        Ok(self.store.restaurant(id).await?.is_some())
    }

    pub async fn dish_exists(&self, id: DishId) -> StoreResult<bool> {
        Ok(self.store.dish(id).await?.is_some())
    }

    /// Point `restaurant` at `owner`. Re-assigning the same owner is a no-op.
    /// Returns `false` if the restaurant does not exist.
    pub async fn assign_owner(&self, restaurant: RestaurantId, owner: &AccountId) -> StoreResult<bool> {
        self.store.set_restaurant_owner(restaurant, Some(owner)).await
    }

    /// Make `restaurant` available again. Idempotent.
    pub async fn unassign_owner(&self, restaurant: RestaurantId) -> StoreResult<bool> {
        self.store.set_restaurant_owner(restaurant, None).await
    }
}
