//! Dishes on a restaurant's menu.
//!
//! Write access follows the restaurant: super admins everywhere, admins on
//! restaurants they created, owners on restaurants assigned to them. Any
//! signed-in role may read any menu.

use rust_decimal::Decimal;

use resman_core::{DishId, Price, RestaurantId};

use crate::authz::{self, Actor, Denial, Operation};
use crate::db::{RepositoryError, SharedStore};
use crate::graph::OwnershipGraph;
use crate::models::{DishUpdate, DishView, NewDish};
use crate::services::batch::{BatchOutcome, refused};
use crate::services::{ServiceError, require};

/// Dish fields as received from the client.
#[derive(Debug, Clone, Copy)]
pub struct DishInput<'a> {
    pub name: &'a str,
    pub price: Decimal,
}

impl DishInput<'_> {
    fn validate(&self) -> Result<(String, Price), ServiceError> {
        require(self.name, "name")?;
        let price = Price::parse_positive(self.price)
            .map_err(|e| ServiceError::ValidationFailed(e.to_string()))?;
        Ok((self.name.trim().to_string(), price))
    }
}

pub struct MenuService<'a> {
    store: &'a SharedStore,
    graph: &'a OwnershipGraph,
}

impl<'a> MenuService<'a> {
    #[must_use]
    pub const fn new(store: &'a SharedStore, graph: &'a OwnershipGraph) -> Self {
        Self { store, graph }
    }

    /// Menu of `restaurant` ordered by dish id.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown restaurant.
    pub async fn list(
        &self,
        actor: &Actor,
        restaurant: RestaurantId,
    ) -> Result<Vec<DishView>, ServiceError> {
        authz::authorize(self.graph, actor, &Operation::ViewMenu(restaurant)).await?;
        let dishes = self.store.list_dishes(restaurant).await?;
        Ok(dishes.into_iter().map(DishView::from).collect())
    }

    /// Add one dish.
    ///
    /// # Errors
    ///
    /// `ValidationFailed`, `NotFound` for an unknown restaurant,
    /// `Unauthorized` when the actor neither created nor owns it.
    pub async fn add(
        &self,
        actor: &Actor,
        restaurant: RestaurantId,
        input: DishInput<'_>,
    ) -> Result<DishView, ServiceError> {
        let (name, price) = input.validate()?;
        authz::authorize(self.graph, actor, &Operation::ManageMenu(restaurant)).await?;
        let dish = self
            .store
            .insert_dish(NewDish {
                restaurant_id: restaurant,
                name,
                price,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => Denial::RestaurantNotFound.into(),
                other => ServiceError::from(other),
            })?;
        tracing::info!(dish_id = %dish.id, restaurant_id = %restaurant, "Dish added");
        Ok(dish.into())
    }

    /// Change a dish's name and price. The dish must sit on `restaurant`'s menu.
    ///
    /// # Errors
    ///
    /// `ValidationFailed`, `NotFound` for an unknown restaurant or dish,
    /// `Unauthorized` for a dish of another restaurant or a foreign menu.
    pub async fn update(
        &self,
        actor: &Actor,
        restaurant: RestaurantId,
        dish: DishId,
        input: DishInput<'_>,
    ) -> Result<DishView, ServiceError> {
        let (name, price) = input.validate()?;
        let op = Operation::ManageDish { restaurant, dish };
        authz::authorize(self.graph, actor, &op).await?;
        let updated = self
            .store
            .update_dish(dish, &DishUpdate { name, price })
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => Denial::DishNotFound.into(),
                other => ServiceError::from(other),
            })?;
        tracing::info!(dish_id = %dish, restaurant_id = %restaurant, "Dish updated");
        Ok(updated.into())
    }

    /// Delete dishes of `restaurant` by id.
    ///
    /// # Errors
    ///
    /// `NotFound`/`Unauthorized` if the menu itself is off limits;
    /// `PartialFailure` for ids that are unknown or belong elsewhere.
    pub async fn delete(
        &self,
        actor: &Actor,
        restaurant: RestaurantId,
        ids: &[DishId],
    ) -> Result<(), ServiceError> {
        authz::authorize(self.graph, actor, &Operation::ManageMenu(restaurant)).await?;
        let mut outcome = BatchOutcome::new("Dishes");
        for (position, &dish) in (1..).zip(ids) {
            let op = Operation::ManageDish { restaurant, dish };
            if refused(authz::authorize(self.graph, actor, &op).await)?
                || !self.store.delete_dish(dish).await?
            {
                outcome.record_failure(position);
            }
        }
        outcome.into_result()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use resman_core::Location;

    use super::*;
    use crate::models::NewRestaurant;
    use crate::services::ErrorKind;
    use crate::services::test_support::Fixture;

    fn dosa() -> DishInput<'static> {
        DishInput {
            name: "Masala Dosa",
            price: Decimal::new(8000, 2),
        }
    }

    async fn restaurant(fx: &Fixture, creator: &Actor) -> RestaurantId {
        fx.store
            .insert_restaurant(NewRestaurant {
                name: "CTR".to_string(),
                location: Location::new(13.0, 77.57),
                creator_id: creator.id.clone(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_owner_scoping_on_menu() {
        let fx = Fixture::new();
        let menu = MenuService::new(&fx.store, &fx.graph);
        let a = fx.admin("a@x.com").await;
        let p = fx.owner("p@x.com", &a).await;
        let q = fx.owner("q@x.com", &a).await;
        let rid = restaurant(&fx, &a).await;
        fx.graph.assign_owner(rid, &p.id).await.unwrap();

        let added = menu.add(&p, rid, dosa()).await.unwrap();
        assert_eq!(added.price.to_string(), "80.00");

        let err = menu.add(&q, rid, dosa()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.to_string(), "can not update restaurant owned by others");

        // any role can read
        assert_eq!(menu.list(&q, rid).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dish_validation() {
        let fx = Fixture::new();
        let menu = MenuService::new(&fx.store, &fx.graph);
        let a = fx.admin("a@x.com").await;
        let rid = restaurant(&fx, &a).await;

        let free = DishInput {
            price: Decimal::ZERO,
            ..dosa()
        };
        assert_eq!(
            menu.add(&a, rid, free).await.unwrap_err().kind(),
            ErrorKind::ValidationFailed
        );
        assert_eq!(
            menu.add(&a, RestaurantId::new(9), dosa()).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );

        for (amount, message) in [
            (Decimal::new(1, 3), "price can have at most 2 decimal places"),
            (Decimal::new(12345, 3), "price can have at most 2 decimal places"),
            (Decimal::new(1_000_000_000_000_000, 0), "price is too large"),
        ] {
            let input = DishInput {
                price: amount,
                ..dosa()
            };
            let err = menu.add(&a, rid, input).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValidationFailed);
            assert_eq!(err.to_string(), message);
        }
        assert!(menu.list(&a, rid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_dish_of_other_restaurant() {
        let fx = Fixture::new();
        let menu = MenuService::new(&fx.store, &fx.graph);
        let a = fx.admin("a@x.com").await;
        let r1 = restaurant(&fx, &a).await;
        let r2 = restaurant(&fx, &a).await;
        let dish = menu.add(&a, r2, dosa()).await.unwrap().id;
        let rava = DishInput {
            name: "Rava Dosa",
            ..dosa()
        };

        let err = menu.update(&a, r1, dish, rava).await.unwrap_err();
        assert_eq!(err.to_string(), "can not update dish of other restaurant");

        let updated = menu.update(&a, r2, dish, rava).await.unwrap();
        assert_eq!(updated.name, "Rava Dosa");
    }

    #[tokio::test]
    async fn test_delete_dishes_partial() {
        let fx = Fixture::new();
        let menu = MenuService::new(&fx.store, &fx.graph);
        let a = fx.admin("a@x.com").await;
        let r1 = restaurant(&fx, &a).await;
        let r2 = restaurant(&fx, &a).await;
        let d1 = menu.add(&a, r1, dosa()).await.unwrap().id;
        let elsewhere = menu.add(&a, r2, dosa()).await.unwrap().id;
        let d2 = menu.add(&a, r1, dosa()).await.unwrap().id;

        let err = menu
            .delete(&a, r1, &[d1, elsewhere, d2, DishId::new(500)])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Dishes Deleted Except entry no. 2, 4");
        assert!(menu.list(&a, r1).await.unwrap().is_empty());
        assert_eq!(menu.list(&a, r2).await.unwrap().len(), 1);
        assert!(fx.store.restaurant(r1).await.unwrap().is_some());
    }
}
