//! Restaurants: creation, scoped listings, edits, deletion, near-by search.

use resman_core::{Location, RestaurantId};

use crate::authz::{self, Actor, Denial, Operation, policy};
use crate::db::{RepositoryError, SharedStore};
use crate::graph::OwnershipGraph;
use crate::models::{NewRestaurant, RestaurantUpdate, RestaurantView};
use crate::services::batch::{BatchOutcome, refused};
use crate::services::{ServiceError, require};

/// Restaurant fields as received from the client.
#[derive(Debug, Clone, Copy)]
pub struct RestaurantInput<'a> {
    pub name: &'a str,
    pub lat: f64,
    pub lng: f64,
}

impl RestaurantInput<'_> {
    fn validate(&self) -> Result<(String, Location), ServiceError> {
        require(self.name, "name")?;
        let location = Location::new(self.lat, self.lng);
        if location.is_unset() {
            return Err(ServiceError::ValidationFailed(
                "lat and lng are required".to_string(),
            ));
        }
        if !location.is_valid() {
            return Err(ServiceError::ValidationFailed(
                "lat or lng out of range".to_string(),
            ));
        }
        Ok((self.name.trim().to_string(), location))
    }
}

pub struct RestaurantService<'a> {
    store: &'a SharedStore,
    graph: &'a OwnershipGraph,
}

impl<'a> RestaurantService<'a> {
    #[must_use]
    pub const fn new(store: &'a SharedStore, graph: &'a OwnershipGraph) -> Self {
        Self { store, graph }
    }

    /// Add a restaurant created by the actor. It starts out available.
    ///
    /// # Errors
    ///
    /// `ValidationFailed`, `Unauthorized` for owners.
    pub async fn create(
        &self,
        actor: &Actor,
        input: RestaurantInput<'_>,
    ) -> Result<RestaurantView, ServiceError> {
        let (name, location) = input.validate()?;
        let creator_id = policy::create_restaurant(actor)?;
        let restaurant = self
            .store
            .insert_restaurant(NewRestaurant {
                name,
                location,
                creator_id,
            })
            .await?;
        tracing::info!(restaurant_id = %restaurant.id, creator_id = %actor.id, "Restaurant created");
        Ok(restaurant.into())
    }

    /// Restaurants in the actor's scope: all, created, or owned.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<RestaurantView>, ServiceError> {
        let filter = policy::list_restaurants(actor);
        let restaurants = self.store.list_restaurants(&filter).await?;
        Ok(restaurants.into_iter().map(RestaurantView::from).collect())
    }

    /// Restaurants with no owner, limited to the actor's own for admins.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for owners.
    pub async fn available(&self, actor: &Actor) -> Result<Vec<RestaurantView>, ServiceError> {
        let filter = policy::list_available_restaurants(actor)?;
        let restaurants = self.store.list_restaurants(&filter).await?;
        Ok(restaurants.into_iter().map(RestaurantView::from).collect())
    }

    /// Change name and location. Creator and owner never change here.
    ///
    /// # Errors
    ///
    /// `ValidationFailed`, `NotFound`, `Unauthorized` for owners and for
    /// admins that did not create the restaurant.
    pub async fn update(
        &self,
        actor: &Actor,
        id: RestaurantId,
        input: RestaurantInput<'_>,
    ) -> Result<RestaurantView, ServiceError> {
        let (name, location) = input.validate()?;
        authz::authorize(self.graph, actor, &Operation::ManageRestaurant(id)).await?;
        let restaurant = self
            .store
            .update_restaurant(id, &RestaurantUpdate { name, location })
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => Denial::RestaurantNotFound.into(),
                other => ServiceError::from(other),
            })?;
        tracing::info!(restaurant_id = %id, "Restaurant updated");
        Ok(restaurant.into())
    }

    /// Delete restaurants by id, along with their menus.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for owners; `PartialFailure` for ids that were unknown
    /// or created by another admin.
    pub async fn delete(&self, actor: &Actor, ids: &[RestaurantId]) -> Result<(), ServiceError> {
        policy::require_manager(actor)?;
        let mut outcome = BatchOutcome::new("Restaurants");
        for (position, &id) in (1..).zip(ids) {
            let op = Operation::ManageRestaurant(id);
            if refused(authz::authorize(self.graph, actor, &op).await)?
                || !self.store.delete_restaurant(id).await?
            {
                outcome.record_failure(position);
            }
        }
        outcome.into_result()
    }

    /// Every restaurant strictly within `radius_km` of `center`, by id. No
    /// authentication involved.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` for an out-of-range point.
    pub async fn near_by(
        &self,
        center: Location,
        radius_km: f64,
    ) -> Result<Vec<RestaurantView>, ServiceError> {
        if !center.is_valid() {
            return Err(ServiceError::ValidationFailed(
                "lat or lng out of range".to_string(),
            ));
        }
        let restaurants = self.store.list_restaurants_within(center, radius_km).await?;
        Ok(restaurants
            .into_iter()
            .map(|r| RestaurantView {
                owner_id: None,
                ..r.into()
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::ErrorKind;
    use crate::services::test_support::Fixture;

    const MG_ROAD: RestaurantInput<'static> = RestaurantInput {
        name: "MTR",
        lat: 12.9551,
        lng: 77.5855,
    };

    #[tokio::test]
    async fn test_create_validates_and_scopes() {
        let fx = Fixture::new();
        let service = RestaurantService::new(&fx.store, &fx.graph);
        let a = fx.admin("a@x.com").await;
        let owner = fx.owner("o@x.com", &a).await;

        let created = service.create(&a, MG_ROAD).await.unwrap();
        assert_eq!(created.name, "MTR");
        assert!(created.owner_id.is_none());

        let zero = RestaurantInput {
            lat: 0.0,
            lng: 0.0,
            ..MG_ROAD
        };
        assert_eq!(
            service.create(&a, zero).await.unwrap_err().kind(),
            ErrorKind::ValidationFailed
        );
        assert_eq!(
            service.create(&owner, MG_ROAD).await.unwrap_err().kind(),
            ErrorKind::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_non_creator_update_never_mutates() {
        let fx = Fixture::new();
        let service = RestaurantService::new(&fx.store, &fx.graph);
        let a = fx.admin("a@x.com").await;
        let b = fx.admin("b@x.com").await;
        let id = service.create(&a, MG_ROAD).await.unwrap().id;
        let rename = RestaurantInput {
            name: "Hijacked",
            ..MG_ROAD
        };

        let err = service.update(&b, id, rename).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        let stored = fx.store.restaurant(id).await.unwrap().unwrap();
        assert_eq!(stored.name, "MTR");
        assert_eq!(stored.creator_id, a.id);

        let err = service
            .update(&a, RestaurantId::new(99), rename)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let updated = service.update(&a, id, rename).await.unwrap();
        assert_eq!(updated.name, "Hijacked");
        assert_eq!(
            fx.store.restaurant(id).await.unwrap().unwrap().creator_id,
            a.id
        );
    }

    #[tokio::test]
    async fn test_batch_delete_keeps_going_past_failures() {
        let fx = Fixture::new();
        let service = RestaurantService::new(&fx.store, &fx.graph);
        let root = fx.super_admin().await;
        let r1 = service.create(&root, MG_ROAD).await.unwrap().id;
        let r2 = service.create(&root, MG_ROAD).await.unwrap().id;

        let err = service
            .delete(&root, &[r1, RestaurantId::new(42), r2])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Restaurants Deleted Except entry no. 2");
        assert!(service.list(&root).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_scopes() {
        let fx = Fixture::new();
        let service = RestaurantService::new(&fx.store, &fx.graph);
        let root = fx.super_admin().await;
        let a = fx.admin("a@x.com").await;
        let owner = fx.owner("o@x.com", &a).await;
        let mine = service.create(&a, MG_ROAD).await.unwrap().id;
        service.create(&root, MG_ROAD).await.unwrap();
        fx.graph.assign_owner(mine, &owner.id).await.unwrap();

        assert_eq!(service.list(&root).await.unwrap().len(), 2);
        assert_eq!(service.list(&a).await.unwrap().len(), 1);
        let owned = service.list(&owner).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].owner_id.as_ref(), Some(&owner.id));

        assert!(service.available(&a).await.unwrap().is_empty());
        assert_eq!(service.available(&root).await.unwrap().len(), 1);
        assert_eq!(
            service.available(&owner).await.unwrap_err().kind(),
            ErrorKind::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_near_by_radius() {
        let fx = Fixture::new();
        let service = RestaurantService::new(&fx.store, &fx.graph);
        let a = fx.admin("a@x.com").await;
        service.create(&a, MG_ROAD).await.unwrap();
        // Mysuru, ~130 km away
        service
            .create(
                &a,
                RestaurantInput {
                    name: "Mylari",
                    lat: 12.3052,
                    lng: 76.6552,
                },
            )
            .await
            .unwrap();

        let near = service
            .near_by(Location::new(12.9716, 77.5946), 10.0)
            .await
            .unwrap();
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].name, "MTR");

        let none = service
            .near_by(Location::new(28.6139, 77.2090), 10.0)
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
