//! Owner accounts and their restaurant assignments.

use resman_core::{AccountId, Email, RestaurantId, Role};

use crate::authz::{self, Actor, Operation, policy};
use crate::db::{RepositoryError, SharedStore};
use crate::graph::OwnershipGraph;
use crate::models::{AccountView, RestaurantFilter, RestaurantView};
use crate::services::admins::AccountInput;
use crate::services::auth::{AuthService, TokenIssuer};
use crate::services::batch::{self, BatchOutcome, refused};
use crate::services::{ServiceError, require};

/// New owner as received from the client.
#[derive(Debug, Clone)]
pub struct NewOwnerInput<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

pub struct OwnerService<'a> {
    store: &'a SharedStore,
    graph: &'a OwnershipGraph,
    tokens: &'a TokenIssuer,
}

impl<'a> OwnerService<'a> {
    #[must_use]
    pub const fn new(
        store: &'a SharedStore,
        graph: &'a OwnershipGraph,
        tokens: &'a TokenIssuer,
    ) -> Self {
        Self {
            store,
            graph,
            tokens,
        }
    }

    /// Create an owner stamped with the actor as creator.
    ///
    /// # Errors
    ///
    /// `ValidationFailed`, `Unauthorized` for owners, `DuplicateEmail`.
    pub async fn create(
        &self,
        actor: &Actor,
        input: NewOwnerInput<'_>,
    ) -> Result<AccountView, ServiceError> {
        require(input.name, "name")?;
        require(input.email, "email")?;
        require(input.password, "password")?;
        let email = Email::parse(input.email)
            .map_err(|e| ServiceError::ValidationFailed(format!("invalid email: {e}")))?;
        let creator = policy::create_owner(actor)?;

        let owner = AuthService::new(self.store, self.tokens)
            .create_account(
                Role::Owner,
                email,
                input.name.trim(),
                input.password,
                Some(creator),
            )
            .await
            .map_err(ServiceError::from)?;
        tracing::info!(owner_id = %owner.id, creator_id = %actor.id, "Owner created");
        Ok(owner.into())
    }

    /// Owners visible to the actor: all for a super admin, own creations for
    /// an admin.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for owners.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<AccountView>, ServiceError> {
        let scope = policy::list_owners(actor)?;
        let owners = self
            .store
            .list_accounts(Role::Owner, scope.created_by())
            .await?;
        Ok(owners.into_iter().map(AccountView::from).collect())
    }

    /// Change an owner's name and email.
    ///
    /// # Errors
    ///
    /// `ValidationFailed`, `NotFound` for an unknown owner, `Unauthorized`
    /// for another admin's owner, `DuplicateEmail`.
    pub async fn update(
        &self,
        actor: &Actor,
        id: &AccountId,
        input: AccountInput<'_>,
    ) -> Result<AccountView, ServiceError> {
        let update = input.validate()?;
        authz::authorize(self.graph, actor, &Operation::ManageOwner(id.clone())).await?;
        let owner = self
            .store
            .update_account(Role::Owner, id, &update)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::from(authz::Denial::OwnerNotFound),
                other => other.into(),
            })?;
        tracing::info!(owner_id = %owner.id, "Owner updated");
        Ok(owner.into())
    }

    /// Delete owners by id. Their restaurants become available.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for owners; `PartialFailure` for ids that were unknown
    /// or created by another admin.
    pub async fn delete(&self, actor: &Actor, ids: &[AccountId]) -> Result<(), ServiceError> {
        policy::require_manager(actor)?;
        let mut outcome = BatchOutcome::new("Owners");
        for (position, id) in (1..).zip(ids) {
            let op = Operation::ManageOwner(id.clone());
            if refused(authz::authorize(self.graph, actor, &op).await)? {
                outcome.record_failure(position);
                continue;
            }
            if !self.store.delete_account(Role::Owner, id).await? {
                outcome.record_failure(position);
            }
        }
        outcome.into_result()
    }

    /// Restaurants assigned to `owner`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown owner, `Unauthorized` if an admin asks
    /// about another admin's owner.
    pub async fn restaurants(
        &self,
        actor: &Actor,
        owner: &AccountId,
    ) -> Result<Vec<RestaurantView>, ServiceError> {
        let op = Operation::ManageOwnerRestaurants(owner.clone());
        authz::authorize(self.graph, actor, &op).await?;
        let restaurants = self
            .store
            .list_restaurants(&RestaurantFilter::OwnedBy(owner.clone()))
            .await?;
        Ok(restaurants.into_iter().map(RestaurantView::from).collect())
    }

    /// Assign `assign` to `owner` and make `unassign` available again.
    ///
    /// The owner is checked once for the whole request. Each restaurant is
    /// then checked on its own: an admin may only move restaurants it
    /// created. Unassigning only touches restaurants currently held by
    /// `owner`.
    ///
    /// # Errors
    ///
    /// `NotFound`/`Unauthorized` if the owner check fails (nothing is
    /// changed); `PartialFailure` listing refused positions per list.
    pub async fn update_assignments(
        &self,
        actor: &Actor,
        owner: &AccountId,
        assign: &[RestaurantId],
        unassign: &[RestaurantId],
    ) -> Result<(), ServiceError> {
        let op = Operation::ManageOwnerRestaurants(owner.clone());
        authz::authorize(self.graph, actor, &op).await?;

        let mut assigned = BatchOutcome::new("Restaurants");
        for (position, &restaurant) in (1..).zip(assign) {
            let op = Operation::AssignRestaurant(restaurant);
            if refused(authz::authorize(self.graph, actor, &op).await)?
                || !self.graph.assign_owner(restaurant, owner).await?
            {
                assigned.record_failure(position);
            }
        }

        let mut unassigned = BatchOutcome::new("Restaurants");
        for (position, &restaurant) in (1..).zip(unassign) {
            let op = Operation::AssignRestaurant(restaurant);
            if refused(authz::authorize(self.graph, actor, &op).await)? {
                unassigned.record_failure(position);
                continue;
            }
            let held = self.graph.owner_of(restaurant).await?.flatten();
            if held.as_ref() == Some(owner) {
                self.graph.unassign_owner(restaurant).await?;
            } else if held.is_some() {
                unassigned.record_failure(position);
            }
        }

        tracing::info!(
            owner_id = %owner,
            assigned = assign.len(),
            unassigned = unassign.len(),
            "Owner restaurants updated"
        );
        batch::combine([assigned, unassigned])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use secrecy::SecretString;

    use resman_core::Location;

    use super::*;
    use crate::models::NewRestaurant;
    use crate::services::ErrorKind;
    use crate::services::test_support::{Fixture, stranger};

    fn tokens() -> TokenIssuer {
        TokenIssuer::new(
            &SecretString::from("k9#Lq2!vR7@xT4$mW8^zB1&nC5*pD3(f"),
            Duration::minutes(120),
        )
    }

    async fn restaurant(fx: &Fixture, creator: &Actor, name: &str) -> RestaurantId {
        fx.store
            .insert_restaurant(NewRestaurant {
                name: name.to_string(),
                location: Location::new(12.97, 77.59),
                creator_id: creator.id.clone(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_list_owners_scoped_to_creator() {
        let fx = Fixture::new();
        let tokens = tokens();
        let service = OwnerService::new(&fx.store, &fx.graph, &tokens);
        let root = fx.super_admin().await;
        let a = fx.admin("a@x.com").await;
        let b = fx.admin("b@x.com").await;

        for (actor, email) in [(&a, "o1@x.com"), (&b, "o2@x.com"), (&a, "o3@x.com")] {
            service
                .create(
                    actor,
                    NewOwnerInput {
                        name: "Owner",
                        email,
                        password: "pw",
                    },
                )
                .await
                .unwrap();
        }

        let mine: Vec<_> = service.list(&a).await.unwrap().into_iter().map(|o| o.email).collect();
        assert_eq!(mine.iter().map(Email::as_str).collect::<Vec<_>>(), ["o1@x.com", "o3@x.com"]);
        assert_eq!(service.list(&root).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_create_owner_rules() {
        let fx = Fixture::new();
        let tokens = tokens();
        let service = OwnerService::new(&fx.store, &fx.graph, &tokens);
        let a = fx.admin("a@x.com").await;
        let owner = fx.owner("o@x.com", &a).await;
        let input = NewOwnerInput {
            name: "Ravi",
            email: "ravi@x.com",
            password: "pw",
        };

        assert_eq!(
            service.create(&owner, input.clone()).await.unwrap_err().kind(),
            ErrorKind::Unauthorized
        );
        service.create(&a, input.clone()).await.unwrap();
        assert_eq!(
            service.create(&a, input).await.unwrap_err().kind(),
            ErrorKind::DuplicateEmail
        );
        let blank = NewOwnerInput {
            name: "Ravi",
            email: "r2@x.com",
            password: "",
        };
        assert_eq!(
            service.create(&a, blank).await.unwrap_err().kind(),
            ErrorKind::ValidationFailed
        );
    }

    #[tokio::test]
    async fn test_other_admin_cannot_update_owner() {
        let fx = Fixture::new();
        let tokens = tokens();
        let service = OwnerService::new(&fx.store, &fx.graph, &tokens);
        let a = fx.admin("a@x.com").await;
        let b = fx.admin("b@x.com").await;
        let owner = fx.owner("o@x.com", &a).await;
        let input = AccountInput {
            name: "New",
            email: "new@x.com",
        };

        let err = service.update(&b, &owner.id, input.clone()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.to_string(), "can not update owner created by other admin");

        let err = service.update(&b, &stranger(), input.clone()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let updated = service.update(&a, &owner.id, input).await.unwrap();
        assert_eq!(updated.name, "New");
    }

    #[tokio::test]
    async fn test_delete_owners_partial() {
        let fx = Fixture::new();
        let tokens = tokens();
        let service = OwnerService::new(&fx.store, &fx.graph, &tokens);
        let a = fx.admin("a@x.com").await;
        let b = fx.admin("b@x.com").await;
        let mine = fx.owner("o1@x.com", &a).await;
        let theirs = fx.owner("o2@x.com", &b).await;

        let err = service
            .delete(&a, &[theirs.id.clone(), mine.id.clone(), stranger()])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Owners Deleted Except entry no. 1, 3");
        assert!(service.list(&a).await.unwrap().is_empty());
        assert_eq!(service.list(&b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_assignment_round_trip() {
        let fx = Fixture::new();
        let tokens = tokens();
        let service = OwnerService::new(&fx.store, &fx.graph, &tokens);
        let a = fx.admin("a@x.com").await;
        let b = fx.admin("b@x.com").await;
        let owner = fx.owner("o@x.com", &a).await;
        let r1 = restaurant(&fx, &a, "One").await;
        let r2 = restaurant(&fx, &a, "Two").await;
        let foreign = restaurant(&fx, &b, "Foreign").await;

        let err = service
            .update_assignments(&a, &owner.id, &[r1, foreign, r2], &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Restaurants Deleted Except entry no. 2");

        let held: Vec<_> = service
            .restaurants(&a, &owner.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(held, [r1, r2]);

        service
            .update_assignments(&a, &owner.id, &[], &[r1, r1])
            .await
            .unwrap();
        let held: Vec<_> = service
            .restaurants(&a, &owner.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(held, [r2]);

        let available = fx
            .store
            .list_restaurants(&RestaurantFilter::AvailableCreatedBy(a.id.clone()))
            .await
            .unwrap();
        assert_eq!(available.iter().map(|r| r.id).collect::<Vec<_>>(), [r1]);
    }

    #[tokio::test]
    async fn test_assignment_needs_own_owner() {
        let fx = Fixture::new();
        let tokens = tokens();
        let service = OwnerService::new(&fx.store, &fx.graph, &tokens);
        let a = fx.admin("a@x.com").await;
        let b = fx.admin("b@x.com").await;
        let owner = fx.owner("o@x.com", &a).await;
        let r = restaurant(&fx, &b, "B's").await;

        let err = service
            .update_assignments(&b, &owner.id, &[r], &[])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(fx.graph.owner_of(r).await.unwrap(), Some(None));

        let err = service
            .update_assignments(&b, &stranger(), &[r], &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "owner does not exist");
    }
}
