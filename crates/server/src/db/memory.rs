//! In-memory implementation of [`ResmanStore`].
//!
//! All state lives behind one `tokio::sync::RwLock`, so multi-table effects
//! (owner deletion clearing assignments, restaurant deletion dropping its
//! menu) happen under a single write guard. Ids are assigned from
//! per-table counters starting at 1, like a serial column.
//!
//! Nothing is persisted; restarting the process starts from empty tables.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use resman_core::{AccountId, DishId, Email, RestaurantId, Role};

use super::{RepositoryError, ResmanStore, StoreResult};
use crate::models::{
    Account, AccountUpdate, Dish, DishUpdate, NewAccount, NewDish, NewRestaurant, Restaurant,
    RestaurantFilter, RestaurantUpdate,
};

#[derive(Default)]
struct Tables {
    /// Accounts in insertion order; role is part of each row.
    accounts: Vec<Account>,
    restaurants: BTreeMap<RestaurantId, Restaurant>,
    dishes: BTreeMap<DishId, Dish>,
    revoked: HashMap<String, DateTime<Utc>>,
    next_restaurant: i32,
    next_dish: i32,
}

impl Tables {
    fn email_taken(&self, role: Role, email: &Email, except: Option<&AccountId>) -> bool {
        self.accounts
            .iter()
            .any(|a| a.role == role && &a.email == email && Some(&a.id) != except)
    }

    fn account_mut(&mut self, role: Role, id: &AccountId) -> Option<&mut Account> {
        self.accounts
            .iter_mut()
            .find(|a| a.role == role && &a.id == id)
    }
}

/// Process-local store backed by ordered maps.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_email(role: Role, email: &Email) -> RepositoryError {
    RepositoryError::Conflict(format!("{role} email {email} already exists"))
}

#[async_trait]
impl ResmanStore for InMemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_account(&self, account: NewAccount) -> StoreResult<Account> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(account.role, &account.email, None) {
            return Err(duplicate_email(account.role, &account.email));
        }

        let stored = Account {
            id: AccountId::generate(),
            role: account.role,
            email: account.email,
            name: account.name,
            password_hash: account.password_hash,
            created_by: account.created_by,
            created_at: Utc::now(),
        };
        tables.accounts.push(stored.clone());
        Ok(stored)
    }

    async fn account(&self, role: Role, id: &AccountId) -> StoreResult<Option<Account>> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .iter()
            .find(|a| a.role == role && &a.id == id)
            .cloned())
    }

    async fn account_by_email(&self, role: Role, email: &Email) -> StoreResult<Option<Account>> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .iter()
            .find(|a| a.role == role && &a.email == email)
            .cloned())
    }

    async fn list_accounts(
        &self,
        role: Role,
        created_by: Option<&AccountId>,
    ) -> StoreResult<Vec<Account>> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .iter()
            .filter(|a| a.role == role)
            .filter(|a| created_by.is_none_or(|creator| a.created_by.as_ref() == Some(creator)))
            .cloned()
            .collect())
    }

    async fn update_account(
        &self,
        role: Role,
        id: &AccountId,
        update: &AccountUpdate,
    ) -> StoreResult<Account> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(role, &update.email, Some(id)) {
            return Err(duplicate_email(role, &update.email));
        }
        let account = tables
            .account_mut(role, id)
            .ok_or(RepositoryError::NotFound)?;
        account.email = update.email.clone();
        account.name.clone_from(&update.name);
        Ok(account.clone())
    }

    async fn delete_account(&self, role: Role, id: &AccountId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.accounts.len();
        tables.accounts.retain(|a| !(a.role == role && &a.id == id));
        let removed = tables.accounts.len() != before;

        if removed && role == Role::Owner {
            for restaurant in tables.restaurants.values_mut() {
                if restaurant.owner_id.as_ref() == Some(id) {
                    restaurant.owner_id = None;
                }
            }
        }
        Ok(removed)
    }

    async fn insert_restaurant(&self, restaurant: NewRestaurant) -> StoreResult<Restaurant> {
        let mut tables = self.tables.write().await;
        tables.next_restaurant += 1;
        let id = RestaurantId::new(tables.next_restaurant);
        let stored = Restaurant {
            id,
            name: restaurant.name,
            location: restaurant.location,
            creator_id: restaurant.creator_id,
            owner_id: None,
            created_at: Utc::now(),
        };
        tables.restaurants.insert(id, stored.clone());
        Ok(stored)
    }

    async fn restaurant(&self, id: RestaurantId) -> StoreResult<Option<Restaurant>> {
        Ok(self.tables.read().await.restaurants.get(&id).cloned())
    }

    async fn list_restaurants(&self, filter: &RestaurantFilter) -> StoreResult<Vec<Restaurant>> {
        let tables = self.tables.read().await;
        Ok(tables
            .restaurants
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn update_restaurant(
        &self,
        id: RestaurantId,
        update: &RestaurantUpdate,
    ) -> StoreResult<Restaurant> {
        let mut tables = self.tables.write().await;
        let restaurant = tables
            .restaurants
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        restaurant.name.clone_from(&update.name);
        restaurant.location = update.location;
        Ok(restaurant.clone())
    }

    async fn set_restaurant_owner(
        &self,
        id: RestaurantId,
        owner: Option<&AccountId>,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(restaurant) = tables.restaurants.get_mut(&id) else {
            return Ok(false);
        };
        restaurant.owner_id = owner.cloned();
        Ok(true)
    }

    async fn delete_restaurant(&self, id: RestaurantId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables.restaurants.remove(&id).is_some();
        if removed {
            tables.dishes.retain(|_, dish| dish.restaurant_id != id);
        }
        Ok(removed)
    }

    async fn insert_dish(&self, dish: NewDish) -> StoreResult<Dish> {
        let mut tables = self.tables.write().await;
        if !tables.restaurants.contains_key(&dish.restaurant_id) {
            return Err(RepositoryError::NotFound);
        }
        tables.next_dish += 1;
        let id = DishId::new(tables.next_dish);
        let stored = Dish {
            id,
            restaurant_id: dish.restaurant_id,
            name: dish.name,
            price: dish.price,
            created_at: Utc::now(),
        };
        tables.dishes.insert(id, stored.clone());
        Ok(stored)
    }

    async fn dish(&self, id: DishId) -> StoreResult<Option<Dish>> {
        Ok(self.tables.read().await.dishes.get(&id).cloned())
    }

    async fn list_dishes(&self, restaurant: RestaurantId) -> StoreResult<Vec<Dish>> {
        let tables = self.tables.read().await;
        Ok(tables
            .dishes
            .values()
            .filter(|d| d.restaurant_id == restaurant)
            .cloned()
            .collect())
    }

    async fn update_dish(&self, id: DishId, update: &DishUpdate) -> StoreResult<Dish> {
        let mut tables = self.tables.write().await;
        let dish = tables.dishes.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        dish.name.clone_from(&update.name);
        dish.price = update.price;
        Ok(dish.clone())
    }

    async fn delete_dish(&self, id: DishId) -> StoreResult<bool> {
        Ok(self.tables.write().await.dishes.remove(&id).is_some())
    }

    async fn revoke_token(&self, token: &str, expires_at: DateTime<Utc>) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .revoked
            .entry(token.to_owned())
            .or_insert(expires_at);
        Ok(())
    }

    async fn is_token_revoked(&self, token: &str) -> StoreResult<bool> {
        Ok(self.tables.read().await.revoked.contains_key(token))
    }

    async fn purge_revoked_tokens(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.revoked.len();
        tables.revoked.retain(|_, expires_at| *expires_at > now);
        Ok(u64::try_from(before - tables.revoked.len()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use resman_core::{Location, Price};
    use rust_decimal::Decimal;

    use super::*;

    fn new_account(role: Role, email: &str, created_by: Option<&AccountId>) -> NewAccount {
        NewAccount {
            role,
            email: Email::parse(email).unwrap(),
            name: "Test".to_string(),
            password_hash: "hash".to_string(),
            created_by: created_by.cloned(),
        }
    }

    fn new_restaurant(creator: &AccountId, name: &str) -> NewRestaurant {
        NewRestaurant {
            name: name.to_string(),
            location: Location::new(12.97, 77.59),
            creator_id: creator.clone(),
        }
    }

    #[tokio::test]
    async fn test_email_unique_per_role_table() {
        let store = InMemoryStore::new();
        store
            .insert_account(new_account(Role::Admin, "a@x.com", None))
            .await
            .unwrap();

        let dup = store
            .insert_account(new_account(Role::Admin, "a@x.com", None))
            .await;
        assert!(matches!(dup, Err(RepositoryError::Conflict(_))));

        // Same email in another role's table is allowed
        store
            .insert_account(new_account(Role::SuperAdmin, "a@x.com", None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_accounts_scoped_by_creator_in_creation_order() {
        let store = InMemoryStore::new();
        let a = AccountId::from("admin-a");
        let b = AccountId::from("admin-b");
        let first = store
            .insert_account(new_account(Role::Owner, "o1@x.com", Some(&a)))
            .await
            .unwrap();
        store
            .insert_account(new_account(Role::Owner, "o2@x.com", Some(&b)))
            .await
            .unwrap();
        let third = store
            .insert_account(new_account(Role::Owner, "o3@x.com", Some(&a)))
            .await
            .unwrap();

        let scoped = store.list_accounts(Role::Owner, Some(&a)).await.unwrap();
        let ids: Vec<_> = scoped.into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);
        assert_eq!(store.list_accounts(Role::Owner, None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_account_conflict_and_not_found() {
        let store = InMemoryStore::new();
        let one = store
            .insert_account(new_account(Role::Admin, "one@x.com", None))
            .await
            .unwrap();
        store
            .insert_account(new_account(Role::Admin, "two@x.com", None))
            .await
            .unwrap();

        let taken = AccountUpdate {
            email: Email::parse("two@x.com").unwrap(),
            name: "One".to_string(),
        };
        assert!(matches!(
            store.update_account(Role::Admin, &one.id, &taken).await,
            Err(RepositoryError::Conflict(_))
        ));

        // Keeping your own email is not a conflict
        let same = AccountUpdate {
            email: Email::parse("one@x.com").unwrap(),
            name: "Renamed".to_string(),
        };
        let updated = store.update_account(Role::Admin, &one.id, &same).await.unwrap();
        assert_eq!(updated.name, "Renamed");

        assert!(matches!(
            store
                .update_account(Role::Admin, &AccountId::from("missing"), &same)
                .await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_deleting_owner_frees_its_restaurants() {
        let store = InMemoryStore::new();
        let admin = AccountId::from("admin");
        let owner = store
            .insert_account(new_account(Role::Owner, "o@x.com", Some(&admin)))
            .await
            .unwrap();
        let r = store
            .insert_restaurant(new_restaurant(&admin, "Thali House"))
            .await
            .unwrap();
        store.set_restaurant_owner(r.id, Some(&owner.id)).await.unwrap();

        assert!(store.delete_account(Role::Owner, &owner.id).await.unwrap());
        let r = store.restaurant(r.id).await.unwrap().unwrap();
        assert!(r.is_available());
        assert!(!store.delete_account(Role::Owner, &owner.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_restaurant_ids_are_sequential_and_listing_ordered() {
        let store = InMemoryStore::new();
        let admin = AccountId::from("admin");
        let r1 = store.insert_restaurant(new_restaurant(&admin, "A")).await.unwrap();
        let r2 = store.insert_restaurant(new_restaurant(&admin, "B")).await.unwrap();
        assert_eq!(r1.id, RestaurantId::new(1));
        assert_eq!(r2.id, RestaurantId::new(2));

        let all = store.list_restaurants(&RestaurantFilter::All).await.unwrap();
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![r1.id, r2.id]);
    }

    #[tokio::test]
    async fn test_deleting_restaurant_drops_menu() {
        let store = InMemoryStore::new();
        let admin = AccountId::from("admin");
        let r = store.insert_restaurant(new_restaurant(&admin, "A")).await.unwrap();
        let dish = store
            .insert_dish(NewDish {
                restaurant_id: r.id,
                name: "Idli".to_string(),
                price: Price::parse_positive(Decimal::new(40, 0)).unwrap(),
            })
            .await
            .unwrap();

        assert!(store.delete_restaurant(r.id).await.unwrap());
        assert!(store.dish(dish.id).await.unwrap().is_none());
        assert!(!store.delete_restaurant(r.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_dish_requires_restaurant() {
        let store = InMemoryStore::new();
        let result = store
            .insert_dish(NewDish {
                restaurant_id: RestaurantId::new(99),
                name: "Vada".to_string(),
                price: Price::parse_positive(Decimal::new(30, 0)).unwrap(),
            })
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_revocation_is_idempotent_and_purgeable() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        store.revoke_token("t1", now + Duration::minutes(5)).await.unwrap();
        store.revoke_token("t1", now + Duration::minutes(5)).await.unwrap();
        store.revoke_token("t2", now - Duration::minutes(1)).await.unwrap();

        assert!(store.is_token_revoked("t1").await.unwrap());
        assert!(!store.is_token_revoked("t3").await.unwrap());

        assert_eq!(store.purge_revoked_tokens(now).await.unwrap(), 1);
        assert!(store.is_token_revoked("t1").await.unwrap());
        assert!(!store.is_token_revoked("t2").await.unwrap());
    }
}
