//! Restaurants and their owner assignment.

use chrono::{DateTime, Utc};
use serde::Serialize;

use resman_core::{AccountId, Location, RestaurantId};

/// A stored restaurant (domain type).
#[derive(Debug, Clone)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub location: Location,
    /// Admin or super admin that added the restaurant. Never changes.
    pub creator_id: AccountId,
    /// Assigned owner; `None` means the restaurant is available.
    pub owner_id: Option<AccountId>,
    pub created_at: DateTime<Utc>,
}

impl Restaurant {
    /// A restaurant without an owner is available for assignment.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.owner_id.is_none()
    }
}

/// Input for creating a restaurant.
#[derive(Debug, Clone)]
pub struct NewRestaurant {
    pub name: String,
    pub location: Location,
    pub creator_id: AccountId,
}

/// Mutable restaurant fields. Creator and owner are changed elsewhere or not at all.
#[derive(Debug, Clone)]
pub struct RestaurantUpdate {
    pub name: String,
    pub location: Location,
}

/// Which restaurants a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestaurantFilter {
    All,
    CreatedBy(AccountId),
    OwnedBy(AccountId),
    Available,
    AvailableCreatedBy(AccountId),
}

impl RestaurantFilter {
    /// Whether `restaurant` falls inside this filter.
    #[must_use]
    pub fn matches(&self, restaurant: &Restaurant) -> bool {
        match self {
            Self::All => true,
            Self::CreatedBy(creator) => &restaurant.creator_id == creator,
            Self::OwnedBy(owner) => restaurant.owner_id.as_ref() == Some(owner),
            Self::Available => restaurant.is_available(),
            Self::AvailableCreatedBy(creator) => {
                restaurant.is_available() && &restaurant.creator_id == creator
            }
        }
    }
}

/// Public representation of a restaurant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantView {
    pub id: RestaurantId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<AccountId>,
}

impl From<Restaurant> for RestaurantView {
    fn from(restaurant: Restaurant) -> Self {
        Self {
            id: restaurant.id,
            name: restaurant.name,
            lat: restaurant.location.lat,
            lng: restaurant.location.lng,
            owner_id: restaurant.owner_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restaurant(creator: &str, owner: Option<&str>) -> Restaurant {
        Restaurant {
            id: RestaurantId::new(1),
            name: "Dosa Corner".to_string(),
            location: Location::new(12.9, 77.6),
            creator_id: AccountId::from(creator),
            owner_id: owner.map(AccountId::from),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_matches() {
        let free = restaurant("admin-a", None);
        let owned = restaurant("admin-a", Some("owner-p"));

        assert!(RestaurantFilter::All.matches(&owned));
        assert!(RestaurantFilter::CreatedBy("admin-a".into()).matches(&owned));
        assert!(!RestaurantFilter::CreatedBy("admin-b".into()).matches(&owned));
        assert!(RestaurantFilter::OwnedBy("owner-p".into()).matches(&owned));
        assert!(!RestaurantFilter::OwnedBy("owner-p".into()).matches(&free));
        assert!(RestaurantFilter::Available.matches(&free));
        assert!(!RestaurantFilter::Available.matches(&owned));
        assert!(RestaurantFilter::AvailableCreatedBy("admin-a".into()).matches(&free));
        assert!(!RestaurantFilter::AvailableCreatedBy("admin-b".into()).matches(&free));
    }
}
