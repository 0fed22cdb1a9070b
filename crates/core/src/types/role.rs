//! Account roles.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a role string is not one of the known roles.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleError {
    #[error("unknown role: {0}")]
    Unknown(String),
}

/// Role of an authenticated account.
///
/// Capabilities are not inherited: each role has its own row in the
/// authorization decision table. The wire names (`superAdmin`, `admin`,
/// `owner`) are what clients send and what session tokens carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Manages admins and sees every owner and restaurant.
    #[serde(rename = "superAdmin")]
    SuperAdmin,
    /// Manages the owners and restaurants it created.
    #[serde(rename = "admin")]
    Admin,
    /// Manages the menus of restaurants assigned to it.
    #[serde(rename = "owner")]
    Owner,
}

impl Role {
    /// All roles, in hierarchy order.
    pub const ALL: [Self; 3] = [Self::SuperAdmin, Self::Admin, Self::Owner];

    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "superAdmin",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }

    /// Whether accounts of this role may be created through public registration.
    ///
    /// Owners are only ever created by an admin or super admin.
    #[must_use]
    pub const fn can_register(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }

    /// Whether the role creates owners and restaurants.
    #[must_use]
    pub const fn is_manager(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superAdmin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            other => Err(RoleError::Unknown(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn test_role_parse_is_case_sensitive() {
        assert!("SuperAdmin".parse::<Role>().is_err());
        assert!("super_admin".parse::<Role>().is_err());
        assert_eq!(
            "otherRole".parse::<Role>(),
            Err(RoleError::Unknown("otherRole".to_string()))
        );
    }

    #[test]
    fn test_only_managers_register() {
        assert!(Role::SuperAdmin.can_register());
        assert!(Role::Admin.can_register());
        assert!(!Role::Owner.can_register());
    }
}
