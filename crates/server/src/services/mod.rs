//! Business logic services.
//!
//! # Services
//!
//! - `auth` - registration, login, session tokens, logout
//! - `admins` - super admin management of admin accounts
//! - `owners` - owner accounts and their restaurant assignments
//! - `restaurants` - restaurants, availability, near-by search
//! - `menu` - dishes on a restaurant's menu
//!
//! Every operation runs the same pipeline: validate input, authorize
//! against the ownership graph, then read or write the store. Services
//! borrow what they need from `AppState` and are built per request.

pub mod admins;
pub mod auth;
pub mod batch;
pub mod error;
pub mod menu;
pub mod owners;
pub mod restaurants;

pub use admins::AdminService;
pub use auth::{AuthService, Session, TokenIssuer};
pub use batch::BatchOutcome;
pub use error::{ErrorKind, ServiceError};
pub use menu::MenuService;
pub use owners::OwnerService;
pub use restaurants::RestaurantService;

/// Reject a blank required field.
pub(crate) fn require(value: &str, field: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::ValidationFailed(format!("{field} is required")));
    }
    Ok(())
}
