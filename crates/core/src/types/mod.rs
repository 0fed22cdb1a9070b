//! Core types for Resman.
//!
//! This module provides type-safe wrappers for the restaurant-management domain.

pub mod email;
pub mod id;
pub mod location;
pub mod price;
pub mod role;

pub use email::{Email, EmailError};
pub use id::*;
pub use location::Location;
pub use price::{Price, PriceError};
pub use role::{Role, RoleError};
