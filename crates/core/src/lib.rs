//! Resman Core - Shared domain types.
//!
//! This crate provides the types shared by every Resman component:
//! - `server` - HTTP API, authorization engine, and storage backends
//! - `cli` - Command-line tools for migrations and account bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. Storage support is opt-in through the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, emails, roles, locations, and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
