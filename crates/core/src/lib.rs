//! CafeGo Core - Shared types library.
//!
//! This crate provides common types used across all CafeGo components:
//! - `storefront` - Catalog, cart, checkout and session handling
//! - `cli` - Command-line tools for migrations, seeding and order lookup
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, usernames and session tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
