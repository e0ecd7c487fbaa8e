//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Credential store (username/password login)
//! - `session` - Session registry (token issue and resolution)
//! - `catalog` - Read-only product listing
//! - `cart` - Per-user cart ledger
//! - `checkout` - Cart to order conversion and order history
//! - `seed` - First-boot seed data
//!
//! Every service borrows the pool it is given; nothing is cached between
//! calls, so each operation sees current durable state.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod seed;
pub mod session;

pub use auth::{AuthError, CredentialStore};
pub use cart::{CartError, CartLedger};
pub use catalog::Catalog;
pub use checkout::{CheckoutEngine, CheckoutError, CheckoutOutcome};
pub use seed::{SeedError, SeedReport, seed_defaults};
pub use session::SessionRegistry;
