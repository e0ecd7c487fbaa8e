//! Domain models for the storefront.
//!
//! These are the plain data structures handed to the request layer. Database
//! row types live next to their queries in [`crate::db`].

pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use cart::CartItem;
pub use order::{LineItem, Order};
pub use product::Product;
pub use session::{Identity, Session};
pub use user::User;
