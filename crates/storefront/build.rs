//! Build script for storefront crate.
//!
//! Migrations are embedded with `sqlx::migrate!`, which does not track new
//! files on its own. Rerun the build whenever the migrations directory changes.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
