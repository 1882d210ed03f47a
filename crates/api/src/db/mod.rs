//! Database operations for the Hearthside `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Customer accounts and Argon2id password hashes
//! - `categories` / `products` / `product_images` - Catalog
//! - `cart_items` - Per-user cart lines, `UNIQUE (user_id, product_id)`
//! - `wishlist` - Saved products, `UNIQUE (user_id, product_id)`
//! - `orders` / `order_items` - Immutable purchase snapshots
//! - `addresses` - Saved shipping/billing addresses
//! - `reviews` / `refunds` - Schema-only; no endpoints yet
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p hearthside-cli -- migrate
//! ```
//!
//! All queries are runtime `sqlx::query`/`query_as` with `FromRow` structs,
//! so the workspace builds without a live database.

pub mod addresses;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use cart::CartRepository;
pub use categories::CategoryRepository;
pub use orders::{CheckoutError, NewOrder, OrderRepository};
pub use products::ProductRepository;
pub use users::UserRepository;
pub use wishlist::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a sqlx unique-violation to `Conflict` with the given message.
    ///
    /// Any other error passes through as `Database`.
    pub(crate) fn or_conflict(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
