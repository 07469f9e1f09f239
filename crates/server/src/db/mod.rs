//! Database operations for the FarmLink `PostgreSQL` store.
//!
//! # Tables
//!
//! - `users` - Identity store (credentials, role, contact/address)
//! - `products` - Catalog store (price, stock, approval flag, owning seller)
//! - `orders` / `order_items` - Order ledger (line-item snapshots, totals,
//!   payment/delivery state)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p farmlink-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod orders;
pub mod products;
pub mod users;

pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors surfaced by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint was violated (e.g. duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored value could not be interpreted (e.g. an unknown role).
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
