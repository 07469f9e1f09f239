//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::images::CloudinaryClient;
use crate::services::payments::{StripeClient, StripeError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; provides access to shared resources like
/// the database pool, configuration, and external-service clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    payments: StripeClient,
    images: CloudinaryClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Stripe client cannot be built.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, StripeError> {
        let payments = StripeClient::new(&config.stripe)?;
        let images = CloudinaryClient::new(&config.cloudinary);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                payments,
                images,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Stripe client.
    #[must_use]
    pub fn payments(&self) -> &StripeClient {
        &self.inner.payments
    }

    /// Get a reference to the Cloudinary client.
    #[must_use]
    pub fn images(&self) -> &CloudinaryClient {
        &self.inner.images
    }
}
