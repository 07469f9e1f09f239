//! HTTP route handlers.

pub mod auth;
pub mod orders;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Assemble all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::routes())
        .nest("/products", products::routes())
        .nest("/orders", orders::routes())
}
