//! Integration tests for FarmLink.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p farmlink-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Pricing, minor-unit conversion, and intent settlement
//! - `auth_tokens` - Credential and bearer-token lifecycle
//! - `order_lifecycle` - Order status machine and API shapes
//!
//! Everything here runs against the library seams without a database or
//! network; tests that need live `PostgreSQL`/Stripe belong in an
//! environment-gated suite, not the default `cargo test` run.

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::Utc;
use rust_decimal::Decimal;

use farmlink_core::{Category, ProductId, UserId};
use farmlink_server::models::Product;

/// An approved in-stock product for flow tests.
#[must_use]
pub fn approved_product(price: Decimal, count_in_stock: i32) -> Product {
    Product {
        id: ProductId::generate(),
        user_id: UserId::generate(),
        name: "Organic Tomatoes".to_string(),
        image: "https://res.cloudinary.com/farmlink/tomatoes.jpg".to_string(),
        brand: "Gurung Farm".to_string(),
        category: Category::Vegetables,
        description: "Vine ripened".to_string(),
        price,
        count_in_stock,
        discount: Decimal::ZERO,
        is_approved: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
