//! Domain models.
//!
//! These types represent validated domain objects separate from database
//! row types; repositories convert rows into them and handlers serialize
//! them straight to JSON.

pub mod order;
pub mod product;
pub mod user;

pub use order::{Order, OrderItem, PaymentResult};
pub use product::Product;
pub use user::{Address, User};
