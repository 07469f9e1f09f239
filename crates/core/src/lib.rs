//! FarmLink Core - Shared types library.
//!
//! This crate provides common types used across all FarmLink components:
//! - `server` - REST backend for the storefront
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows
//! it to be used anywhere, including in the pricing code a client would
//! mirror for display.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, roles, and statuses
//! - [`pricing`] - Decimal order-total calculation (the server's authority)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use pricing::*;
pub use types::*;
