//! Application services.
//!
//! - [`auth`] - Registration, login, and bearer-token verification
//! - [`payments`] - Stripe payment-intent adapter
//! - [`images`] - Cloudinary image uploads
//! - [`orders`] - The order/payment orchestrator
//! - [`reconciler`] - Background sweep that settles or voids stale orders

pub mod auth;
pub mod images;
pub mod orders;
pub mod payments;
pub mod reconciler;
