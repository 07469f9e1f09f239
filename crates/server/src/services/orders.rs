//! Order orchestrator.
//!
//! Ties the catalog, the order ledger, and the payment gateway together:
//! validates a submitted order, recomputes authoritative totals from the
//! catalog, reserves stock, persists the order, requests a payment intent,
//! and later reconciles payment confirmation back into the ledger.
//!
//! Client-submitted totals and client-posted processor results are never
//! trusted; the server recomputes the former and verifies the latter with
//! the gateway.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use farmlink_core::{LineAmount, OrderId, OrderStatus, PricingRules, ProductId, to_minor_units};

use crate::db::orders::{CreatePending, NewOrderItem};
use crate::db::{OrderRepository, ProductRepository, RepositoryError};
use crate::models::{Address, Order, PaymentResult, User};
use crate::services::payments::{StripeClient, StripeError};

/// Errors from the order workflow.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The submitted order has no line items.
    #[error("no order items")]
    EmptyOrder,

    /// A line item has a zero quantity.
    #[error("line quantity must be at least 1")]
    ZeroQuantity,

    /// A referenced product does not exist or is not purchasable.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// Requested quantity exceeds current stock.
    #[error("insufficient stock for {0}")]
    InsufficientStock(String),

    /// The order does not exist.
    #[error("order not found")]
    OrderNotFound,

    /// The caller is neither the purchaser nor an admin.
    #[error("not your order")]
    NotPurchaser,

    /// The order was voided and can no longer be paid.
    #[error("order has been voided")]
    OrderVoided,

    /// No payment intent was ever reserved for this order.
    #[error("order has no payment intent")]
    MissingIntent,

    /// The processor does not report the intent as settling this order.
    #[error("payment has not succeeded")]
    PaymentNotSettled,

    /// The computed total does not fit in minor units.
    #[error("order total out of range")]
    AmountOutOfRange,

    /// Payment gateway failure.
    #[error("gateway error: {0}")]
    Gateway(#[from] StripeError),

    /// Database failure.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A submitted order: product references and quantities only. Prices and
/// totals come from the catalog, whatever the client displayed.
#[derive(Debug, Deserialize)]
pub struct SubmitOrder {
    pub items: Vec<SubmitOrderItem>,
    pub shipping_address: Address,
    pub payment_method: String,
}

/// One requested line.
#[derive(Debug, Deserialize)]
pub struct SubmitOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Result of a successful submission: the persisted order plus the opaque
/// client-usable payment handle.
#[derive(Debug)]
pub struct SubmittedOrder {
    pub order: Order,
    pub client_secret: Option<String>,
}

/// Counts from a reconciler sweep.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub settled: u32,
    pub voided: u32,
}

/// The order/payment workflow service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    products: ProductRepository<'a>,
    payments: &'a StripeClient,
    pricing: PricingRules,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, payments: &'a StripeClient, pricing: PricingRules) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            products: ProductRepository::new(pool),
            payments,
            pricing,
        }
    }

    /// Submit an order: validate, snapshot, price, persist, and reserve a
    /// payment intent.
    ///
    /// Stock is reserved with a conditional atomic decrement inside the
    /// same transaction that creates the order, so concurrent submissions
    /// against low stock cannot oversell. If the gateway call fails after
    /// the order was persisted, the order is voided (stock restored) and
    /// the gateway error surfaces to the caller.
    ///
    /// # Errors
    ///
    /// `EmptyOrder`/`ZeroQuantity` for malformed input,
    /// `ProductNotFound` for missing or unapproved products,
    /// `InsufficientStock` when a quantity exceeds stock,
    /// `Gateway` when the payment intent could not be created.
    pub async fn submit_order(
        &self,
        purchaser: &User,
        submission: SubmitOrder,
    ) -> Result<SubmittedOrder, OrderError> {
        if submission.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        if submission.items.iter().any(|item| item.quantity == 0) {
            return Err(OrderError::ZeroQuantity);
        }

        // Snapshot each line from the current catalog. Unapproved products
        // are not purchasable and are indistinguishable from absent ones.
        let mut snapshots = Vec::with_capacity(submission.items.len());
        for item in &submission.items {
            let product = self
                .products
                .get(item.product_id)
                .await?
                .filter(|p| p.is_approved)
                .ok_or(OrderError::ProductNotFound(item.product_id))?;

            if !product.has_stock(item.quantity) {
                return Err(OrderError::InsufficientStock(product.name));
            }

            snapshots.push(NewOrderItem {
                product_id: product.id,
                name: product.name,
                image: product.image,
                unit_price: product.price,
                quantity: item.quantity,
            });
        }

        let amounts: Vec<LineAmount> = snapshots
            .iter()
            .map(|s| LineAmount {
                unit_price: s.unit_price,
                quantity: s.quantity,
            })
            .collect();
        let totals = self.pricing.quote(&amounts);
        let amount_minor =
            to_minor_units(totals.total_price).ok_or(OrderError::AmountOutOfRange)?;

        let mut order = match self
            .orders
            .create_pending(
                purchaser.id,
                &snapshots,
                &submission.shipping_address,
                &submission.payment_method,
                totals,
            )
            .await?
        {
            CreatePending::Created(order) => order,
            CreatePending::OutOfStock(product_id) => {
                let name = snapshots
                    .iter()
                    .find(|s| s.product_id == product_id)
                    .map_or_else(|| product_id.to_string(), |s| s.name.clone());
                return Err(OrderError::InsufficientStock(name));
            }
        };

        let intent = match self.payments.create_intent(amount_minor, order.id).await {
            Ok(intent) => intent,
            Err(gateway_err) => {
                // Compensating cleanup: no order may sit pending without an
                // intent the reconciler could check.
                if let Err(void_err) = self.orders.void_unpaid(order.id).await {
                    tracing::error!(
                        order_id = %order.id,
                        error = %void_err,
                        "failed to void order after gateway failure"
                    );
                }
                return Err(OrderError::Gateway(gateway_err));
            }
        };

        self.orders.set_payment_intent(order.id, &intent.id).await?;
        order.payment_intent_id = Some(intent.id);

        tracing::info!(
            order_id = %order.id,
            total = %order.total_price,
            "order submitted, payment intent reserved"
        );

        Ok(SubmittedOrder {
            order,
            client_secret: intent.client_secret,
        })
    }

    /// Confirm payment for an order.
    ///
    /// Idempotent: confirming an already-paid order returns it unchanged.
    /// The intent is retrieved from the gateway and must report status
    /// `succeeded` with metadata naming this order; whatever the client
    /// posted alongside the request is ignored.
    ///
    /// # Errors
    ///
    /// `OrderNotFound` if the order is missing, `NotPurchaser` if the
    /// caller may not confirm it, `OrderVoided`/`MissingIntent`/
    /// `PaymentNotSettled` when the order cannot be settled.
    pub async fn confirm_payment(
        &self,
        caller: &User,
        order_id: OrderId,
    ) -> Result<Order, OrderError> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        if order.user_id != caller.id && !caller.role.is_admin() {
            return Err(OrderError::NotPurchaser);
        }

        match order.status {
            // Already settled: nothing to do, nothing changes.
            OrderStatus::Paid | OrderStatus::Delivered => return Ok(order),
            OrderStatus::Voided => return Err(OrderError::OrderVoided),
            OrderStatus::PendingPayment => {}
        }

        let intent_id = order
            .payment_intent_id
            .as_deref()
            .ok_or(OrderError::MissingIntent)?;

        let intent = self.payments.retrieve_intent(intent_id).await?;
        if !intent.settles(order.id) {
            return Err(OrderError::PaymentNotSettled);
        }

        let result = PaymentResult {
            id: intent.id,
            status: intent.status,
            update_time: Utc::now(),
            payer_email: intent.receipt_email,
        };

        // A concurrent confirmation may have won the guarded update; the
        // re-read below returns the settled order either way.
        let transitioned = self.orders.mark_paid(order.id, &result).await?;
        if transitioned {
            tracing::info!(order_id = %order.id, "order marked paid");
        }

        self.orders
            .get(order.id)
            .await?
            .ok_or(OrderError::OrderNotFound)
    }

    /// Sweep `pending_payment` orders created before `cutoff`: settle the
    /// ones whose intent succeeded, void the rest and restore their stock.
    ///
    /// Gateway errors on individual orders are logged and skipped; the
    /// order stays pending for the next sweep.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` via `OrderError` if the ledger cannot be
    /// read or written.
    pub async fn sweep_stale(&self, cutoff: DateTime<Utc>) -> Result<SweepOutcome, OrderError> {
        let stale = self.orders.list_stale_pending(cutoff).await?;
        let mut outcome = SweepOutcome::default();

        for order in stale {
            let settled = match order.payment_intent_id.as_deref() {
                Some(intent_id) => match self.payments.retrieve_intent(intent_id).await {
                    Ok(intent) if intent.settles(order.id) => {
                        let result = PaymentResult {
                            id: intent.id,
                            status: intent.status,
                            update_time: Utc::now(),
                            payer_email: intent.receipt_email,
                        };
                        self.orders.mark_paid(order.id, &result).await?
                    }
                    Ok(_) => false,
                    Err(e) => {
                        tracing::warn!(
                            order_id = %order.id,
                            error = %e,
                            "reconciler could not retrieve intent; skipping"
                        );
                        continue;
                    }
                },
                // An order that never got an intent cannot be paid.
                None => false,
            };

            if settled {
                outcome.settled += 1;
                tracing::info!(order_id = %order.id, "reconciler settled stale order");
            } else if self.orders.void_unpaid(order.id).await? {
                outcome.voided += 1;
                // A voided order must not remain payable; cancellation is
                // best-effort since the intent may already be canceled.
                if let Some(intent_id) = order.payment_intent_id.as_deref() {
                    if let Err(e) = self.payments.cancel_intent(intent_id).await {
                        tracing::warn!(
                            order_id = %order.id,
                            error = %e,
                            "could not cancel intent for voided order"
                        );
                    }
                }
                tracing::info!(order_id = %order.id, "reconciler voided stale order");
            }
        }

        Ok(outcome)
    }
}
