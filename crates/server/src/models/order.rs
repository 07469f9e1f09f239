//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use farmlink_core::{OrderId, OrderItemId, OrderStatus, OrderTotals, ProductId, UserId};

use super::user::Address;

/// An order, with its line-item snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Purchaser.
    pub user_id: UserId,
    /// Snapshot of each ordered line. Later product edits never change
    /// historical orders.
    pub items: Vec<OrderItem>,
    /// Shipping address as submitted at checkout.
    pub shipping_address: Address,
    /// Payment method tag (e.g. "stripe").
    pub payment_method: String,
    /// Item subtotal, recomputed server-side from the catalog.
    pub items_price: Decimal,
    /// Shipping charge.
    pub shipping_price: Decimal,
    /// Tax charge.
    pub tax_price: Decimal,
    /// The amount the payment intent was created for.
    pub total_price: Decimal,
    /// Lifecycle state.
    pub status: OrderStatus,
    /// Stripe payment intent reserved for this order, if one was created.
    pub payment_intent_id: Option<String>,
    /// Processor result stored at confirmation time.
    pub payment_result: Option<PaymentResult>,
    /// Whether payment has been verified.
    pub is_paid: bool,
    /// When payment was first confirmed. Never overwritten.
    pub paid_at: Option<DateTime<Utc>>,
    /// Whether the order has been delivered.
    pub is_delivered: bool,
    /// When the order was delivered.
    pub delivered_at: Option<DateTime<Utc>>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// The derived totals, as an [`OrderTotals`] view.
    #[must_use]
    pub const fn totals(&self) -> OrderTotals {
        OrderTotals {
            items_price: self.items_price,
            shipping_price: self.shipping_price,
            tax_price: self.tax_price,
            total_price: self.total_price,
        }
    }
}

/// Snapshot of one ordered line: product identity, quantity, and the unit
/// price charged at submission time.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    /// Row ID.
    pub id: OrderItemId,
    /// The product this line was created from (not a live join).
    pub product_id: ProductId,
    /// Product name at submission time.
    pub name: String,
    /// Product image at submission time.
    pub image: String,
    /// Unit price charged.
    pub unit_price: Decimal,
    /// Units ordered.
    pub quantity: u32,
}

/// Payment processor result, stored once the server has verified the
/// intent with the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentResult {
    /// Processor transaction (payment intent) ID.
    pub id: String,
    /// Processor-reported status (e.g. "succeeded").
    pub status: String,
    /// When the processor reported the update.
    pub update_time: DateTime<Utc>,
    /// Payer email, if the processor supplied one.
    pub payer_email: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_view_matches_fields() {
        let order = Order {
            id: OrderId::generate(),
            user_id: UserId::generate(),
            items: vec![],
            shipping_address: Address {
                street: "12 Lazimpat Road".to_string(),
                city: "Kathmandu".to_string(),
                state: "Bagmati".to_string(),
                postal_code: "44600".to_string(),
            },
            payment_method: "stripe".to_string(),
            items_price: Decimal::new(10000, 2),
            shipping_price: Decimal::new(1000, 2),
            tax_price: Decimal::new(1500, 2),
            total_price: Decimal::new(12500, 2),
            status: OrderStatus::PendingPayment,
            payment_intent_id: Some("pi_123".to_string()),
            payment_result: None,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            created_at: Utc::now(),
        };

        let totals = order.totals();
        assert_eq!(
            totals.total_price,
            totals.items_price + totals.shipping_price + totals.tax_price
        );

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "pending_payment");
        assert_eq!(json["is_paid"], false);
    }
}
