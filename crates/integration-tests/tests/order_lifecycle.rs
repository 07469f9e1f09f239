//! Order status machine and API response shapes.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use rust_decimal::Decimal;

use farmlink_core::{OrderId, OrderStatus, UserId};
use farmlink_server::models::{Address, Order, PaymentResult};

fn order(status: OrderStatus) -> Order {
    Order {
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
        status,
        payment_intent_id: Some("pi_lifecycle".to_string()),
        payment_result: None,
        is_paid: matches!(status, OrderStatus::Paid | OrderStatus::Delivered),
        paid_at: None,
        is_delivered: matches!(status, OrderStatus::Delivered),
        delivered_at: None,
        created_at: Utc::now(),
    }
}

#[test]
fn test_lifecycle_is_one_way() {
    // pending_payment is the only state with outgoing choices
    assert!(OrderStatus::PendingPayment.can_transition_to(OrderStatus::Paid));
    assert!(OrderStatus::PendingPayment.can_transition_to(OrderStatus::Voided));
    assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Delivered));

    // Nothing leaves a terminal or settled state backwards
    for from in [OrderStatus::Paid, OrderStatus::Delivered, OrderStatus::Voided] {
        assert!(!from.can_transition_to(OrderStatus::PendingPayment));
    }
    assert!(!OrderStatus::Voided.can_transition_to(OrderStatus::Paid));
    assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Voided));
}

#[test]
fn test_order_serializes_status_and_money_as_strings() {
    let json = serde_json::to_value(order(OrderStatus::PendingPayment)).unwrap();

    assert_eq!(json["status"], "pending_payment");
    // Decimals serialize as strings; clients never see binary floats
    assert_eq!(json["total_price"], "125.00");
    assert_eq!(json["is_paid"], false);
}

#[test]
fn test_payment_result_shape() {
    let result = PaymentResult {
        id: "pi_lifecycle".to_string(),
        status: "succeeded".to_string(),
        update_time: Utc::now(),
        payer_email: Some("ram@farmlink.local".to_string()),
    };

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["id"], "pi_lifecycle");
    assert_eq!(json["status"], "succeeded");
    assert_eq!(json["payer_email"], "ram@farmlink.local");
}

#[test]
fn test_totals_view_is_consistent() {
    let totals = order(OrderStatus::Paid).totals();
    assert_eq!(
        totals.total_price,
        totals.items_price + totals.shipping_price + totals.tax_price
    );
}
