//! Checkout pricing flow: catalog snapshot through gateway amount.
//!
//! Exercises the exact path `submit_order` takes from product prices to
//! the integer amount sent to the payment processor, without a database.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use farmlink_core::{LineAmount, OrderId, PricingRules, to_minor_units};
use farmlink_integration_tests::approved_product;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn test_two_items_at_fifty_pay_shipping() {
    // 2 x 50.00: subtotal lands exactly on the free-shipping threshold,
    // which is strictly-greater, so the flat fee still applies.
    let product = approved_product(dec("50.00"), 10);
    let totals = PricingRules::default().quote(&[LineAmount {
        unit_price: product.price,
        quantity: 2,
    }]);

    assert_eq!(totals.items_price, dec("100.00"));
    assert_eq!(totals.shipping_price, dec("10.00"));
    assert_eq!(totals.tax_price, dec("15.00"));
    assert_eq!(totals.total_price, dec("125.00"));
}

#[test]
fn test_gateway_amount_is_total_in_minor_units() {
    let totals = PricingRules::default().quote(&[
        LineAmount {
            unit_price: dec("50.01"),
            quantity: 2,
        },
        LineAmount {
            unit_price: dec("9.99"),
            quantity: 1,
        },
    ]);

    // 110.01 items, free shipping, 16.50 tax, 126.51 total
    assert_eq!(totals.shipping_price, Decimal::ZERO);
    assert_eq!(totals.total_price, dec("126.51"));
    assert_eq!(to_minor_units(totals.total_price), Some(12651));
}

#[test]
fn test_quote_is_deterministic_across_calls() {
    let lines = [
        LineAmount {
            unit_price: dec("33.33"),
            quantity: 3,
        },
        LineAmount {
            unit_price: dec("0.01"),
            quantity: 7,
        },
    ];
    let rules = PricingRules::default();
    assert_eq!(rules.quote(&lines), rules.quote(&lines));
}

#[test]
fn test_client_submitted_totals_are_not_part_of_the_request_model() {
    // A checkout request that smuggles its own totals still parses, and
    // the extra fields have nowhere to land: the server model carries
    // product references and quantities only.
    let product = approved_product(dec("50.00"), 10);
    let body = serde_json::json!({
        "items": [{"product_id": product.id, "quantity": 2}],
        "shipping_address": {
            "street": "12 Lazimpat Road",
            "city": "Kathmandu",
            "state": "Bagmati",
            "postal_code": "44600"
        },
        "payment_method": "stripe",
        "items_price": "1.00",
        "total_price": "1.00"
    });

    let submission: farmlink_server::services::orders::SubmitOrder =
        serde_json::from_value(body).unwrap();
    assert_eq!(submission.items.len(), 1);
    assert_eq!(submission.items[0].quantity, 2);
}

#[test]
fn test_stock_check_uses_requested_quantity() {
    let product = approved_product(dec("50.00"), 1);
    assert!(product.has_stock(1));
    assert!(!product.has_stock(2));
}

#[test]
fn test_intent_settlement_is_order_scoped() {
    use farmlink_server::services::payments::PaymentIntent;

    let order = OrderId::generate();
    let json = serde_json::json!({
        "id": "pi_flow_1",
        "client_secret": "pi_flow_1_secret",
        "status": "succeeded",
        "metadata": {"order_id": order.to_string()}
    });
    let intent: PaymentIntent = serde_json::from_value(json).unwrap();

    assert!(intent.settles(order));
    assert!(!intent.settles(OrderId::generate()));
}
