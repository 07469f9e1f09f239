//! Order-total calculation.
//!
//! Pure and deterministic: the same arithmetic runs on the client for
//! display, but the server recomputes it from the catalog and the server's
//! value is the only one that ever reaches the payment gateway. All money
//! is [`Decimal`]; binary floating point never touches a price.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Price and quantity of a single line, as snapshotted at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmount {
    /// Unit price in the display currency (e.g. NPR).
    pub unit_price: Decimal,
    /// Number of units ordered. Must be positive; the caller validates.
    pub quantity: u32,
}

/// The four derived totals for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub total_price: Decimal,
}

/// Tunable pricing rules.
///
/// Defaults match the storefront's observed behavior: 15% tax, a flat
/// 10.00 shipping fee waived once the item subtotal exceeds 100.00.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingRules {
    /// Tax rate applied to the item subtotal.
    pub tax_rate: Decimal,
    /// Flat shipping fee charged below the free-shipping threshold.
    pub shipping_flat_fee: Decimal,
    /// Shipping is free when `items_price` is strictly greater than this.
    pub free_shipping_over: Decimal,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(15, 2),
            shipping_flat_fee: Decimal::new(1000, 2),
            free_shipping_over: Decimal::new(10000, 2),
        }
    }
}

impl PricingRules {
    /// Compute the order totals for a sequence of line amounts.
    ///
    /// `items_price` is the exact sum of `unit_price * quantity`; the tax
    /// is rounded to two decimal places, midpoint away from zero.
    #[must_use]
    pub fn quote(&self, items: &[LineAmount]) -> OrderTotals {
        let items_price: Decimal = items
            .iter()
            .map(|line| line.unit_price * Decimal::from(line.quantity))
            .sum();

        let shipping_price = if items_price > self.free_shipping_over {
            Decimal::ZERO
        } else {
            self.shipping_flat_fee
        };

        let tax_price = (items_price * self.tax_rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        OrderTotals {
            items_price,
            shipping_price,
            tax_price,
            total_price: items_price + shipping_price + tax_price,
        }
    }
}

/// Convert a decimal amount to the smallest currency unit (e.g. paisa).
///
/// Rounds to the nearest minor unit, midpoint away from zero. Returns
/// `None` if the result does not fit in an `i64` (never the case for
/// catalog-derived totals).
#[must_use]
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn line(price: &str, qty: u32) -> LineAmount {
        LineAmount {
            unit_price: dec(price),
            quantity: qty,
        }
    }

    #[test]
    fn test_items_price_is_exact_sum() {
        let totals = PricingRules::default().quote(&[
            line("1.10", 3),
            line("0.20", 7),
            line("99.99", 2),
        ]);
        assert_eq!(totals.items_price, dec("204.68"));
    }

    #[test]
    fn test_no_binary_float_drift() {
        // 0.1 + 0.2 style inputs stay exact in decimal
        let totals = PricingRules::default().quote(&[line("0.10", 1), line("0.20", 1)]);
        assert_eq!(totals.items_price, dec("0.30"));
    }

    #[test]
    fn test_shipping_free_only_strictly_above_threshold() {
        let rules = PricingRules::default();
        // Exactly 100.00 still pays the flat fee
        let at = rules.quote(&[line("50.00", 2)]);
        assert_eq!(at.shipping_price, dec("10.00"));

        let above = rules.quote(&[line("50.01", 2)]);
        assert_eq!(above.shipping_price, Decimal::ZERO);

        let below = rules.quote(&[line("49.99", 2)]);
        assert_eq!(below.shipping_price, dec("10.00"));
    }

    #[test]
    fn test_tax_known_value() {
        let totals = PricingRules::default().quote(&[line("100.00", 1)]);
        assert_eq!(totals.tax_price, dec("15.00"));
    }

    #[test]
    fn test_tax_rounds_to_two_places() {
        // 33.33 * 0.15 = 4.9995 -> 5.00
        let totals = PricingRules::default().quote(&[line("33.33", 1)]);
        assert_eq!(totals.tax_price, dec("5.00"));
    }

    #[test]
    fn test_checkout_scenario() {
        // 2 x 50.00 -> items 100.00, shipping 10.00 (not strictly above
        // the threshold), tax 15.00, total 125.00
        let totals = PricingRules::default().quote(&[line("50.00", 2)]);
        assert_eq!(totals.items_price, dec("100.00"));
        assert_eq!(totals.shipping_price, dec("10.00"));
        assert_eq!(totals.tax_price, dec("15.00"));
        assert_eq!(totals.total_price, dec("125.00"));
    }

    #[test]
    fn test_total_is_sum_of_parts() {
        let totals = PricingRules::default().quote(&[line("12.34", 5), line("0.99", 3)]);
        assert_eq!(
            totals.total_price,
            totals.items_price + totals.shipping_price + totals.tax_price
        );
    }

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(dec("115.00")), Some(11500));
        assert_eq!(to_minor_units(dec("0.01")), Some(1));
        assert_eq!(to_minor_units(dec("0.005")), Some(1));
        assert_eq!(to_minor_units(Decimal::ZERO), Some(0));
    }
}
