//! Cart and order pricing policy.
//!
//! Totals are derived, never persisted for carts: the subtotal is the sum of
//! `unit price x quantity` over all lines, shipping is waived at or above
//! [`FREE_SHIPPING_THRESHOLD`], and tax is a flat [`TAX_RATE`] on the
//! subtotal. Orders snapshot the same numbers at checkout.
//!
//! These are fixed storefront-wide constants, not per-product or per-region
//! rates.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Orders with a subtotal at or above this ship free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Flat shipping rate below the free-shipping threshold.
pub const STANDARD_SHIPPING_RATE: Decimal = Decimal::from_parts(999, 0, 0, false, 2);

/// Flat tax rate applied to the subtotal (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Maximum quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: i32 = 10;

/// Minimum quantity a single cart line may hold.
pub const MIN_LINE_QUANTITY: i32 = 1;

/// Derived money totals for a cart or an order being assembled.
///
/// All amounts carry two decimal places. Serialized as strings in JSON
/// (via `rust_decimal`'s `serde-with-str`), so `129.60` never drifts to
/// `129.59999…` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    /// Sum of `unit price x quantity` over all lines.
    pub subtotal: Decimal,
    /// Zero at or above the free-shipping threshold, flat rate below it.
    pub shipping_amount: Decimal,
    /// `subtotal x TAX_RATE`, rounded to two decimal places.
    pub tax_amount: Decimal,
    /// `subtotal + shipping + tax`.
    pub total_amount: Decimal,
}

impl CartTotals {
    /// Compute totals from `(unit price, quantity)` lines.
    ///
    /// Inactive or removed lines must be filtered out by the caller before
    /// totals are computed.
    pub fn compute<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (Decimal, i32)>,
    {
        let subtotal: Decimal = lines
            .into_iter()
            .map(|(unit_price, quantity)| unit_price * Decimal::from(quantity))
            .sum();

        Self::from_subtotal(subtotal)
    }

    /// Compute shipping, tax, and total for an already-summed subtotal.
    #[must_use]
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let subtotal = subtotal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let shipping_amount = if subtotal >= FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            STANDARD_SHIPPING_RATE
        };
        let tax_amount = (subtotal * TAX_RATE)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        Self {
            subtotal,
            shipping_amount,
            tax_amount,
            total_amount: subtotal + shipping_amount + tax_amount,
        }
    }

    /// Whether this cart qualifies for free shipping.
    #[must_use]
    pub fn eligible_for_free_shipping(&self) -> bool {
        self.subtotal >= FREE_SHIPPING_THRESHOLD
    }
}

/// Validate a requested cart line quantity against the allowed bounds.
///
/// # Errors
///
/// Returns a human-readable message suitable for a 400 response when the
/// quantity is outside `1..=10`.
pub fn validate_line_quantity(quantity: i32) -> Result<(), String> {
    if !(MIN_LINE_QUANTITY..=MAX_LINE_QUANTITY).contains(&quantity) {
        return Err(format!(
            "quantity must be between {MIN_LINE_QUANTITY} and {MAX_LINE_QUANTITY}"
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_constants() {
        assert_eq!(FREE_SHIPPING_THRESHOLD, dec("100"));
        assert_eq!(STANDARD_SHIPPING_RATE, dec("9.99"));
        assert_eq!(TAX_RATE, dec("0.08"));
    }

    #[test]
    fn test_free_shipping_at_threshold() {
        // price 60 x qty 2: subtotal 120 -> free shipping, 8% tax
        let totals = CartTotals::compute([(dec("60"), 2)]);
        assert_eq!(totals.subtotal, dec("120.00"));
        assert_eq!(totals.shipping_amount, Decimal::ZERO);
        assert_eq!(totals.tax_amount, dec("9.60"));
        assert_eq!(totals.total_amount, dec("129.60"));
        assert!(totals.eligible_for_free_shipping());
    }

    #[test]
    fn test_paid_shipping_below_threshold() {
        // price 40 x qty 1: subtotal 40 -> 9.99 shipping, 3.20 tax
        let totals = CartTotals::compute([(dec("40"), 1)]);
        assert_eq!(totals.subtotal, dec("40.00"));
        assert_eq!(totals.shipping_amount, dec("9.99"));
        assert_eq!(totals.tax_amount, dec("3.20"));
        assert_eq!(totals.total_amount, dec("53.19"));
        assert!(!totals.eligible_for_free_shipping());
    }

    #[test]
    fn test_exactly_at_threshold_ships_free() {
        let totals = CartTotals::from_subtotal(dec("100.00"));
        assert_eq!(totals.shipping_amount, Decimal::ZERO);

        let just_under = CartTotals::from_subtotal(dec("99.99"));
        assert_eq!(just_under.shipping_amount, dec("9.99"));
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let totals = CartTotals::compute([(dec("19.99"), 3), (dec("5.50"), 2)]);
        assert_eq!(totals.subtotal, dec("70.97"));
        assert_eq!(totals.tax_amount, dec("5.68")); // 5.6776 rounds to 5.68
    }

    #[test]
    fn test_empty_cart_totals() {
        let totals = CartTotals::compute(std::iter::empty());
        assert_eq!(totals.subtotal, Decimal::ZERO);
        // An empty cart still quotes the flat rate; callers reject empty
        // checkouts before totals matter.
        assert_eq!(totals.shipping_amount, dec("9.99"));
    }

    #[test]
    fn test_tax_rounds_to_two_places() {
        // 33.33 * 0.08 = 2.6664 -> 2.67
        let totals = CartTotals::from_subtotal(dec("33.33"));
        assert_eq!(totals.tax_amount, dec("2.67"));
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_line_quantity(1).is_ok());
        assert!(validate_line_quantity(10).is_ok());
        assert!(validate_line_quantity(0).is_err());
        assert!(validate_line_quantity(11).is_err());
        assert!(validate_line_quantity(-3).is_err());
    }
}
