//! Cart models: lines joined with live product data, plus the derived summary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use hearthside_core::{CartItemId, CartTotals, FREE_SHIPPING_THRESHOLD, ProductId};

/// A cart line joined with the live product it points at.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_slug: String,
    pub product_sku: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub quantity: i32,
    pub primary_image: Option<String>,
    /// False when the product was deactivated after the line was added.
    /// Inactive lines are excluded from totals.
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl CartLine {
    /// Line total at the live price.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Derived cart summary. Never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub subtotal: Decimal,
    pub shipping_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    /// Sum of quantities over active lines.
    pub item_count: i64,
    pub free_shipping_threshold: Decimal,
    pub eligible_for_free_shipping: bool,
}

impl CartSummary {
    /// Compute the summary over the active lines of a cart.
    #[must_use]
    pub fn compute(lines: &[CartLine]) -> Self {
        let active = lines.iter().filter(|l| l.is_active);
        let totals = CartTotals::compute(active.clone().map(|l| (l.price, l.quantity)));
        let item_count = active.map(|l| i64::from(l.quantity)).sum();

        Self {
            subtotal: totals.subtotal,
            shipping_amount: totals.shipping_amount,
            tax_amount: totals.tax_amount,
            total_amount: totals.total_amount,
            item_count,
            free_shipping_threshold: FREE_SHIPPING_THRESHOLD,
            eligible_for_free_shipping: totals.eligible_for_free_shipping(),
        }
    }
}

/// The full cart response: lines plus summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub summary: CartSummary,
}

impl CartView {
    /// Assemble the view from joined cart lines.
    #[must_use]
    pub fn new(items: Vec<CartLine>) -> Self {
        let summary = CartSummary::compute(&items);
        Self { items, summary }
    }
}

/// Per-line verdict from cart re-validation before checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineVerdict {
    /// Line can be purchased as-is.
    Ok,
    /// Product has no stock at all.
    OutOfStock,
    /// Some stock, but less than the line quantity.
    Insufficient,
    /// Product was deactivated.
    Inactive,
}

/// Re-validation result for one cart line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedLine {
    pub item_id: CartItemId,
    pub product_id: ProductId,
    pub status: LineVerdict,
    pub requested_quantity: i32,
    pub available_stock: i32,
    pub current_price: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn line(price: &str, quantity: i32) -> CartLine {
        CartLine {
            id: CartItemId::new(1),
            product_id: ProductId::new(1),
            product_name: "Walnut Serving Board".to_string(),
            product_slug: "walnut-serving-board".to_string(),
            product_sku: "HS-WB-01".to_string(),
            price: Decimal::from_str(price).unwrap(),
            compare_at_price: None,
            stock_quantity: 10,
            quantity,
            primary_image: None,
            is_active: true,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_matches_pricing_policy() {
        let lines = vec![line("60", 2)];
        let summary = CartSummary::compute(&lines);
        assert_eq!(summary.subtotal, Decimal::from_str("120.00").unwrap());
        assert_eq!(summary.shipping_amount, Decimal::ZERO);
        assert_eq!(summary.tax_amount, Decimal::from_str("9.60").unwrap());
        assert_eq!(summary.total_amount, Decimal::from_str("129.60").unwrap());
        assert_eq!(summary.item_count, 2);
        assert!(summary.eligible_for_free_shipping);
    }

    #[test]
    fn test_inactive_lines_excluded_from_totals() {
        let lines = vec![line("40", 1), {
            let mut dead = line("500", 3);
            dead.is_active = false;
            dead
        }];
        let summary = CartSummary::compute(&lines);
        assert_eq!(summary.subtotal, Decimal::from_str("40.00").unwrap());
        assert_eq!(summary.shipping_amount, Decimal::from_str("9.99").unwrap());
        assert_eq!(summary.item_count, 1);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(
            line("19.99", 3).total_price(),
            Decimal::from_str("59.97").unwrap()
        );
    }
}
