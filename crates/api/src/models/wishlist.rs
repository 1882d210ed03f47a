//! Wishlist models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use hearthside_core::{ProductId, WishlistItemId};

/// A saved product joined with its live summary data.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_slug: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub rating: Decimal,
    pub review_count: i32,
    pub primary_image: Option<String>,
    pub added_at: DateTime<Utc>,
}
