//! Product catalog models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use hearthside_core::{CategoryId, ProductId, ProductImageId};

/// A full product row.
///
/// `stock_quantity >= 0` and `price > 0` are enforced by CHECK constraints;
/// the order flow treats this struct as read-only and decrements stock
/// through its own locked update.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub description: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub category_id: Option<CategoryId>,
    pub brand: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub rating: Decimal,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product image, ordered by `sort_order` with one primary per product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: ProductImageId,
    pub url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
    pub is_primary: bool,
}

/// A product row as it appears in listings: joined with its category name
/// and primary image.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductListItem {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub brand: Option<String>,
    pub is_featured: bool,
    pub rating: Decimal,
    pub review_count: i32,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub primary_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Full product detail: the product plus its ordered image list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub images: Vec<ProductImage>,
}
