//! Product catalog handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hearthside_core::CategoryId;

use crate::db::products::{NewProduct, ProductFilters, ProductRepository, ProductSort};
use crate::error::{AppError, Result};
use crate::middleware::AdminUser;
use crate::models::{Pagination, Product, ProductDetail, ProductListItem};
use crate::routes::{ApiResponse, ok};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 12;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub sort: ProductSort,
    pub category: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub products: Vec<ProductListItem>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,
    pub stock_quantity: i32,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

/// `GET /api/products`
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<ProductListResponse>>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    if let (Some(min), Some(max)) = (query.min_price, query.max_price)
        && min > max
    {
        return Err(AppError::Validation(
            "minPrice must not exceed maxPrice".to_owned(),
        ));
    }

    let filters = ProductFilters {
        category: query.category,
        search: query.search,
        featured: query.featured,
        min_price: query.min_price,
        max_price: query.max_price,
    };

    let repo = ProductRepository::new(state.pool());
    let (products, total) = repo
        .list(&filters, query.sort, limit, (page - 1) * limit)
        .await?;

    Ok(ok(ProductListResponse {
        products,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// `GET /api/products/{slug}`
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ProductDetail>>> {
    let detail = ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await
        .map_err(|e| AppError::from_repo(e, "Product"))?;
    Ok(ok(detail))
}

/// `POST /api/products` (admin)
pub async fn create(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Json(payload): Json<CreateProductPayload>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>)> {
    validate_create(&payload)?;

    let product = ProductRepository::new(state.pool())
        .create(&NewProduct {
            name: payload.name.trim().to_owned(),
            slug: payload.slug.trim().to_owned(),
            sku: payload.sku.trim().to_owned(),
            description: payload.description,
            price: payload.price,
            compare_at_price: payload.compare_at_price,
            stock_quantity: payload.stock_quantity,
            category_id: payload.category_id,
            brand: payload.brand,
            is_featured: payload.is_featured,
        })
        .await
        .map_err(|e| AppError::from_repo(e, "Product"))?;

    tracing::info!(product_id = %product.id, admin = %claims.email, "product created");
    Ok(super::created(product))
}

fn validate_create(payload: &CreateProductPayload) -> Result<()> {
    for (name, value) in [
        ("name", &payload.name),
        ("slug", &payload.slug),
        ("sku", &payload.sku),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{name} is required")));
        }
    }
    if payload.price <= Decimal::ZERO {
        return Err(AppError::Validation("price must be positive".to_owned()));
    }
    if payload.stock_quantity < 0 {
        return Err(AppError::Validation(
            "stockQuantity must not be negative".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn payload() -> CreateProductPayload {
        CreateProductPayload {
            name: "Cast Iron Skillet".to_string(),
            slug: "cast-iron-skillet".to_string(),
            sku: "HS-CI-10".to_string(),
            description: "Pre-seasoned, 10 inch.".to_string(),
            price: Decimal::from_str("34.50").unwrap_or_default(),
            compare_at_price: None,
            stock_quantity: 25,
            category_id: None,
            brand: None,
            is_featured: false,
        }
    }

    #[test]
    fn test_create_payload_accepted() {
        assert!(validate_create(&payload()).is_ok());
    }

    #[test]
    fn test_create_rejects_blank_sku() {
        let mut p = payload();
        p.sku = "   ".to_string();
        assert!(validate_create(&p).is_err());
    }

    #[test]
    fn test_create_rejects_nonpositive_price() {
        let mut p = payload();
        p.price = Decimal::ZERO;
        assert!(validate_create(&p).is_err());
    }

    #[test]
    fn test_create_rejects_negative_stock() {
        let mut p = payload();
        p.stock_quantity = -1;
        assert!(validate_create(&p).is_err());
    }
}
