//! Category tree handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::db::categories::{CategoryRef, CategoryRepository};
use crate::db::products::{ProductFilters, ProductRepository, ProductSort};
use crate::error::{AppError, Result};
use crate::models::{Breadcrumb, Category, CategoryWithCount, Pagination, ProductListItem};
use crate::routes::{ApiResponse, ok};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 12;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub sort: ProductSort,
}

/// Category detail with its subcategories and a page of its products
/// (direct subcategories included).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<Category>,
    pub products: Vec<ProductListItem>,
    pub pagination: Pagination,
}

/// `GET /api/categories`
pub async fn index(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryWithCount>>>> {
    let tree = CategoryRepository::new(state.pool()).list_tree().await?;
    Ok(ok(tree))
}

/// `GET /api/categories/{id_or_slug}`
pub async fn show(
    State(state): State<AppState>,
    Path(id_or_slug): Path<String>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<ApiResponse<CategoryResponse>>> {
    let category_ref = CategoryRef::parse(&id_or_slug);
    let (category, subcategories) = CategoryRepository::new(state.pool())
        .get(&category_ref)
        .await
        .map_err(|e| AppError::from_repo(e, "Category"))?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let filters = ProductFilters {
        category: Some(category.slug.clone()),
        ..ProductFilters::default()
    };
    let (products, total) = ProductRepository::new(state.pool())
        .list(&filters, query.sort, limit, (page - 1) * limit)
        .await?;

    Ok(ok(CategoryResponse {
        category,
        subcategories,
        products,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// `GET /api/categories/{id_or_slug}/breadcrumbs`
pub async fn breadcrumbs(
    State(state): State<AppState>,
    Path(id_or_slug): Path<String>,
) -> Result<Json<ApiResponse<Vec<Breadcrumb>>>> {
    let category_ref = CategoryRef::parse(&id_or_slug);
    let chain = CategoryRepository::new(state.pool())
        .breadcrumbs(&category_ref)
        .await
        .map_err(|e| AppError::from_repo(e, "Category"))?;
    Ok(ok(chain))
}
