//! Product repository.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use hearthside_core::{CategoryId, ProductId};

use super::RepositoryError;
use crate::models::product::{Product, ProductDetail, ProductImage, ProductListItem};

/// Sort orders accepted by the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
    RatingDesc,
    #[default]
    Newest,
}

impl ProductSort {
    /// The ORDER BY clause for this sort. Static strings only; never
    /// interpolate user input here.
    const fn order_by(self) -> &'static str {
        match self {
            Self::PriceAsc => "p.price ASC",
            Self::PriceDesc => "p.price DESC",
            Self::NameAsc => "p.name ASC",
            Self::NameDesc => "p.name DESC",
            Self::RatingDesc => "p.rating DESC, p.review_count DESC",
            Self::Newest => "p.created_at DESC",
        }
    }
}

/// Filters for the product listing. All optional and combinable.
#[derive(Debug, Clone, Default)]
pub struct ProductFilters {
    /// Category slug; includes the category's direct subcategories.
    pub category: Option<String>,
    /// Case-insensitive substring on name, description, and brand.
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

/// Fields for creating a product (admin).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub description: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub category_id: Option<CategoryId>,
    pub brand: Option<String>,
    pub is_featured: bool,
}

const LIST_COLUMNS: &str = r"
    p.id, p.name, p.slug, p.sku, p.price, p.compare_at_price,
    p.stock_quantity, p.brand, p.is_featured, p.rating, p.review_count,
    c.name AS category_name, c.slug AS category_slug,
    pi.url AS primary_image, p.created_at
";

const LIST_JOINS: &str = r"
    FROM products p
    LEFT JOIN categories c ON p.category_id = c.id
    LEFT JOIN product_images pi ON p.id = pi.product_id AND pi.is_primary
";

/// Repository for catalog product operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products with filters, sort, and pagination.
    ///
    /// Returns the page of rows and the total row count for the filter set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filters: &ProductFilters,
        sort: ProductSort,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ProductListItem>, i64), RepositoryError> {
        // Count over products alone; the image/category joins are 1:0..1 but
        // carry no filter columns, so they would only risk duplicate rows.
        let mut count_query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM products p");
        push_filters(&mut count_query, filters);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT ");
        query.push(LIST_COLUMNS);
        query.push(LIST_JOINS);
        push_filters(&mut query, filters);
        query.push(" ORDER BY ");
        query.push(sort.order_by());
        query.push(" LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let rows = query
            .build_query_as::<ProductListItem>()
            .fetch_all(self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Get an active product by slug, with its ordered images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is missing or
    /// inactive.
    pub async fn get_by_slug(&self, slug: &str) -> Result<ProductDetail, RepositoryError> {
        let row: Option<Product> = sqlx::query_as(
            r"
            SELECT p.id, p.name, p.slug, p.sku, p.description, p.price,
                   p.compare_at_price, p.stock_quantity, p.category_id, p.brand,
                   p.is_active, p.is_featured, p.rating, p.review_count,
                   p.created_at, p.updated_at
            FROM products p
            WHERE p.slug = $1 AND p.is_active
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        let product = row.ok_or(RepositoryError::NotFound)?;

        let images: Vec<ProductImage> = sqlx::query_as(
            r"
            SELECT id, url, alt_text, sort_order, is_primary
            FROM product_images
            WHERE product_id = $1
            ORDER BY is_primary DESC, sort_order ASC
            ",
        )
        .bind(product.id)
        .fetch_all(self.pool)
        .await?;

        let category = match product.category_id {
            Some(category_id) => {
                sqlx::query_as::<_, (String, String)>(
                    "SELECT name, slug FROM categories WHERE id = $1",
                )
                .bind(category_id)
                .fetch_optional(self.pool)
                .await?
            }
            None => None,
        };
        let (category_name, category_slug) = category.map_or((None, None), |(name, slug)| {
            (Some(name), Some(slug))
        });

        Ok(ProductDetail {
            product,
            category_name,
            category_slug,
            images,
        })
    }

    /// Create a product (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug or SKU is taken.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        sqlx::query_as(
            r"
            INSERT INTO products
                (name, slug, sku, description, price, compare_at_price,
                 stock_quantity, category_id, brand, is_featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, name, slug, sku, description, price, compare_at_price,
                      stock_quantity, category_id, brand, is_active, is_featured,
                      rating, review_count, created_at, updated_at
            ",
        )
        .bind(&new.name)
        .bind(&new.slug)
        .bind(&new.sku)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.compare_at_price)
        .bind(new.stock_quantity)
        .bind(new.category_id)
        .bind(&new.brand)
        .bind(new.is_featured)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::or_conflict(e, "product slug or SKU already exists"))
    }

    /// Fetch a product's id and name for use in error messages and checks.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if missing or inactive.
    pub async fn get_active(
        &self,
        product_id: ProductId,
    ) -> Result<(ProductId, i32), RepositoryError> {
        let row: Option<(ProductId, i32)> = sqlx::query_as(
            "SELECT id, stock_quantity FROM products WHERE id = $1 AND is_active",
        )
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)
    }
}

/// Append the filter set as a WHERE clause. Active products only.
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &ProductFilters) {
    query.push(" WHERE p.is_active");

    if let Some(category) = &filters.category {
        query.push(
            r" AND p.category_id IN (
                SELECT id FROM categories
                WHERE slug = ",
        );
        query.push_bind(category.clone());
        query.push(" OR parent_id = (SELECT id FROM categories WHERE slug = ");
        query.push_bind(category.clone());
        query.push("))");
    }

    if let Some(search) = &filters.search {
        let pattern = format!("%{search}%");
        query.push(" AND (p.name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR p.description ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR p.brand ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }

    if filters.featured == Some(true) {
        query.push(" AND p.is_featured");
    }

    if let Some(min_price) = filters.min_price {
        query.push(" AND p.price >= ");
        query.push_bind(min_price);
    }

    if let Some(max_price) = filters.max_price {
        query.push(" AND p.price <= ");
        query.push_bind(max_price);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_by_clauses() {
        assert_eq!(ProductSort::PriceAsc.order_by(), "p.price ASC");
        assert_eq!(ProductSort::Newest.order_by(), "p.created_at DESC");
        assert_eq!(ProductSort::default(), ProductSort::Newest);
    }

    #[test]
    fn test_sort_deserializes_snake_case() {
        let sort: ProductSort = serde_json::from_str("\"price_desc\"").expect("valid sort");
        assert_eq!(sort, ProductSort::PriceDesc);
        assert!(serde_json::from_str::<ProductSort>("\"cheapest\"").is_err());
    }
}
