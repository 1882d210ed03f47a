//! Seed the catalog from a YAML fixture.
//!
//! Categories and products are upserted by slug, so re-running the command
//! against the same fixture is safe.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use super::{CommandError, connect};

/// Fixture file shape.
#[derive(Debug, Deserialize)]
struct Catalog {
    #[serde(default)]
    categories: Vec<CategoryFixture>,
    #[serde(default)]
    products: Vec<ProductFixture>,
}

#[derive(Debug, Deserialize)]
struct CategoryFixture {
    name: String,
    slug: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    sort_order: i32,
    #[serde(default)]
    subcategories: Vec<CategoryFixture>,
}

#[derive(Debug, Deserialize)]
struct ProductFixture {
    name: String,
    slug: String,
    sku: String,
    description: String,
    price: Decimal,
    #[serde(default)]
    compare_at_price: Option<Decimal>,
    stock_quantity: i32,
    /// Category slug; must appear in `categories`.
    category: String,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    is_featured: bool,
    #[serde(default)]
    images: Vec<ImageFixture>,
}

#[derive(Debug, Deserialize)]
struct ImageFixture {
    url: String,
    #[serde(default)]
    alt_text: Option<String>,
    #[serde(default)]
    is_primary: bool,
}

/// Seed categories and products from a YAML fixture file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a product names
/// an unknown category, or a statement fails.
pub async fn catalog(file_path: &str) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(CommandError::Fixture(format!("file not found: {file_path}")));
    }

    info!(path = %file_path, "Loading catalog fixture");
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CommandError::Fixture(e.to_string()))?;
    let catalog: Catalog =
        serde_yaml::from_str(&content).map_err(|e| CommandError::Fixture(e.to_string()))?;

    let pool = connect().await?;

    for category in &catalog.categories {
        let parent_id = upsert_category(&pool, category, None).await?;
        for sub in &category.subcategories {
            upsert_category(&pool, sub, Some(parent_id)).await?;
        }
    }
    info!(count = catalog.categories.len(), "Categories seeded");

    for product in &catalog.products {
        upsert_product(&pool, product).await?;
    }
    info!(count = catalog.products.len(), "Products seeded");

    Ok(())
}

async fn upsert_category(
    pool: &PgPool,
    fixture: &CategoryFixture,
    parent_id: Option<i32>,
) -> Result<i32, CommandError> {
    let (id,): (i32,) = sqlx::query_as(
        r"
        INSERT INTO categories (name, slug, description, parent_id, sort_order)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (slug) DO UPDATE
        SET name = EXCLUDED.name,
            description = EXCLUDED.description,
            parent_id = EXCLUDED.parent_id,
            sort_order = EXCLUDED.sort_order
        RETURNING id
        ",
    )
    .bind(&fixture.name)
    .bind(&fixture.slug)
    .bind(&fixture.description)
    .bind(parent_id)
    .bind(fixture.sort_order)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn upsert_product(pool: &PgPool, fixture: &ProductFixture) -> Result<(), CommandError> {
    let category: Option<(i32,)> = sqlx::query_as("SELECT id FROM categories WHERE slug = $1")
        .bind(&fixture.category)
        .fetch_optional(pool)
        .await?;
    let (category_id,) = category.ok_or_else(|| {
        CommandError::Fixture(format!(
            "product {} names unknown category {}",
            fixture.slug, fixture.category
        ))
    })?;

    let (product_id,): (i32,) = sqlx::query_as(
        r"
        INSERT INTO products
            (name, slug, sku, description, price, compare_at_price,
             stock_quantity, category_id, brand, is_featured)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (slug) DO UPDATE
        SET name = EXCLUDED.name,
            sku = EXCLUDED.sku,
            description = EXCLUDED.description,
            price = EXCLUDED.price,
            compare_at_price = EXCLUDED.compare_at_price,
            stock_quantity = EXCLUDED.stock_quantity,
            category_id = EXCLUDED.category_id,
            brand = EXCLUDED.brand,
            is_featured = EXCLUDED.is_featured,
            updated_at = NOW()
        RETURNING id
        ",
    )
    .bind(&fixture.name)
    .bind(&fixture.slug)
    .bind(&fixture.sku)
    .bind(&fixture.description)
    .bind(fixture.price)
    .bind(fixture.compare_at_price)
    .bind(fixture.stock_quantity)
    .bind(category_id)
    .bind(&fixture.brand)
    .bind(fixture.is_featured)
    .fetch_one(pool)
    .await?;

    // Replace images wholesale; fixtures are the source of truth for them.
    sqlx::query("DELETE FROM product_images WHERE product_id = $1")
        .bind(product_id)
        .execute(pool)
        .await?;

    for (index, image) in fixture.images.iter().enumerate() {
        sqlx::query(
            r"
            INSERT INTO product_images (product_id, url, alt_text, sort_order, is_primary)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(product_id)
        .bind(&image.url)
        .bind(&image.alt_text)
        .bind(i32::try_from(index).unwrap_or(i32::MAX))
        .bind(image.is_primary)
        .execute(pool)
        .await?;
    }

    Ok(())
}
