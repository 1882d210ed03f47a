//! Cart repository.
//!
//! Lines are addressed by cart item id and scoped to their owner in every
//! statement; a line id belonging to another user behaves as absent.

use sqlx::PgPool;

use hearthside_core::{CartItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::CartLine;

const LINE_QUERY: &str = r"
    SELECT ci.id, ci.product_id,
           p.name AS product_name, p.slug AS product_slug, p.sku AS product_sku,
           p.price, p.compare_at_price, p.stock_quantity,
           ci.quantity, pi.url AS primary_image, p.is_active, ci.updated_at
    FROM cart_items ci
    JOIN products p ON ci.product_id = p.id
    LEFT JOIN product_images pi ON p.id = pi.product_id AND pi.is_primary
    WHERE ci.user_id = $1
    ORDER BY ci.updated_at DESC
";

/// Repository for cart line operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All of the user's lines joined with live product data.
    ///
    /// Lines pointing at deactivated products are included with
    /// `is_active = false` so the client can surface them; totals exclude
    /// them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as(LINE_QUERY)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// The quantity already in the user's cart for a product, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn existing_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<i32>, RepositoryError> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT quantity FROM cart_items WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(|r| r.0))
    }

    /// Insert a line or add to an existing one.
    ///
    /// Relies on the `(user_id, product_id)` unique constraint; the caller
    /// performs stock checks before calling.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn upsert(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity,
                          updated_at = NOW()
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// The product and stock behind one of the user's lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist for
    /// this user.
    pub async fn line_product(
        &self,
        user_id: UserId,
        line_id: CartItemId,
    ) -> Result<(ProductId, i32), RepositoryError> {
        let row: Option<(ProductId, i32)> = sqlx::query_as(
            r"
            SELECT ci.product_id, p.stock_quantity
            FROM cart_items ci
            JOIN products p ON ci.product_id = p.id
            WHERE ci.id = $1 AND ci.user_id = $2
            ",
        )
        .bind(line_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)
    }

    /// Overwrite a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist for
    /// this user.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        line_id: CartItemId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE cart_items
            SET quantity = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(line_id)
        .bind(user_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist for
    /// this user.
    pub async fn remove(&self, user_id: UserId, line_id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
            .bind(line_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete all of the user's lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Move a cart line to the wishlist: insert the wishlist entry and
    /// delete the line in one transaction, so both happen or neither does.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is absent and
    /// `RepositoryError::Conflict` if the product is already wishlisted.
    pub async fn move_to_wishlist(
        &self,
        user_id: UserId,
        line_id: CartItemId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(ProductId,)> = sqlx::query_as(
            "SELECT product_id FROM cart_items WHERE id = $1 AND user_id = $2",
        )
        .bind(line_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        let (product_id,) = row.ok_or(RepositoryError::NotFound)?;

        sqlx::query("INSERT INTO wishlist (user_id, product_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::or_conflict(e, "item already in wishlist"))?;

        sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
            .bind(line_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
