//! Wishlist repository.

use sqlx::PgPool;

use hearthside_core::{ProductId, UserId, WishlistItemId};

use super::RepositoryError;
use crate::models::wishlist::WishlistEntry;

/// Repository for wishlist operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's wishlist joined with live product summaries, newest first.
    ///
    /// Entries for deactivated products are hidden rather than flagged; the
    /// entry row stays and resurfaces if the product is reactivated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn entries(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, RepositoryError> {
        let rows = sqlx::query_as(
            r"
            SELECT w.id, w.product_id,
                   p.name AS product_name, p.slug AS product_slug,
                   p.price, p.compare_at_price, p.stock_quantity,
                   p.rating, p.review_count,
                   pi.url AS primary_image, w.created_at AS added_at
            FROM wishlist w
            JOIN products p ON w.product_id = p.id
            LEFT JOIN product_images pi ON p.id = pi.product_id AND pi.is_primary
            WHERE w.user_id = $1 AND p.is_active
            ORDER BY w.created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Add a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is already saved.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistItemId, RepositoryError> {
        let row: (WishlistItemId,) = sqlx::query_as(
            "INSERT INTO wishlist (user_id, product_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::or_conflict(e, "item already in wishlist"))?;

        Ok(row.0)
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not saved.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM wishlist WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete all of the user's entries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM wishlist WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Whether a product is on the user's wishlist, and its entry id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn contains(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<WishlistItemId>, RepositoryError> {
        let row: Option<(WishlistItemId,)> = sqlx::query_as(
            "SELECT id FROM wishlist WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(|r| r.0))
    }

    /// Move a wishlist entry into the cart: cart upsert plus wishlist
    /// delete in one transaction.
    ///
    /// The caller performs the stock check first; this only moves rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not on the
    /// wishlist.
    pub async fn move_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM wishlist WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

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
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
