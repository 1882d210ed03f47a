//! Cart and wishlist operations with stock checks.
//!
//! Repositories only move rows; every quantity rule lives here so the
//! handlers stay thin. A line may never exceed the per-line cap or the
//! live stock, counting what is already in the cart.

use sqlx::PgPool;

use hearthside_core::{
    CartItemId, MAX_LINE_QUANTITY, ProductId, UserId, pricing::validate_line_quantity,
};

use crate::db::{CartRepository, ProductRepository, RepositoryError, WishlistRepository};
use crate::error::AppError;
use crate::models::{CartView, LineVerdict, ValidatedLine, WishlistEntry};

/// Cart and wishlist service.
pub struct CartService<'a> {
    cart: CartRepository<'a>,
    wishlist: WishlistRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            cart: CartRepository::new(pool),
            wishlist: WishlistRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// The user's cart with derived totals.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn view(&self, user_id: UserId) -> Result<CartView, AppError> {
        let lines = self.cart.lines(user_id).await?;
        Ok(CartView::new(lines))
    }

    /// Add a product to the cart, merging with any existing line.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the merged quantity would exceed
    /// the per-line cap, `NotFound` if the product is missing or inactive,
    /// and `InsufficientStock` if stock cannot cover the merged quantity.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartView, AppError> {
        validate_line_quantity(quantity).map_err(AppError::Validation)?;

        let (product_id, stock) = self
            .products
            .get_active(product_id)
            .await
            .map_err(|e| AppError::from_repo(e, "Product"))?;

        let existing = self
            .cart
            .existing_quantity(user_id, product_id)
            .await?
            .unwrap_or(0);
        let merged = existing + quantity;

        if merged > MAX_LINE_QUANTITY {
            return Err(AppError::Validation(format!(
                "cannot have more than {MAX_LINE_QUANTITY} of one product in the cart"
            )));
        }
        if merged > stock {
            return Err(AppError::InsufficientStock { available: stock });
        }

        self.cart.upsert(user_id, product_id, quantity).await?;
        self.view(user_id).await
    }

    /// Overwrite a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an out-of-bounds quantity,
    /// `NotFound` if the line is not in this user's cart, and
    /// `InsufficientStock` if stock cannot cover the new quantity.
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        line_id: CartItemId,
        quantity: i32,
    ) -> Result<CartView, AppError> {
        validate_line_quantity(quantity).map_err(AppError::Validation)?;

        let (_, stock) = self
            .cart
            .line_product(user_id, line_id)
            .await
            .map_err(|e| AppError::from_repo(e, "Cart item"))?;

        if quantity > stock {
            return Err(AppError::InsufficientStock { available: stock });
        }

        self.cart
            .set_quantity(user_id, line_id, quantity)
            .await
            .map_err(|e| AppError::from_repo(e, "Cart item"))?;
        self.view(user_id).await
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the line is not in this user's cart.
    pub async fn remove(&self, user_id: UserId, line_id: CartItemId) -> Result<CartView, AppError> {
        self.cart
            .remove(user_id, line_id)
            .await
            .map_err(|e| AppError::from_repo(e, "Cart item"))?;
        self.view(user_id).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the statement fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), AppError> {
        self.cart.clear(user_id).await?;
        Ok(())
    }

    /// Re-validate every line against live stock before checkout.
    ///
    /// Returns the per-line verdicts; the cart is purchasable only if all
    /// verdicts are `Ok`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn validate(&self, user_id: UserId) -> Result<Vec<ValidatedLine>, AppError> {
        let lines = self.cart.lines(user_id).await?;

        let verdicts = lines
            .into_iter()
            .map(|line| {
                let status = if !line.is_active {
                    LineVerdict::Inactive
                } else if line.stock_quantity == 0 {
                    LineVerdict::OutOfStock
                } else if line.stock_quantity < line.quantity {
                    LineVerdict::Insufficient
                } else {
                    LineVerdict::Ok
                };

                ValidatedLine {
                    item_id: line.id,
                    product_id: line.product_id,
                    status,
                    requested_quantity: line.quantity,
                    available_stock: line.stock_quantity,
                    current_price: line.price,
                }
            })
            .collect();

        Ok(verdicts)
    }

    /// Move a cart line to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the line is not in this user's cart
    /// and `Conflict` if the product is already on the wishlist.
    pub async fn move_to_wishlist(
        &self,
        user_id: UserId,
        line_id: CartItemId,
    ) -> Result<(), AppError> {
        self.cart
            .move_to_wishlist(user_id, line_id)
            .await
            .map_err(|e| AppError::from_repo(e, "Cart item"))
    }

    /// The user's wishlist, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn wishlist(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, AppError> {
        let entries = self.wishlist.entries(user_id).await?;
        Ok(entries)
    }

    /// Save a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is missing or inactive
    /// and `Conflict` if it is already saved.
    pub async fn add_to_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), AppError> {
        let (product_id, _) = self
            .products
            .get_active(product_id)
            .await
            .map_err(|e| AppError::from_repo(e, "Product"))?;

        self.wishlist
            .add(user_id, product_id)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(msg) => AppError::Conflict(msg),
                other => AppError::Database(other),
            })?;
        Ok(())
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not saved.
    pub async fn remove_from_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), AppError> {
        self.wishlist
            .remove(user_id, product_id)
            .await
            .map_err(|e| AppError::from_repo(e, "Wishlist item"))
    }

    /// Empty the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the statement fails.
    pub async fn clear_wishlist(&self, user_id: UserId) -> Result<(), AppError> {
        self.wishlist.clear(user_id).await?;
        Ok(())
    }

    /// Move a wishlist entry into the cart with the requested quantity,
    /// merging with any existing line.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not on the wishlist
    /// or no longer active, `Validation` if the merged quantity exceeds
    /// the per-line cap, and `InsufficientStock` if stock cannot cover it.
    pub async fn move_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartView, AppError> {
        validate_line_quantity(quantity).map_err(AppError::Validation)?;

        let (product_id, stock) = self
            .products
            .get_active(product_id)
            .await
            .map_err(|e| AppError::from_repo(e, "Product"))?;

        let existing = self
            .cart
            .existing_quantity(user_id, product_id)
            .await?
            .unwrap_or(0);
        let merged = existing + quantity;

        if merged > MAX_LINE_QUANTITY {
            return Err(AppError::Validation(format!(
                "cannot have more than {MAX_LINE_QUANTITY} of one product in the cart"
            )));
        }
        if merged > stock {
            return Err(AppError::InsufficientStock { available: stock });
        }

        self.wishlist
            .move_to_cart(user_id, product_id, quantity)
            .await
            .map_err(|e| AppError::from_repo(e, "Wishlist item"))?;
        self.view(user_id).await
    }
}
