//! Order repository: checkout transaction, history, tracking, and status.
//!
//! Checkout runs as one database transaction. Every product row is locked
//! with `SELECT … FOR UPDATE` before its stock is checked, so two
//! concurrent orders for the last unit serialize on the row lock and the
//! loser sees the decremented stock. On any failure the transaction rolls
//! back and neither the order, the stock, nor the cart has changed.

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use hearthside_core::{
    CartTotals, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId,
};

use super::RepositoryError;
use crate::models::order::{Order, OrderItem, OrderListItem, OrderTracking, OrderWithItems};

/// Attempts before giving up on an order-number collision.
///
/// The number embeds a millisecond timestamp and three random base-36
/// characters; two collisions in a row already means something is wrong.
const MAX_ORDER_NUMBER_ATTEMPTS: u32 = 5;

const ORDER_COLUMNS: &str = r"
    id, user_id, order_number, status, payment_status, payment_method,
    shipping_method, subtotal, tax_amount, shipping_amount, total_amount,
    shipping_address, billing_address, tracking_number, notes,
    created_at, updated_at
";

const ORDER_ITEM_COLUMNS: &str = r"
    id, product_id, product_name, product_sku, quantity, unit_price, total_price
";

/// Checkout parameters, already validated at the handler boundary.
#[derive(Debug)]
pub struct NewOrder {
    pub user_id: UserId,
    /// The client-submitted item list; stock is re-validated here, never
    /// trusted from the client.
    pub items: Vec<(ProductId, i32)>,
    pub shipping_address: serde_json::Value,
    pub billing_address: serde_json::Value,
    pub payment_method: PaymentMethod,
    pub shipping_method: String,
    pub notes: Option<String>,
}

/// Failures specific to the checkout transaction.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A requested product is missing or inactive.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// A requested quantity exceeds live stock.
    #[error("insufficient stock for {name}: {available} available")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        available: i32,
    },

    /// Could not find a free order number within the retry budget.
    #[error("order number collision persisted across {MAX_ORDER_NUMBER_ATTEMPTS} attempts")]
    OrderNumberExhausted,

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Locked product fields read inside the checkout transaction.
#[derive(sqlx::FromRow)]
struct LockedProduct {
    id: ProductId,
    name: String,
    sku: String,
    price: Decimal,
    stock_quantity: i32,
}

/// Repository for order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Run the checkout transaction.
    ///
    /// Locks and validates every product, snapshots line items, computes
    /// totals via the shared pricing policy, inserts the order, decrements
    /// stock, and clears the user's cart. Commits only if every step
    /// succeeds. Retries with a fresh order number on a number collision.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::ProductNotFound` or `InsufficientStock` on
    /// validation failure; nothing is persisted in that case.
    pub async fn create(&self, new: &NewOrder) -> Result<OrderWithItems, CheckoutError> {
        for _ in 0..MAX_ORDER_NUMBER_ATTEMPTS {
            let order_number = generate_order_number();
            match self.try_create(new, &order_number).await {
                Err(CheckoutError::Repository(RepositoryError::Conflict(_))) => {
                    tracing::warn!(order_number, "order number collision, regenerating");
                }
                other => return other,
            }
        }
        Err(CheckoutError::OrderNumberExhausted)
    }

    /// One attempt at the checkout transaction with a fixed order number.
    async fn try_create(
        &self,
        new: &NewOrder,
        order_number: &str,
    ) -> Result<OrderWithItems, CheckoutError> {
        let mut tx = self.pool.begin().await?;

        // Lock and validate each product, snapshotting the purchase lines.
        let mut snapshots = Vec::with_capacity(new.items.len());
        for &(product_id, quantity) in &new.items {
            let product: Option<LockedProduct> = sqlx::query_as(
                r"
                SELECT id, name, sku, price, stock_quantity
                FROM products
                WHERE id = $1 AND is_active
                FOR UPDATE
                ",
            )
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;

            let product = product.ok_or(CheckoutError::ProductNotFound(product_id))?;
            if product.stock_quantity < quantity {
                return Err(CheckoutError::InsufficientStock {
                    product_id,
                    name: product.name,
                    available: product.stock_quantity,
                });
            }
            snapshots.push((product, quantity));
        }

        let totals = CartTotals::compute(
            snapshots.iter().map(|(p, quantity)| (p.price, *quantity)),
        );

        let order: Order = sqlx::query_as(&format!(
            r"
            INSERT INTO orders
                (user_id, order_number, status, payment_status, payment_method,
                 shipping_method, subtotal, tax_amount, shipping_amount,
                 total_amount, shipping_address, billing_address, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(new.user_id)
        .bind(order_number)
        .bind(OrderStatus::Pending)
        .bind(PaymentStatus::Pending)
        .bind(new.payment_method)
        .bind(&new.shipping_method)
        .bind(totals.subtotal)
        .bind(totals.tax_amount)
        .bind(totals.shipping_amount)
        .bind(totals.total_amount)
        .bind(&new.shipping_address)
        .bind(&new.billing_address)
        .bind(&new.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            CheckoutError::Repository(RepositoryError::or_conflict(e, "order number taken"))
        })?;

        let mut items = Vec::with_capacity(snapshots.len());
        for (product, quantity) in &snapshots {
            let line_total = product.price * Decimal::from(*quantity);
            let item: OrderItem = sqlx::query_as(&format!(
                r"
                INSERT INTO order_items
                    (order_id, product_id, product_name, product_sku,
                     quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING {ORDER_ITEM_COLUMNS}
                "
            ))
            .bind(order.id)
            .bind(product.id)
            .bind(&product.name)
            .bind(&product.sku)
            .bind(quantity)
            .bind(product.price)
            .bind(line_total)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);

            sqlx::query(
                "UPDATE products SET stock_quantity = stock_quantity - $1 WHERE id = $2",
            )
            .bind(quantity)
            .bind(product.id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(new.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(OrderWithItems { order, items })
    }

    /// Compensate a committed order whose payment redirect failed: mark it
    /// cancelled with a failed payment and restore the decremented stock,
    /// in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn cancel_and_restock(
        &self,
        order_id: OrderId,
        items: &[OrderItem],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            UPDATE orders
            SET status = $2, payment_status = $3, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(order_id)
        .bind(OrderStatus::Cancelled)
        .bind(PaymentStatus::Failed)
        .execute(&mut *tx)
        .await?;

        for item in items {
            if let Some(product_id) = item.product_id {
                sqlx::query(
                    "UPDATE products SET stock_quantity = stock_quantity + $1 WHERE id = $2",
                )
                .bind(item.quantity)
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// The user's orders newest-first with item counts, plus the total
    /// order count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<OrderListItem>, i64), RepositoryError> {
        let rows: Vec<OrderListItem> = sqlx::query_as(
            r"
            SELECT o.id, o.order_number, o.status, o.payment_status,
                   o.subtotal, o.tax_amount, o.shipping_amount, o.total_amount,
                   COUNT(oi.id) AS item_count, o.created_at
            FROM orders o
            LEFT JOIN order_items oi ON o.id = oi.order_id
            WHERE o.user_id = $1
            GROUP BY o.id
            ORDER BY o.created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        Ok((rows, total))
    }

    /// An order with its items, scoped to the owning user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` unless the order exists and is
    /// owned by this user.
    pub async fn get(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<OrderWithItems, RepositoryError> {
        let order: Option<Order> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let order = order.ok_or(RepositoryError::NotFound)?;
        let items = self.items(order.id).await?;
        Ok(OrderWithItems { order, items })
    }

    /// Public tracking projection by order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such order exists.
    pub async fn track(&self, order_number: &str) -> Result<OrderTracking, RepositoryError> {
        let row: Option<OrderTracking> = sqlx::query_as(
            r"
            SELECT order_number, status, payment_status, tracking_number,
                   total_amount, created_at, updated_at
            FROM orders
            WHERE order_number = $1
            ",
        )
        .bind(order_number)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)
    }

    /// Current fulfillment status of an order, unscoped (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn status(&self, order_id: OrderId) -> Result<OrderStatus, RepositoryError> {
        let row: Option<(OrderStatus,)> =
            sqlx::query_as("SELECT status FROM orders WHERE id = $1")
                .bind(order_id)
                .fetch_optional(self.pool)
                .await?;

        row.map(|r| r.0).ok_or(RepositoryError::NotFound)
    }

    /// Patch status and tracking number (admin).
    ///
    /// A delivered order with a non-redirect payment method is marked paid;
    /// redirect payments settle through the gateway notification instead.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        tracking_number: Option<&str>,
    ) -> Result<Order, RepositoryError> {
        let order: Option<Order> = sqlx::query_as(&format!(
            r"
            UPDATE orders
            SET status = $2,
                tracking_number = COALESCE($3, tracking_number),
                payment_status = CASE
                    WHEN $2 = $4 AND payment_method <> $5 THEN $6
                    ELSE payment_status
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(order_id)
        .bind(status)
        .bind(tracking_number)
        .bind(OrderStatus::Delivered)
        .bind(PaymentMethod::BankTransfer)
        .bind(PaymentStatus::Paid)
        .fetch_optional(self.pool)
        .await?;

        order.ok_or(RepositoryError::NotFound)
    }

    async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as(&format!(
            r"
            SELECT {ORDER_ITEM_COLUMNS}
            FROM order_items
            WHERE order_id = $1
            ORDER BY id ASC
            "
        ))
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }
}

/// Generate a human-readable order number: `HS-` plus the last six digits
/// of the millisecond timestamp and three random base-36 characters.
///
/// Collisions are possible; the caller retries on the unique constraint.
fn generate_order_number() -> String {
    const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    let millis = Utc::now().timestamp_millis();
    let mut rng = rand::rng();
    let token: String = (0..3)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect();

    format!("HS-{:06}{token}", millis.rem_euclid(1_000_000))
}
