//! Checkout orchestration.
//!
//! Turns a submitted item list into an order, then deals with the world outside
//! the database: the hosted payment page for bank transfers and the
//! confirmation mail. The database work is a single transaction inside
//! `OrderRepository::create`; if the gateway call after the commit fails,
//! the order is compensated (cancelled and restocked) before the error
//! reaches the client.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use hearthside_core::{PaymentMethod, ProductId, validate_line_quantity};

use crate::db::{NewOrder, OrderRepository};
use crate::error::AppError;
use crate::models::{OrderWithItems, User};
use crate::services::email::Mailer;
use crate::services::payments::{CheckoutRequest, PaymentGateway};

/// One requested purchase line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Checkout request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    /// The lines to purchase. The client submits these explicitly; the
    /// server never infers them from the cart, so a partial checkout buys
    /// exactly what was asked for.
    pub items: Vec<OrderLine>,
    /// Snapshot of the shipping address, stored verbatim on the order.
    pub shipping_address: serde_json::Value,
    /// Defaults to the shipping address when omitted.
    pub billing_address: Option<serde_json::Value>,
    pub payment_method: PaymentMethod,
    pub shipping_method: String,
    pub notes: Option<String>,
}

/// A placed order, with the hosted payment page when one is needed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    #[serde(flatten)]
    pub order: OrderWithItems,
    /// Set for bank transfers; the client must redirect here to pay.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    orders: OrderRepository<'a>,
    gateway: Option<&'a dyn PaymentGateway>,
    mailer: Option<&'a Mailer>,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        gateway: Option<&'a dyn PaymentGateway>,
        mailer: Option<&'a Mailer>,
    ) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            gateway,
            mailer,
        }
    }

    /// Place an order for the submitted item lines.
    ///
    /// Stock is validated under row locks inside the order transaction, so
    /// a stale client view fails cleanly here rather than overselling. On
    /// success the user's cart is cleared by the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an empty item list, a bad
    /// quantity, or bad addresses; `InsufficientStock`/`NotFound` from
    /// stock validation; and `BadGateway` if the payment page could not be
    /// created (the order is cancelled and stock restored in that case).
    pub async fn checkout(&self, user: &User, request: PlaceOrder) -> Result<PlacedOrder, AppError> {
        validate_items(&request.items)?;
        validate_address(&request.shipping_address, "shippingAddress")?;
        if let Some(billing) = &request.billing_address {
            validate_address(billing, "billingAddress")?;
        }
        if request.shipping_method.trim().is_empty() {
            return Err(AppError::Validation(
                "shippingMethod must not be empty".to_owned(),
            ));
        }
        if request.payment_method.requires_redirect() && self.gateway.is_none() {
            return Err(AppError::Validation(
                "bank transfer payments are currently unavailable".to_owned(),
            ));
        }

        let items: Vec<_> = request
            .items
            .iter()
            .map(|line| (line.product_id, line.quantity))
            .collect();

        let billing_address = request
            .billing_address
            .unwrap_or_else(|| request.shipping_address.clone());

        let order = self
            .orders
            .create(&NewOrder {
                user_id: user.id,
                items,
                shipping_address: request.shipping_address,
                billing_address,
                payment_method: request.payment_method,
                shipping_method: request.shipping_method,
                notes: request.notes,
            })
            .await?;

        let payment_url = if request.payment_method.requires_redirect() {
            Some(self.payment_redirect(user, &order).await?)
        } else {
            None
        };

        if let Some(mailer) = self.mailer
            && let Err(err) = mailer
                .send_order_confirmation(
                    user.email.as_str(),
                    &order.order.order_number,
                    &order.order.total_amount.to_string(),
                )
                .await
        {
            tracing::warn!(
                order_number = %order.order.order_number,
                error = %err,
                "order confirmation mail failed"
            );
        }

        tracing::info!(
            order_number = %order.order.order_number,
            user_id = %user.id,
            total = %order.order.total_amount,
            "order placed"
        );

        Ok(PlacedOrder {
            order,
            payment_url,
        })
    }

    /// Ask the gateway for a hosted payment page; compensate on failure.
    async fn payment_redirect(
        &self,
        user: &User,
        order: &OrderWithItems,
    ) -> Result<String, AppError> {
        // Checked before the order was created.
        let Some(gateway) = self.gateway else {
            return Err(AppError::Internal("payment gateway vanished".to_owned()));
        };

        let request = CheckoutRequest {
            reference: order.order.order_number.clone(),
            amount: order.order.total_amount,
            currency: "USD",
            customer_email: user.email.as_str().to_owned(),
        };

        match gateway.create_checkout(&request).await {
            Ok(redirect) => {
                tracing::info!(
                    order_number = %order.order.order_number,
                    transaction_id = ?redirect.transaction_id,
                    "payment page created"
                );
                Ok(redirect.url)
            }
            Err(err) => {
                tracing::error!(
                    order_number = %order.order.order_number,
                    error = %err,
                    "payment page failed, cancelling order"
                );
                self.orders
                    .cancel_and_restock(order.order.id, &order.items)
                    .await?;
                Err(AppError::BadGateway(err.to_string()))
            }
        }
    }
}

fn validate_items(items: &[OrderLine]) -> Result<(), AppError> {
    if items.is_empty() {
        return Err(AppError::Validation("items must not be empty".to_owned()));
    }
    for line in items {
        validate_line_quantity(line.quantity).map_err(AppError::Validation)?;
    }
    Ok(())
}

fn validate_address(address: &serde_json::Value, field: &str) -> Result<(), AppError> {
    let obj = address
        .as_object()
        .ok_or_else(|| AppError::Validation(format!("{field} must be an object")))?;
    if obj.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_address_must_be_nonempty_object() {
        assert!(validate_address(&serde_json::json!({"street": "1 Elm"}), "a").is_ok());
        assert!(validate_address(&serde_json::json!({}), "a").is_err());
        assert!(validate_address(&serde_json::json!("1 Elm St"), "a").is_err());
        assert!(validate_address(&serde_json::Value::Null, "a").is_err());
    }

    #[test]
    fn test_place_order_parses_camel_case() {
        let body = serde_json::json!({
            "items": [{"productId": 42, "quantity": 2}],
            "shippingAddress": {"street": "1 Elm St", "city": "Ashford"},
            "paymentMethod": "bank_transfer",
            "shippingMethod": "standard",
            "notes": "leave at door"
        });
        let parsed: PlaceOrder = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.payment_method, PaymentMethod::BankTransfer);
        assert_eq!(parsed.shipping_method, "standard");
        assert!(parsed.billing_address.is_none());
        assert_eq!(parsed.notes.as_deref(), Some("leave at door"));
    }

    #[test]
    fn test_place_order_carries_submitted_lines() {
        // The purchase lines come from the body, never from the cart.
        let body = serde_json::json!({
            "items": [
                {"productId": 42, "quantity": 1},
                {"productId": 7, "quantity": 3},
            ],
            "shippingAddress": {"street": "1 Elm St"},
            "paymentMethod": "card",
            "shippingMethod": "express",
        });
        let parsed: PlaceOrder = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].product_id, ProductId::new(42));
        assert_eq!(parsed.items[1].quantity, 3);
    }

    #[test]
    fn test_place_order_requires_items() {
        let body = serde_json::json!({
            "shippingAddress": {"street": "1 Elm St"},
            "paymentMethod": "card",
            "shippingMethod": "standard",
        });
        assert!(serde_json::from_value::<PlaceOrder>(body).is_err());
    }

    #[test]
    fn test_items_must_be_nonempty_with_sane_quantities() {
        assert!(validate_items(&[]).is_err());
        assert!(
            validate_items(&[OrderLine {
                product_id: ProductId::new(1),
                quantity: 0,
            }])
            .is_err()
        );
        assert!(
            validate_items(&[OrderLine {
                product_id: ProductId::new(1),
                quantity: 2,
            }])
            .is_ok()
        );
    }
}
