//! Hosted-checkout payment gateway client.
//!
//! Bank-transfer orders are settled through an external hosted EFT page:
//! after the order commits, the API asks the gateway for a redirect URL and
//! hands it to the client. The gateway is behind a trait so handlers can be
//! exercised against a stub.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PaymentConfig;

/// Errors from the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway returned an error response.
    #[error("gateway error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Gateway response did not contain a redirect URL.
    #[error("gateway response missing redirect URL")]
    MissingRedirect,
}

/// What the gateway needs to host a checkout page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Merchant-side transaction reference; the order number.
    pub reference: String,
    /// Amount due, serialized as a decimal string.
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: &'static str,
    pub customer_email: String,
}

/// The hosted page the customer must be sent to.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRedirect {
    pub url: String,
    /// Gateway-side transaction id, logged for reconciliation.
    #[serde(default)]
    pub transaction_id: Option<String>,
}

/// A payment gateway that can host a checkout page for an order.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Request a hosted checkout page for the given order.
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutRedirect, GatewayError>;
}

/// HTTP client for the hosted-checkout gateway.
pub struct HostedCheckoutGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HostedCheckoutGateway {
    /// Create a gateway client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Http` if the HTTP client fails to build, or
    /// `Api` if the credential is not a valid header value.
    pub fn new(config: &PaymentConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value).map_err(|e| GatewayError::Api {
                status: 0,
                message: format!("invalid API key format: {e}"),
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }
}

#[async_trait]
impl PaymentGateway for HostedCheckoutGateway {
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutRedirect, GatewayError> {
        let url = format!("{}/checkout", self.base_url);

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let redirect: CheckoutRedirect = response.json().await?;
        if redirect.url.is_empty() {
            return Err(GatewayError::MissingRedirect);
        }

        Ok(redirect)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_checkout_request_serializes_amount_as_string() {
        let request = CheckoutRequest {
            reference: "HS-123456ABC".to_string(),
            amount: Decimal::from_str("129.60").unwrap(),
            currency: "USD",
            customer_email: "maya@example.com".to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["amount"], "129.60");
        assert_eq!(json["reference"], "HS-123456ABC");
        assert_eq!(json["customerEmail"], "maya@example.com");
    }

    #[test]
    fn test_redirect_tolerates_missing_transaction_id() {
        let redirect: CheckoutRedirect =
            serde_json::from_str(r#"{"url": "https://pay.example.com/s/abc"}"#).unwrap();
        assert_eq!(redirect.url, "https://pay.example.com/s/abc");
        assert!(redirect.transaction_id.is_none());
    }
}
