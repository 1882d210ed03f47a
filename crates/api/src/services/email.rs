//! Transactional mail client.
//!
//! Outbound mail is best-effort: callers log failures and carry on, since a
//! mail outage must never fail a registration or an order.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;

use crate::config::EmailConfig;

/// Errors from the mail provider.
#[derive(Debug, Error)]
pub enum EmailError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error response.
    #[error("mail provider error: {status} - {message}")]
    Api { status: u16, message: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutboundMail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: String,
}

/// HTTP client for the transactional mail provider.
#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    base_url: String,
    from_address: String,
}

impl Mailer {
    /// Create a mail client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::Http` if the HTTP client fails to build, or
    /// `Api` if the credential is not a valid header value.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value).map_err(|e| EmailError::Api {
                status: 0,
                message: format!("invalid API key format: {e}"),
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            from_address: config.from_address.clone(),
        })
    }

    /// Send the post-registration welcome mail.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the provider rejects the message.
    pub async fn send_welcome(&self, to: &str, first_name: &str) -> Result<(), EmailError> {
        let text = format!(
            "Hi {first_name},\n\n\
             Welcome to Hearthside. Your account is ready; your cart and \
             wishlist will follow you across devices whenever you sign in.\n\n\
             The Hearthside team"
        );
        self.send(to, "Welcome to Hearthside", text).await
    }

    /// Send the order confirmation mail.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the provider rejects the message.
    pub async fn send_order_confirmation(
        &self,
        to: &str,
        order_number: &str,
        total: &str,
    ) -> Result<(), EmailError> {
        let text = format!(
            "Thanks for your order!\n\n\
             Order number: {order_number}\n\
             Total: {total}\n\n\
             You can follow its progress at any time with the order number \
             above.\n\nThe Hearthside team"
        );
        self.send(to, &format!("Order confirmation {order_number}"), text)
            .await
    }

    async fn send(&self, to: &str, subject: &str, text: String) -> Result<(), EmailError> {
        let url = format!("{}/messages", self.base_url);
        let mail = OutboundMail {
            from: &self.from_address,
            to,
            subject,
            text,
        };

        let response = self.client.post(&url).json(&mail).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
