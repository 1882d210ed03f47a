//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::SecretString;
use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::email::{EmailError, Mailer};
use crate::services::payments::{GatewayError, HostedCheckoutGateway, PaymentGateway};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("payment gateway: {0}")]
    Gateway(#[from] GatewayError),
    #[error("mail provider: {0}")]
    Mail(#[from] EmailError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; the gateway and mailer are present only
/// when their configuration is set.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    gateway: Option<Box<dyn PaymentGateway>>,
    mailer: Option<Mailer>,
}

impl AppState {
    /// Create application state from configuration and a connection pool.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if a configured gateway or mail client cannot
    /// be constructed.
    pub fn new(config: ApiConfig, pool: PgPool) -> Result<Self, StateError> {
        let gateway: Option<Box<dyn PaymentGateway>> = match &config.payment {
            Some(payment) => Some(Box::new(HostedCheckoutGateway::new(payment)?)),
            None => {
                tracing::info!("payment gateway not configured, bank transfers disabled");
                None
            }
        };

        let mailer = match &config.email {
            Some(email) => Some(Mailer::new(email)?),
            None => {
                tracing::info!("mail provider not configured, outbound mail disabled");
                None
            }
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                gateway,
                mailer,
            }),
        })
    }

    /// Application configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Bearer token signing secret.
    #[must_use]
    pub fn jwt_secret(&self) -> &SecretString {
        &self.inner.config.jwt_secret
    }

    /// Payment gateway, when configured.
    #[must_use]
    pub fn gateway(&self) -> Option<&dyn PaymentGateway> {
        self.inner.gateway.as_deref()
    }

    /// Mail client, when configured.
    #[must_use]
    pub fn mailer(&self) -> Option<&Mailer> {
        self.inner.mailer.as_ref()
    }
}
