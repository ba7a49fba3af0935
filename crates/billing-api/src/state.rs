//! # Application State
//!
//! Shared state for the Axum application.
//! Built once at startup and never mutated afterwards.

use anyhow::Context;
use billing_core::{BillingError, BoxedBillingProvider, CheckoutUrls};
use billing_stripe::{AppInfo, LoggingWebhookHandler, StripeClient, StripeConfig, WebhookHandler};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Identifies this integration to Stripe on every API call
pub fn app_info() -> AppInfo {
    AppInfo::new("stripe-samples/checkout-single-subscription", "0.0.1")
        .with_url("https://github.com/stripe-samples/checkout-single-subscription")
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Base URL used for checkout and portal redirects
    pub domain: String,
    /// Directory of pre-built frontend files
    pub static_dir: PathBuf,
    /// Price exposed to the frontend as `basicPrice`
    pub basic_price_id: String,
    /// Price exposed to the frontend as `proPrice`
    pub pro_price_id: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, BillingError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup.
    ///
    /// `DOMAIN`, `STATIC_DIR`, `BASIC_PRICE_ID` and `PRO_PRICE_ID` are
    /// required; `HOST` and `PORT` default to `0.0.0.0:4242`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BillingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            optional(key).ok_or_else(|| BillingError::Configuration(format!("{} not set", key)))
        };

        let port = match optional("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                BillingError::Configuration(format!("PORT is not a valid port: {}", raw))
            })?,
            None => 4242,
        };

        Ok(Self {
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            domain: require("DOMAIN")?,
            static_dir: PathBuf::from(require("STATIC_DIR")?),
            basic_price_id: require("BASIC_PRICE_ID")?,
            pro_price_id: require("PRO_PRICE_ID")?,
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, BillingError> {
        format!("{}:{}", self.host, self.port).parse().map_err(|e| {
            BillingError::Configuration(format!(
                "Invalid socket address {}:{}: {}",
                self.host, self.port, e
            ))
        })
    }

    /// Path of the checkout success page
    pub fn success_page(&self) -> PathBuf {
        self.static_dir.join("success.html")
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment processor
    pub provider: BoxedBillingProvider,
    /// Receives verified webhook events
    pub webhook_handler: Arc<dyn WebhookHandler>,
    /// Redirect URLs derived from the domain
    pub urls: CheckoutUrls,
    /// Publishable (client-side) API key
    pub publishable_key: String,
    /// Application config
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new AppState backed by Stripe, configured from the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env().context("Failed to load server configuration")?;

        let stripe_config = StripeConfig::from_env()
            .context("Failed to load Stripe configuration")?
            .with_app_info(app_info());
        let publishable_key = stripe_config.publishable_key.clone();

        if stripe_config.is_test_mode() {
            tracing::info!("Stripe running in test mode");
        }

        let stripe = StripeClient::new(stripe_config).context("Failed to initialize Stripe")?;

        Ok(Self::with_provider(config, publishable_key, Arc::new(stripe)))
    }

    /// Create state around an explicit provider
    pub fn with_provider(
        config: AppConfig,
        publishable_key: impl Into<String>,
        provider: BoxedBillingProvider,
    ) -> Self {
        Self {
            provider,
            webhook_handler: Arc::new(LoggingWebhookHandler),
            urls: CheckoutUrls::new(&config.domain),
            publishable_key: publishable_key.into(),
            config: Arc::new(config),
        }
    }

    /// Builder: replace the webhook handler
    pub fn with_webhook_handler(mut self, handler: Arc<dyn WebhookHandler>) -> Self {
        self.webhook_handler = handler;
        self
    }
}
