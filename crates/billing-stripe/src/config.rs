//! # Stripe Configuration
//!
//! Configuration management for Stripe integration.
//! All secrets are loaded from environment variables.

use billing_core::BillingError;
use std::env;

/// Default Stripe API endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Pinned Stripe API version
pub const DEFAULT_API_VERSION: &str = "2024-12-18.acacia";

/// Maximum age of a webhook signature timestamp, in seconds
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// Identifies the integration to Stripe in the `User-Agent` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub url: Option<String>,
}

impl AppInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// `name/version (url)` as it appears in the user agent
    pub fn user_agent_fragment(&self) -> String {
        match &self.url {
            Some(url) => format!("{}/{} ({})", self.name, self.version, url),
            None => format!("{}/{}", self.name, self.version),
        }
    }
}

/// Stripe API configuration
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_...)
    pub secret_key: String,

    /// Publishable key (pk_test_... or pk_live_...)
    pub publishable_key: String,

    /// Webhook signing secret (whsec_...)
    pub webhook_secret: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,

    /// Accepted webhook timestamp skew in seconds
    pub webhook_tolerance_secs: i64,

    /// Integration info sent with every request
    pub app_info: Option<AppInfo>,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_SECRET_KEY`
    /// - `STRIPE_PUBLISHABLE_KEY`
    /// - `STRIPE_WEBHOOK_SECRET`
    ///
    /// Optional:
    /// - `STRIPE_API_BASE` (defaults to the live API endpoint)
    pub fn from_env() -> Result<Self, BillingError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BillingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| BillingError::Configuration(format!("{} not set", key)))
        };

        let secret_key = require("STRIPE_SECRET_KEY")?;
        let publishable_key = require("STRIPE_PUBLISHABLE_KEY")?;
        let webhook_secret = require("STRIPE_WEBHOOK_SECRET")?;

        // Validate key formats
        if !secret_key.starts_with("sk_test_") && !secret_key.starts_with("sk_live_") {
            return Err(BillingError::Configuration(
                "STRIPE_SECRET_KEY must start with sk_test_ or sk_live_".to_string(),
            ));
        }

        if !publishable_key.starts_with("pk_test_") && !publishable_key.starts_with("pk_live_") {
            return Err(BillingError::Configuration(
                "STRIPE_PUBLISHABLE_KEY must start with pk_test_ or pk_live_".to_string(),
            ));
        }

        if !webhook_secret.starts_with("whsec_") {
            return Err(BillingError::Configuration(
                "STRIPE_WEBHOOK_SECRET must start with whsec_".to_string(),
            ));
        }

        let mut config = Self::new(secret_key, publishable_key, webhook_secret);
        if let Some(base) = lookup("STRIPE_API_BASE").filter(|v| !v.trim().is_empty()) {
            config = config.with_api_base_url(base);
        }

        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        secret_key: impl Into<String>,
        publishable_key: impl Into<String>,
        webhook_secret: impl Into<String>,
    ) -> Self {
        Self {
            secret_key: secret_key.into(),
            publishable_key: publishable_key.into(),
            webhook_secret: webhook_secret.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            webhook_tolerance_secs: DEFAULT_WEBHOOK_TOLERANCE_SECS,
            app_info: None,
        }
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// User agent sent to Stripe, including the app info when set
    pub fn user_agent(&self) -> String {
        let base = format!("billing-stripe/{}", env!("CARGO_PKG_VERSION"));
        match &self.app_info {
            Some(info) => format!("{} {}", base, info.user_agent_fragment()),
            None => base,
        }
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: attach integration info
    pub fn with_app_info(mut self, info: AppInfo) -> Self {
        self.app_info = Some(info);
        self
    }
}
