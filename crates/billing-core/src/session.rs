//! # Session Types
//!
//! Checkout and billing-portal session types. All of these are owned by the
//! payment provider; the server only passes identifiers and URLs through.

use serde::{Deserialize, Serialize};

/// Parameters for a hosted subscription checkout with a single price line item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Provider price identifier
    pub price_id: String,
    pub quantity: u32,
    /// Where the provider sends the customer after paying
    pub success_url: String,
    /// Where the provider sends the customer if they back out
    pub cancel_url: String,
}

impl CheckoutRequest {
    /// Subscription checkout for one unit of `price_id`
    pub fn subscription(price_id: impl Into<String>, urls: &CheckoutUrls) -> Self {
        Self {
            price_id: price_id.into(),
            quantity: 1,
            success_url: urls.success_url(),
            cancel_url: urls.cancel_url(),
        }
    }
}

/// A checkout session as reported by the provider
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Provider's session ID
    pub id: String,

    /// Hosted checkout URL (absent once the session completes or expires)
    pub url: Option<String>,

    /// Customer reference (set once the customer exists)
    pub customer_id: Option<String>,

    /// Provider payment status (`paid`, `unpaid`, `no_payment_required`)
    pub payment_status: Option<String>,

    /// The provider's session object, untouched
    pub raw: serde_json::Value,
}

/// A billing portal session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSession {
    pub id: String,
    pub url: String,
    pub customer: String,
    #[serde(default)]
    pub return_url: Option<String>,
}

/// Redirect URLs handed to the provider for checkout flows
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Base URL of the application (e.g., "http://localhost:4242")
    pub base_url: String,
    /// Success page path
    pub success_path: String,
    /// Cancel page path
    pub cancel_path: String,
}

impl CheckoutUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            success_path: "/html/success.html".to_string(),
            cancel_path: "/canceled.html".to_string(),
        }
    }

    /// Success URL with the provider's session-id template variable
    pub fn success_url(&self) -> String {
        format!(
            "{}{}?session_id={{CHECKOUT_SESSION_ID}}",
            self.base_url, self.success_path
        )
    }

    pub fn cancel_url(&self) -> String {
        format!("{}{}", self.base_url, self.cancel_path)
    }

    /// Where the billing portal returns the customer
    pub fn portal_return_url(&self) -> String {
        self.base_url.clone()
    }
}
