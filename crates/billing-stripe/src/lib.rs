//! # billing-stripe
//!
//! Stripe provider for the subscription billing server.
//!
//! `StripeClient` implements `billing_core::BillingProvider` over the Stripe
//! REST API:
//!
//! - **Checkout Sessions** - hosted subscription checkout for a single price
//! - **Billing Portal Sessions** - hosted subscription management
//! - **Webhooks** - `Stripe-Signature` verification and typed
//!   `checkout.session.completed` extraction
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use billing_core::{BillingProvider, CheckoutRequest, CheckoutUrls};
//! use billing_stripe::{StripeClient, StripeConfig};
//!
//! // Create client from environment
//! let stripe = StripeClient::new(StripeConfig::from_env()?)?;
//!
//! // Create checkout session
//! let urls = CheckoutUrls::new("http://localhost:4242");
//! let session = stripe
//!     .create_checkout_session(&CheckoutRequest::subscription("price_...", &urls))
//!     .await?;
//!
//! // Redirect user to session.url
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use billing_stripe::{dispatch_webhook_event, CheckoutCompletedData, WebhookHandler};
//!
//! struct MyHandler;
//!
//! impl WebhookHandler for MyHandler {
//!     fn on_checkout_completed(&self, data: CheckoutCompletedData) -> BillingResult<()> {
//!         println!("{} paid {}", data.customer_details.name, data.display_amount());
//!         Ok(())
//!     }
//! }
//!
//! // In your webhook endpoint:
//! let event = stripe.construct_event(payload, signature).await?;
//! dispatch_webhook_event(&MyHandler, &event)?;
//! ```

pub mod client;
pub mod config;
pub mod webhook;

// Re-exports
pub use client::StripeClient;
pub use config::{AppInfo, StripeConfig};
pub use webhook::{
    dispatch_webhook_event, signature_header, CheckoutCompletedData, CustomerDetails,
    LoggingWebhookHandler, WebhookHandler, WebhookVerifier,
};
