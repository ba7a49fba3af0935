//! # billing-core
//!
//! Core types and traits for the subscription billing server.
//!
//! This crate provides:
//! - `BillingProvider` trait implemented by payment processors
//! - `CheckoutRequest`, `CheckoutSession` and `PortalSession` for hosted flows
//! - `CheckoutUrls` for building redirect URLs from the configured domain
//! - `WebhookEvent` for verified webhook deliveries
//! - `BillingError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use billing_core::{BillingProvider, CheckoutRequest, CheckoutUrls};
//!
//! let urls = CheckoutUrls::new("http://localhost:4242");
//! let request = CheckoutRequest::subscription("price_basic", &urls);
//!
//! let session = provider.create_checkout_session(&request).await?;
//!
//! // Redirect user to session.url
//! ```

pub mod error;
pub mod event;
pub mod provider;
pub mod session;

// Re-exports for convenience
pub use error::{BillingError, BillingResult};
pub use event::{WebhookEvent, WebhookEventType};
pub use provider::{BillingProvider, BoxedBillingProvider};
pub use session::{CheckoutRequest, CheckoutSession, CheckoutUrls, PortalSession};
