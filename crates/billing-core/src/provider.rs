//! # Billing Provider Trait
//!
//! The seam between the HTTP handlers and the payment processor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   BillingProvider (trait)                   │
//! │  ├── create_checkout_session()                              │
//! │  ├── retrieve_checkout_session()                            │
//! │  ├── create_portal_session()                                │
//! │  ├── construct_event()                                      │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                  ┌─────────┴─────────┐
//!                  │   StripeClient    │
//!                  │ (billing-stripe)  │
//!                  └───────────────────┘
//! ```

use crate::error::BillingResult;
use crate::event::WebhookEvent;
use crate::session::{CheckoutRequest, CheckoutSession, PortalSession};
use async_trait::async_trait;
use std::sync::Arc;

/// Operations the server needs from a payment processor.
///
/// Each method maps to exactly one provider API call (or, for
/// `construct_event`, a local signature check).
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Create a hosted checkout session.
    ///
    /// # Returns
    /// The created session; its `url` is where the customer is redirected.
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> BillingResult<CheckoutSession>;

    /// Fetch an existing checkout session by ID.
    async fn retrieve_checkout_session(&self, session_id: &str) -> BillingResult<CheckoutSession>;

    /// Create a billing portal session for a customer.
    ///
    /// # Arguments
    /// * `customer_id` - Provider customer reference
    /// * `return_url` - Where the portal sends the customer when they leave
    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> BillingResult<PortalSession>;

    /// Verify a webhook signature and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes
    /// * `signature` - Signature header from the request
    async fn construct_event(&self, payload: &[u8], signature: &str)
        -> BillingResult<WebhookEvent>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared provider (dynamic dispatch)
pub type BoxedBillingProvider = Arc<dyn BillingProvider>;
