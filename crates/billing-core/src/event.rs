//! # Webhook Events
//!
//! Provider-neutral envelope for verified webhook deliveries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Webhook event types the server acts on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// `checkout.session.completed`
    CheckoutSessionCompleted,
    /// Anything else; acknowledged and ignored
    Unknown(String),
}

impl WebhookEventType {
    pub fn from_provider(name: &str) -> Self {
        match name {
            "checkout.session.completed" => WebhookEventType::CheckoutSessionCompleted,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WebhookEventType::CheckoutSessionCompleted => "checkout.session.completed",
            WebhookEventType::Unknown(name) => name,
        }
    }
}

/// A verified webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from provider
    pub event_id: String,

    /// Event type
    pub event_type: WebhookEventType,

    /// The `data.object` payload, not yet interpreted
    pub object: serde_json::Value,

    /// When the provider created the event
    pub timestamp: DateTime<Utc>,
}
