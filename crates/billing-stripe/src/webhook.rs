//! # Stripe Webhook Handling
//!
//! Signature verification and typed event extraction for Stripe webhooks.
//!
//! The `Stripe-Signature` header looks like `t=1492774577,v1=5257a8...,v0=...`.
//! Each `v1` entry is a hex HMAC-SHA256 of `"{t}.{raw body}"` keyed with the
//! endpoint's signing secret. Only `v1` entries are considered.

use billing_core::{BillingError, BillingResult, WebhookEvent, WebhookEventType};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{debug, info};

type HmacSha256 = Hmac<Sha256>;

const ERR_NOT_SIGNED: &str = "webhook has no Stripe-Signature header";
const ERR_INVALID_HEADER: &str = "webhook has invalid Stripe-Signature header";
const ERR_NO_VALID_SIGNATURE: &str = "webhook had no valid signature";
const ERR_TOO_OLD: &str = "timestamp wasn't within tolerance";

// =============================================================================
// Signature Verification
// =============================================================================

#[derive(Debug)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_signature_header(header: &str) -> BillingResult<SignatureHeader> {
    if header.trim().is_empty() {
        return Err(BillingError::WebhookVerificationFailed(ERR_NOT_SIGNED.to_string()));
    }

    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            return Err(BillingError::WebhookVerificationFailed(
                ERR_INVALID_HEADER.to_string(),
            ));
        };
        match key {
            "t" => {
                let ts = value.parse::<i64>().map_err(|_| {
                    BillingError::WebhookVerificationFailed(ERR_INVALID_HEADER.to_string())
                })?;
                timestamp = Some(ts);
            }
            "v1" => {
                // Undecodable entries are skipped, another v1 may still match
                if let Ok(sig) = hex::decode(value) {
                    signatures.push(sig);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        BillingError::WebhookVerificationFailed(ERR_INVALID_HEADER.to_string())
    })?;

    if signatures.is_empty() {
        return Err(BillingError::WebhookVerificationFailed(
            ERR_NO_VALID_SIGNATURE.to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn signed_payload_mac(secret: &str, timestamp: i64, payload: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

/// Build a `Stripe-Signature` header value for `payload`.
///
/// Used by the Stripe CLI style test tooling and by tests that need
/// deliveries the verifier accepts.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mac = signed_payload_mac(secret, timestamp, payload);
    format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    )
}

/// Verifies webhook deliveries against an endpoint signing secret
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>, tolerance_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs,
        }
    }

    /// Check `header` against `payload` as of `now`.
    ///
    /// The timestamp is checked before any signature is compared, so a stale
    /// delivery reports the tolerance failure whatever it was signed with.
    pub fn verify_at(&self, payload: &[u8], header: &str, now: DateTime<Utc>) -> BillingResult<()> {
        let parsed = parse_signature_header(header)?;

        if now.timestamp() - parsed.timestamp > self.tolerance_secs {
            return Err(BillingError::WebhookVerificationFailed(ERR_TOO_OLD.to_string()));
        }

        let mac = signed_payload_mac(&self.secret, parsed.timestamp, payload);
        let valid = parsed
            .signatures
            .iter()
            .any(|sig| mac.clone().verify_slice(sig).is_ok());

        if !valid {
            return Err(BillingError::WebhookVerificationFailed(
                ERR_NO_VALID_SIGNATURE.to_string(),
            ));
        }

        Ok(())
    }

    /// Verify the delivery and parse the event envelope
    pub fn construct_event(&self, payload: &[u8], header: &str) -> BillingResult<WebhookEvent> {
        self.construct_event_at(payload, header, Utc::now())
    }

    pub fn construct_event_at(
        &self,
        payload: &[u8],
        header: &str,
        now: DateTime<Utc>,
    ) -> BillingResult<WebhookEvent> {
        self.verify_at(payload, header, now)?;

        let event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            BillingError::WebhookParseError(format!("failed to parse webhook body json: {}", e))
        })?;

        debug!("Verified Stripe webhook: id={}, type={}", event.id, event.event_type);

        Ok(WebhookEvent {
            event_id: event.id,
            event_type: WebhookEventType::from_provider(&event.event_type),
            object: event.data.object,
            timestamp: DateTime::from_timestamp(event.created, 0).unwrap_or(now),
        })
    }
}

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    created: i64,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Value,
}

// =============================================================================
// Event Payloads
// =============================================================================

/// Customer details collected by checkout
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
}

/// Parsed checkout.session.completed event data
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutCompletedData {
    pub customer_details: CustomerDetails,
    /// Total in minor units
    pub amount_total: i64,
    pub payment_status: String,
}

impl CheckoutCompletedData {
    /// Parse from a webhook event
    pub fn from_event(event: &WebhookEvent) -> BillingResult<Self> {
        serde_json::from_value(event.object.clone()).map_err(|e| {
            BillingError::WebhookParseError(format!(
                "unexpected {} payload: {}",
                event.event_type.as_str(),
                e
            ))
        })
    }

    /// Total in major units (e.g. dollars)
    pub fn amount(&self) -> f64 {
        self.amount_total as f64 / 100.0
    }

    /// Total formatted with two decimals
    pub fn display_amount(&self) -> String {
        format!("{:.2}", self.amount())
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Webhook event handler trait
///
/// Implement this trait to act on verified events.
#[allow(unused_variables)]
pub trait WebhookHandler: Send + Sync {
    /// Called when a checkout session is completed
    fn on_checkout_completed(&self, data: CheckoutCompletedData) -> BillingResult<()> {
        info!(
            customer = %data.customer_details.name,
            amount = %data.display_amount(),
            payment_status = %data.payment_status,
            "Checkout completed"
        );
        Ok(())
    }

    /// Called for every other event type. These are acknowledged, not acted on.
    fn on_ignored_event(&self, event: &WebhookEvent) -> BillingResult<()> {
        debug!("Ignoring webhook event: {}", event.event_type.as_str());
        Ok(())
    }
}

/// Default handler (just logs events)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a webhook event to the appropriate handler method
pub fn dispatch_webhook_event(
    handler: &dyn WebhookHandler,
    event: &WebhookEvent,
) -> BillingResult<()> {
    match &event.event_type {
        WebhookEventType::CheckoutSessionCompleted => {
            let data = CheckoutCompletedData::from_event(event)?;
            handler.on_checkout_completed(data)
        }
        WebhookEventType::Unknown(_) => handler.on_ignored_event(event),
    }
}
