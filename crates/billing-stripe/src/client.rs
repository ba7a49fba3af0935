//! # Stripe Client
//!
//! `BillingProvider` implementation over the Stripe REST API:
//! Checkout Sessions, Billing Portal Sessions and webhook verification.

use crate::config::StripeConfig;
use crate::webhook::WebhookVerifier;
use async_trait::async_trait;
use billing_core::{
    BillingError, BillingProvider, BillingResult, CheckoutRequest, CheckoutSession,
    PortalSession, WebhookEvent,
};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

const PROVIDER: &str = "stripe";

/// Stripe API client
///
/// Uses Stripe's hosted checkout and billing portal pages.
pub struct StripeClient {
    config: StripeConfig,
    client: Client,
    verifier: WebhookVerifier,
}

impl StripeClient {
    /// Create a new Stripe client
    pub fn new(config: StripeConfig) -> BillingResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| {
                BillingError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        let verifier =
            WebhookVerifier::new(config.webhook_secret.clone(), config.webhook_tolerance_secs);

        Ok(Self {
            config,
            client,
            verifier,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> BillingResult<Url> {
        let mut url = Url::parse(&self.config.api_base_url).map_err(|e| {
            BillingError::Configuration(format!(
                "Invalid Stripe API base URL {}: {}",
                self.config.api_base_url, e
            ))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                BillingError::Configuration(format!(
                    "Stripe API base URL cannot be a base: {}",
                    self.config.api_base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
    }

    /// Send a request and decode the JSON body, mapping Stripe error bodies
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> BillingResult<T> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| BillingError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BillingError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);
            return Err(provider_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            BillingError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

#[async_trait]
impl BillingProvider for StripeClient {
    #[instrument(skip(self, request), fields(price_id = %request.price_id))]
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> BillingResult<CheckoutSession> {
        if request.price_id.trim().is_empty() {
            return Err(BillingError::InvalidRequest("Missing price ID".to_string()));
        }

        debug!(
            "Creating Stripe checkout session: quantity={}",
            request.quantity
        );

        let form_params: Vec<(&str, String)> = vec![
            ("mode", "subscription".to_string()),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
            ("line_items[0][price]", request.price_id.clone()),
            ("line_items[0][quantity]", request.quantity.to_string()),
        ];

        let url = self.endpoint(&["v1", "checkout", "sessions"])?;
        let raw: serde_json::Value = self
            .send(
                self.client
                    .post(url)
                    .header("Idempotency-Key", Uuid::new_v4().to_string())
                    .form(&form_params),
            )
            .await?;

        let session = session_from_raw(raw)?;
        info!(
            "Created Stripe checkout session: id={}, url={:?}",
            session.id, session.url
        );

        Ok(session)
    }

    #[instrument(skip(self))]
    async fn retrieve_checkout_session(&self, session_id: &str) -> BillingResult<CheckoutSession> {
        if session_id.trim().is_empty() {
            return Err(BillingError::InvalidRequest("Missing session ID".to_string()));
        }

        let url = self.endpoint(&["v1", "checkout", "sessions", session_id])?;
        let raw: serde_json::Value = self.send(self.client.get(url)).await?;

        session_from_raw(raw)
    }

    #[instrument(skip(self, return_url))]
    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> BillingResult<PortalSession> {
        let form_params = [("customer", customer_id), ("return_url", return_url)];

        let url = self.endpoint(&["v1", "billing_portal", "sessions"])?;
        let session: PortalSession = self
            .send(self.client.post(url).form(&form_params))
            .await?;

        info!("Created Stripe billing portal session: id={}", session.id);

        Ok(session)
    }

    async fn construct_event(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> BillingResult<WebhookEvent> {
        self.verifier.construct_event(payload, signature)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

/// The fields the server reads from a Checkout Session object
#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionFields {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    customer: Option<StripeExpandable>,
    #[serde(default)]
    payment_status: Option<String>,
}

/// A reference that is either an ID or the expanded object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StripeExpandable {
    Id(String),
    Object { id: String },
}

impl StripeExpandable {
    fn into_id(self) -> String {
        match self {
            StripeExpandable::Id(id) => id,
            StripeExpandable::Object { id } => id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

fn session_from_raw(raw: serde_json::Value) -> BillingResult<CheckoutSession> {
    let fields: StripeCheckoutSessionFields =
        serde_json::from_value(raw.clone()).map_err(|e| {
            BillingError::Serialization(format!("Failed to parse Stripe checkout session: {}", e))
        })?;

    Ok(CheckoutSession {
        id: fields.id,
        url: fields.url,
        customer_id: fields.customer.map(StripeExpandable::into_id),
        payment_status: fields.payment_status,
        raw,
    })
}

fn provider_error(status: reqwest::StatusCode, body: &str) -> BillingError {
    let message = serde_json::from_str::<StripeErrorResponse>(body)
        .ok()
        .and_then(|r| r.error.message.or(r.error.code))
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body));

    BillingError::ProviderError {
        provider: PROVIDER.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billing_core::{CheckoutUrls, WebhookEventType};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> StripeClient {
        let config = StripeConfig::new("sk_test_abc123", "pk_test_xyz789", "whsec_secret")
            .with_api_base_url(server.uri());
        StripeClient::new(config).unwrap()
    }

    fn checkout_request() -> CheckoutRequest {
        CheckoutRequest::subscription("price_basic", &CheckoutUrls::new("http://localhost:4242"))
    }

    #[tokio::test]
    async fn test_create_checkout_session() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("Authorization", "Bearer sk_test_abc123"))
            .and(header_exists("Idempotency-Key"))
            .and(body_string_contains("mode=subscription"))
            .and(body_string_contains("line_items%5B0%5D%5Bprice%5D=price_basic"))
            .and(body_string_contains("line_items%5B0%5D%5Bquantity%5D=1"))
            .and(body_string_contains("canceled.html"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_123",
                "object": "checkout.session",
                "url": "https://checkout.stripe.com/c/pay/cs_test_123",
                "customer": null,
                "payment_status": "unpaid"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = client_for(&server)
            .create_checkout_session(&checkout_request())
            .await
            .unwrap();

        assert_eq!(session.id, "cs_test_123");
        assert_eq!(
            session.url.as_deref(),
            Some("https://checkout.stripe.com/c/pay/cs_test_123")
        );
        assert!(session.customer_id.is_none());
    }

    #[tokio::test]
    async fn test_create_checkout_session_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "type": "invalid_request_error",
                    "code": "resource_missing",
                    "message": "No such price: 'price_basic'"
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_checkout_session(&checkout_request())
            .await
            .unwrap_err();

        assert_eq!(err.client_message(), "No such price: 'price_basic'");
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_test_123"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .retrieve_checkout_session("cs_test_123")
            .await
            .unwrap_err();

        match err {
            BillingError::ProviderError { message, .. } => {
                assert!(message.starts_with("HTTP 502"));
                assert!(message.ends_with("bad gateway"));
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_price_rejected_locally() {
        let server = MockServer::start().await;
        let mut request = checkout_request();
        request.price_id = "  ".to_string();

        let err = client_for(&server)
            .create_checkout_session(&request)
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::InvalidRequest(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_checkout_session_keeps_raw_object() {
        let server = MockServer::start().await;
        let body = json!({
            "id": "cs_test_123",
            "object": "checkout.session",
            "url": null,
            "customer": "cus_123",
            "payment_status": "paid",
            "amount_total": 5000
        });

        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_test_123"))
            .and(header("Stripe-Version", "2024-12-18.acacia"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;

        let session = client_for(&server)
            .retrieve_checkout_session("cs_test_123")
            .await
            .unwrap();

        assert_eq!(session.customer_id.as_deref(), Some("cus_123"));
        assert_eq!(session.payment_status.as_deref(), Some("paid"));
        assert!(session.url.is_none());
        assert_eq!(session.raw, body);
    }

    #[tokio::test]
    async fn test_retrieve_expanded_customer() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_test_456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_456",
                "customer": { "id": "cus_456", "object": "customer" }
            })))
            .mount(&server)
            .await;

        let session = client_for(&server)
            .retrieve_checkout_session("cs_test_456")
            .await
            .unwrap();

        assert_eq!(session.customer_id.as_deref(), Some("cus_456"));
    }

    #[tokio::test]
    async fn test_create_portal_session() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/billing_portal/sessions"))
            .and(body_string_contains("customer=cus_123"))
            .and(body_string_contains("return_url=http%3A%2F%2Flocalhost%3A4242"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "bps_123",
                "object": "billing_portal.session",
                "customer": "cus_123",
                "return_url": "http://localhost:4242",
                "url": "https://billing.stripe.com/p/session/test_123"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = client_for(&server)
            .create_portal_session("cus_123", "http://localhost:4242")
            .await
            .unwrap();

        assert_eq!(session.url, "https://billing.stripe.com/p/session/test_123");
        assert_eq!(session.customer, "cus_123");
    }

    #[tokio::test]
    async fn test_construct_event_uses_configured_secret() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let payload = br#"{"id":"evt_1","type":"invoice.paid","created":0,"data":{"object":{}}}"#;
        let header = crate::webhook::signature_header(
            "whsec_secret",
            chrono::Utc::now().timestamp(),
            payload,
        );

        let event = client.construct_event(payload, &header).await.unwrap();
        assert_eq!(
            event.event_type,
            WebhookEventType::Unknown("invoice.paid".to_string())
        );
        assert_eq!(client.provider_name(), "stripe");
    }
}
