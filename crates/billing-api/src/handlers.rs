//! # Request Handlers
//!
//! Axum request handlers for the billing API. Each one performs a single
//! provider call and translates the outcome into an HTTP response.

use crate::response::{write_json, ApiError};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::FormRejection, Form, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Redirect, Response},
};
use billing_core::{BillingError, CheckoutRequest};
use billing_stripe::dispatch_webhook_event;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Publishable settings for the frontend
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub publishable_key: String,
    pub basic_price: String,
    pub pro_price: String,
}

/// Create checkout form
#[derive(Debug, Default, Deserialize)]
pub struct CreateCheckoutForm {
    #[serde(rename = "priceId", default)]
    pub price_id: Option<String>,
}

/// Session lookup (query string or form)
#[derive(Debug, Default, Deserialize)]
pub struct SessionParams {
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

fn required(value: Option<String>, name: &str) -> Result<String, BillingError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BillingError::InvalidRequest(format!("Missing {}", name)))
}

/// An unreadable form body counts as a form with no fields
fn form_or_empty<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            debug!("Unreadable form body: {}", rejection);
            T::default()
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Publishable key and price IDs for the frontend
pub async fn config(State(state): State<AppState>) -> Response {
    write_json(Ok(ConfigResponse {
        publishable_key: state.publishable_key.clone(),
        basic_price: state.config.basic_price_id.clone(),
        pro_price: state.config.pro_price_id.clone(),
    }))
}

/// Create a subscription checkout session and redirect to it
#[instrument(skip(state, form))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    form: Result<Form<CreateCheckoutForm>, FormRejection>,
) -> Result<Redirect, ApiError> {
    let price_id = required(form_or_empty(form).price_id, "priceId")?;
    let request = CheckoutRequest::subscription(price_id, &state.urls);

    info!("Creating checkout session: price={}", request.price_id);

    let session = state
        .provider
        .create_checkout_session(&request)
        .await
        .map_err(|e| {
            error!("Failed to create checkout session: {}", e);
            e
        })?;

    let url = session.url.ok_or_else(|| BillingError::ProviderError {
        provider: state.provider.provider_name().to_string(),
        message: format!("Checkout session {} has no URL", session.id),
    })?;

    Ok(Redirect::to(&url))
}

/// Return a checkout session exactly as the provider reports it
#[instrument(skip(state, params))]
pub async fn checkout_session(
    State(state): State<AppState>,
    Query(params): Query<SessionParams>,
) -> Response {
    let result = match required(params.session_id, "sessionId") {
        Ok(session_id) => state
            .provider
            .retrieve_checkout_session(&session_id)
            .await
            .map(|session| session.raw),
        Err(e) => Err(e),
    };

    write_json(result)
}

/// Open the billing portal for the customer behind a checkout session
#[instrument(skip(state, form))]
pub async fn customer_portal(
    State(state): State<AppState>,
    form: Result<Form<SessionParams>, FormRejection>,
) -> Result<Redirect, ApiError> {
    let session_id = required(form_or_empty(form).session_id, "sessionId")?;

    let session = state
        .provider
        .retrieve_checkout_session(&session_id)
        .await?;

    let customer_id = session.customer_id.ok_or_else(|| {
        BillingError::InvalidRequest(format!("Checkout session {} has no customer", session.id))
    })?;

    let portal = state
        .provider
        .create_portal_session(&customer_id, &state.urls.portal_return_url())
        .await
        .map_err(|e| {
            error!("Failed to create billing portal session: {}", e);
            e
        })?;

    Ok(Redirect::to(&portal.url))
}

/// Handle a provider webhook delivery
#[instrument(skip(state, headers, body))]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, (StatusCode, String)> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    // Verify and parse webhook
    let event = state
        .provider
        .construct_event(&body, signature)
        .await
        .map_err(|e| {
            warn!("Webhook rejected: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string())
        })?;

    info!(
        "Received webhook: type={}, id={}",
        event.event_type.as_str(),
        event.event_id
    );

    dispatch_webhook_event(state.webhook_handler.as_ref(), &event).map_err(|e| {
        error!("Webhook handler error: {}", e);
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    Ok(StatusCode::OK)
}
