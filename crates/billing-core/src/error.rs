//! # Billing Error Types
//!
//! Typed error handling for the billing server.
//! All provider operations return `Result<T, BillingError>`.

use thiserror::Error;

/// Core error type for all billing operations
#[derive(Debug, Error)]
pub enum BillingError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Payment provider rejected the request
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Webhook signature verification failed
    #[error("{0}")]
    WebhookVerificationFailed(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParseError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BillingError {
    /// Message suitable for showing to the caller.
    ///
    /// Provider errors carry the provider's own human-readable message,
    /// which is preferred over the wrapped display text.
    pub fn client_message(&self) -> String {
        match self {
            BillingError::ProviderError { message, .. } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for billing operations
pub type BillingResult<T> = Result<T, BillingError>;
