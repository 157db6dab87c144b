//! Stripe Checkout client.
//!
//! Only one Stripe operation is used: creating a hosted Checkout Session for a
//! membership tier. Yearly tiers are subscriptions, lifetime tiers are
//! one-time payments. Fulfilment happens in Stripe webhooks handled elsewhere.

pub mod mock;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use design_library_core::{Email, PriceType, TierId, UserId};

use crate::config::StripeConfig;

/// Timeout for every Stripe request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when interacting with the Stripe API.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Everything needed to open a Checkout Session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub user_id: UserId,
    pub customer_email: Email,
    pub tier_id: TierId,
    pub price_type: PriceType,
    /// Stripe price ID for the tier and price type.
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// A created Checkout Session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CheckoutSession {
    pub session_id: String,
    /// Hosted checkout page to redirect the browser to.
    pub url: String,
}

/// Payment processor operations used by the billing routes.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create a hosted checkout session.
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;
}

/// Form fields for `POST /v1/checkout/sessions`.
#[must_use]
pub fn checkout_form(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
    let mode = if request.price_type.is_recurring() {
        "subscription"
    } else {
        "payment"
    };

    vec![
        ("mode", mode.to_string()),
        ("line_items[0][price]", request.price_id.clone()),
        ("line_items[0][quantity]", "1".to_string()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
        ("customer_email", request.customer_email.to_string()),
        ("client_reference_id", request.user_id.to_string()),
        ("metadata[user_id]", request.user_id.to_string()),
        ("metadata[tier_id]", request.tier_id.to_string()),
        ("metadata[price_type]", request.price_type.to_string()),
    ]
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Pull a readable message out of a Stripe error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message.or(envelope.error.kind))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// Stripe REST API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    api_base: Url,
    secret_key: SecretString,
}

impl StripeClient {
    /// Create a new Stripe API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PaymentError> {
        self.api_base
            .join(path)
            .map_err(|e| PaymentError::Parse(format!("invalid Stripe URL: {e}")))
    }
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = self.endpoint("/v1/checkout/sessions")?;

        let response = self
            .client
            .post(url)
            .bearer_auth(self.secret_key.expose_secret())
            .form(&checkout_form(request))
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))?;

        let url = session
            .url
            .ok_or_else(|| PaymentError::Parse(format!("session {} has no url", session.id)))?;

        tracing::info!(
            session_id = %session.id,
            user_id = %request.user_id,
            tier_id = %request.tier_id,
            price_type = %request.price_type,
            "Created Stripe checkout session"
        );

        Ok(CheckoutSession {
            session_id: session.id,
            url,
        })
    }
}
