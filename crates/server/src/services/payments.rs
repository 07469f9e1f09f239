//! Stripe payment gateway adapter.
//!
//! Wraps creation and retrieval of payment intents. Amounts cross this
//! boundary only as integer minor units (paisa), computed server-side;
//! the client ever sees only the intent's `client_secret`, never the API
//! key.

use std::collections::HashMap;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use farmlink_core::OrderId;

use crate::config::StripeConfig;

/// Stripe API base URL.
const BASE_URL: &str = "https://api.stripe.com/v1";

/// Metadata key tying an intent back to the order it was reserved for.
const ORDER_ID_KEY: &str = "order_id";

/// Errors that can occur when talking to Stripe.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe returned an error response.
    #[error("Stripe error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build the client.
    #[error("client error: {0}")]
    Client(String),
}

/// A payment intent, as returned by Stripe.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    /// Intent ID (`pi_...`).
    pub id: String,
    /// Opaque handle the client uses to complete payment. Absent on
    /// retrievals made with a restricted key.
    pub client_secret: Option<String>,
    /// Processor status (e.g. `requires_payment_method`, `succeeded`).
    pub status: String,
    /// Metadata set at creation time.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Email the receipt was sent to, if any.
    #[serde(default)]
    pub receipt_email: Option<String>,
}

impl PaymentIntent {
    /// Whether the processor reports this intent as settled.
    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        self.status == "succeeded"
    }

    /// The order this intent was reserved for, from creation metadata.
    #[must_use]
    pub fn order_id(&self) -> Option<OrderId> {
        self.metadata.get(ORDER_ID_KEY)?.parse().ok()
    }

    /// Whether this intent settles the given order: status `succeeded`
    /// and metadata naming exactly that order.
    #[must_use]
    pub fn settles(&self, order_id: OrderId) -> bool {
        self.is_succeeded() && self.order_id() == Some(order_id)
    }
}

/// Error body shape returned by Stripe.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    currency: String,
}

impl StripeClient {
    /// Create a new Stripe API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| StripeError::Client(format!("invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            currency: config.currency.clone(),
        })
    }

    /// Create a payment intent for `amount_minor` smallest currency
    /// units, tagged with the order ID for later reconciliation.
    ///
    /// # Errors
    ///
    /// Returns `StripeError` on network or processor failure.
    pub async fn create_intent(
        &self,
        amount_minor: i64,
        order_id: OrderId,
    ) -> Result<PaymentIntent, StripeError> {
        let url = format!("{BASE_URL}/payment_intents");
        let amount = amount_minor.to_string();
        let order = order_id.to_string();
        let metadata_key = format!("metadata[{ORDER_ID_KEY}]");
        let params: &[(&str, &str)] = &[
            ("amount", &amount),
            ("currency", &self.currency),
            ("description", "Organic food products order"),
            ("automatic_payment_methods[enabled]", "true"),
            (&metadata_key, &order),
        ];

        let response = self.client.post(&url).form(params).send().await?;
        Self::parse_intent(response).await
    }

    /// Retrieve an intent's current state from the processor.
    ///
    /// This is the server-to-processor verification step: an order is
    /// only marked paid when the retrieved intent settles it.
    ///
    /// # Errors
    ///
    /// Returns `StripeError` on network or processor failure.
    pub async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, StripeError> {
        let url = format!(
            "{BASE_URL}/payment_intents/{}",
            urlencoding::encode(intent_id)
        );
        let response = self.client.get(&url).send().await?;
        Self::parse_intent(response).await
    }

    /// Cancel an intent so an abandoned checkout cannot be completed
    /// after its order was voided.
    ///
    /// # Errors
    ///
    /// Returns `StripeError` on network or processor failure, including
    /// intents that are no longer cancelable.
    pub async fn cancel_intent(&self, intent_id: &str) -> Result<PaymentIntent, StripeError> {
        let url = format!(
            "{BASE_URL}/payment_intents/{}/cancel",
            urlencoding::encode(intent_id)
        );
        let response = self.client.post(&url).send().await?;
        Self::parse_intent(response).await
    }

    async fn parse_intent(response: reqwest::Response) -> Result<PaymentIntent, StripeError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_default();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<PaymentIntent>().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn intent(status: &str, order_id: Option<OrderId>) -> PaymentIntent {
        let mut metadata = HashMap::new();
        if let Some(id) = order_id {
            metadata.insert(ORDER_ID_KEY.to_string(), id.to_string());
        }
        PaymentIntent {
            id: "pi_test_123".to_string(),
            client_secret: Some("pi_test_123_secret_abc".to_string()),
            status: status.to_string(),
            metadata,
            receipt_email: None,
        }
    }

    #[test]
    fn test_settles_requires_succeeded_status() {
        let order = OrderId::generate();
        assert!(intent("succeeded", Some(order)).settles(order));
        assert!(!intent("requires_payment_method", Some(order)).settles(order));
        assert!(!intent("processing", Some(order)).settles(order));
    }

    #[test]
    fn test_settles_requires_matching_order() {
        let order = OrderId::generate();
        let other = OrderId::generate();
        assert!(!intent("succeeded", Some(other)).settles(order));
        assert!(!intent("succeeded", None).settles(order));
    }

    #[test]
    fn test_canceled_intent_never_settles() {
        let order = OrderId::generate();
        assert!(!intent("canceled", Some(order)).settles(order));
    }

    #[test]
    fn test_deserialize_intent_response() {
        let json = r#"{
            "id": "pi_3abc",
            "client_secret": "pi_3abc_secret_xyz",
            "status": "requires_payment_method",
            "metadata": {"order_id": "00000000-0000-0000-0000-000000000001"},
            "receipt_email": null
        }"#;
        let intent: PaymentIntent = serde_json::from_str(json).unwrap();
        assert_eq!(intent.id, "pi_3abc");
        assert!(!intent.is_succeeded());
        assert!(intent.order_id().is_some());
    }

    #[test]
    fn test_deserialize_ignores_extra_fields() {
        // Stripe responses carry dozens of fields we don't model
        let json = r#"{
            "id": "pi_3abc",
            "object": "payment_intent",
            "amount": 11500,
            "currency": "npr",
            "client_secret": null,
            "status": "succeeded",
            "livemode": false
        }"#;
        let intent: PaymentIntent = serde_json::from_str(json).unwrap();
        assert!(intent.is_succeeded());
        assert!(intent.order_id().is_none());
    }

    #[test]
    fn test_deserialize_error_body() {
        let json = r#"{"error": {"type": "invalid_request_error", "message": "No such payment_intent"}}"#;
        let body: ApiErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.error.message, "No such payment_intent");
    }
}
