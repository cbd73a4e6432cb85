//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` trait against the Stripe REST API using
//! hosted Checkout for one-shot booking charges and the Refunds API for
//! reimbursements. Webhook signature verification is handled separately by
//! [`crate::domain::payment::WebhookVerifier`].
//!
//! # Security
//!
//! - API key handled via `secrecy::SecretString`
//! - Idempotency keys forwarded via the `Idempotency-Key` header
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key);
//! let gateway = StripeGateway::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, GatewayError, GatewayErrorCode, PaymentGateway, Refund,
};

/// Checkout sessions are kept alive for 30 minutes; expired sessions can no
/// longer be completed and the pending registration is reclaimed by the
/// expiry sweep.
const CHECKOUT_SESSION_TTL_SECS: i64 = 30 * 60;

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Stripe payment gateway adapter.
pub struct StripeGateway {
    config: StripeConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    url: Option<String>,
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeSessionDetail {
    payment_intent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeRefundResponse {
    id: String,
    amount: i64,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl StripeGateway {
    /// Create a new Stripe gateway with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Translate a non-success Stripe response into a `GatewayError`.
    async fn error_from_response(operation: &str, response: reqwest::Response) -> GatewayError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let stripe_code = serde_json::from_str::<StripeErrorEnvelope>(&body)
            .ok()
            .and_then(|e| e.error.code);
        let stripe_message = serde_json::from_str::<StripeErrorEnvelope>(&body)
            .ok()
            .and_then(|e| e.error.message)
            .unwrap_or_else(|| body.clone());

        tracing::error!(
            operation = operation,
            status = %status,
            stripe_code = ?stripe_code,
            "Stripe API request failed"
        );

        let code = classify_error(status, stripe_code.as_deref());
        let mut err = GatewayError::new(code, format!("Stripe {}: {}", operation, stripe_message));
        if let Some(provider_code) = stripe_code {
            err = err.with_provider_code(provider_code);
        }
        err
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        response.json().await.map_err(|e| {
            GatewayError::new(
                GatewayErrorCode::ProviderError,
                format!("Failed to parse Stripe response: {}", e),
            )
        })
    }

    /// Resolve the payment intent behind a checkout session.
    ///
    /// Refunds are issued against the payment intent, but we store the
    /// session id as the payment's external reference.
    async fn payment_intent_for_session(&self, session_id: &str) -> Result<String, GatewayError> {
        let url = format!(
            "{}/v1/checkout/sessions/{}",
            self.config.api_base_url, session_id
        );

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("get checkout session", response).await);
        }

        let detail: StripeSessionDetail = Self::parse_json(response).await?;
        detail
            .payment_intent
            .ok_or_else(|| GatewayError::not_found("Payment intent for session"))
    }
}

/// Map an HTTP status and Stripe error code to a gateway error code.
fn classify_error(status: reqwest::StatusCode, stripe_code: Option<&str>) -> GatewayErrorCode {
    if stripe_code == Some("charge_already_refunded") {
        return GatewayErrorCode::AlreadyRefunded;
    }
    match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            GatewayErrorCode::AuthenticationError
        }
        reqwest::StatusCode::NOT_FOUND => GatewayErrorCode::NotFound,
        reqwest::StatusCode::TOO_MANY_REQUESTS => GatewayErrorCode::RateLimitExceeded,
        _ => GatewayErrorCode::ProviderError,
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let expires_at = chrono::Utc::now().timestamp() + CHECKOUT_SESSION_TTL_SECS;

        let params = vec![
            ("mode", "payment".to_string()),
            ("line_items[0][price_data][currency]", request.currency),
            (
                "line_items[0][price_data][unit_amount]",
                request.amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                request.description,
            ),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", request.success_url),
            ("cancel_url", request.cancel_url),
            ("expires_at", expires_at.to_string()),
            ("metadata[user_id]", request.user_id.to_string()),
            (
                "metadata[registration_id]",
                request.registration_id.to_string(),
            ),
        ];

        let mut builder = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params);

        if let Some(key) = &request.idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("create checkout session", response).await);
        }

        let session: StripeCheckoutSessionResponse = Self::parse_json(response).await?;

        let checkout_url = session
            .url
            .unwrap_or_else(|| format!("https://checkout.stripe.com/c/pay/{}", session.id));

        Ok(CheckoutSession {
            id: session.id,
            url: checkout_url,
            expires_at: session.expires_at.unwrap_or(expires_at),
        })
    }

    async fn issue_refund(&self, payment_reference: &str) -> Result<Refund, GatewayError> {
        let payment_intent = self.payment_intent_for_session(payment_reference).await?;

        let url = format!("{}/v1/refunds", self.config.api_base_url);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&[("payment_intent", payment_intent.as_str())])
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("create refund", response).await);
        }

        let refund: StripeRefundResponse = Self::parse_json(response).await?;

        tracing::info!(
            refund_id = %refund.id,
            payment_reference = payment_reference,
            amount_cents = refund.amount,
            "Refund issued at gateway"
        );

        Ok(Refund {
            id: refund.id,
            amount_cents: refund.amount,
        })
    }
}
