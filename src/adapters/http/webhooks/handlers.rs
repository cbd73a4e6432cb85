//! HTTP handler for payment gateway webhook deliveries.

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::adapters::http::api_error::ErrorResponse;
use crate::adapters::http::state::AppState;
use crate::application::handlers::payment::{
    HandleGatewayWebhookCommand, HandleGatewayWebhookResult,
};
use crate::domain::payment::WebhookError;

/// Acknowledgement body returned to the gateway.
#[derive(Debug, Serialize)]
pub struct WebhookAckResponse {
    pub received: bool,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
}

impl From<HandleGatewayWebhookResult> for WebhookAckResponse {
    fn from(result: HandleGatewayWebhookResult) -> Self {
        match result {
            HandleGatewayWebhookResult::PaymentConfirmed {
                payment_reference, ..
            } => Self {
                received: true,
                outcome: "payment_confirmed",
                payment_reference: Some(payment_reference),
            },
            HandleGatewayWebhookResult::PaymentFailed { payment_reference } => Self {
                received: true,
                outcome: "payment_failed",
                payment_reference: Some(payment_reference),
            },
            HandleGatewayWebhookResult::PaidAfterExpiry {
                payment_reference, ..
            } => Self {
                received: true,
                outcome: "paid_after_expiry",
                payment_reference: Some(payment_reference),
            },
            HandleGatewayWebhookResult::AlreadyProcessed => Self {
                received: true,
                outcome: "already_processed",
                payment_reference: None,
            },
            HandleGatewayWebhookResult::Ignored => Self {
                received: true,
                outcome: "ignored",
                payment_reference: None,
            },
        }
    }
}

fn webhook_error_response(error: WebhookError) -> Response {
    let status = error.status_code();
    if status.is_server_error() {
        tracing::error!(error = %error, "webhook processing failed");
    } else {
        tracing::warn!(error = %error, "webhook rejected");
    }
    let body = ErrorResponse::new("WEBHOOK_ERROR", error.to_string());
    (status, Json(body)).into_response()
}

/// POST /webhooks/payment - Signed gateway event delivery.
///
/// No bearer auth here; authenticity comes from the HMAC signature over
/// the raw body, so the body must not be deserialized before verification.
pub async fn handle_payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = match headers.get("Stripe-Signature").and_then(|v| v.to_str().ok()) {
        Some(value) => value.to_string(),
        None => return webhook_error_response(WebhookError::InvalidSignature),
    };

    let handler = state.webhook_handler();
    let command = HandleGatewayWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    match handler.handle(command).await {
        Ok(result) => Json(WebhookAckResponse::from(result)).into_response(),
        Err(error) => webhook_error_response(error),
    }
}
