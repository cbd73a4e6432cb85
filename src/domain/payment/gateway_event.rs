//! Payment-gateway webhook event types.
//!
//! Structures for parsing verified webhook payloads. Only the fields the
//! reconciliation contract consumes are captured: event kind, external
//! payment reference, amount, and currency. Everything else in the
//! gateway's schema is ignored.

use serde::{Deserialize, Serialize};

/// Verified webhook event from the payment gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayEvent {
    /// Gateway event identifier (evt_xxx format).
    pub id: String,

    /// Raw event type string (e.g. "payment_intent.succeeded").
    #[serde(rename = "type")]
    pub event_type: String,

    /// When the gateway created the event (Unix timestamp).
    pub created: i64,

    /// Whether this is a live-mode event.
    #[serde(default)]
    pub livemode: bool,

    /// Event-specific payload.
    pub data: GatewayEventData,
}

/// Container for the event payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayEventData {
    /// The payment object that triggered the event.
    pub object: GatewayPaymentObject,
}

/// Payment object fields consumed by the webhook handler.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayPaymentObject {
    /// External payment reference (session/intent id); the idempotency key.
    pub id: String,

    /// Amount in cents, when the gateway includes it.
    #[serde(default)]
    pub amount: Option<i64>,

    /// Currency code, when the gateway includes it.
    #[serde(default)]
    pub currency: Option<String>,
}

/// Event kinds the reconciliation contract reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayEventKind {
    /// Payment collected successfully.
    PaymentSucceeded,
    /// Payment attempt failed; the gateway may retry.
    PaymentFailed,
    /// Anything else; acknowledged but not processed.
    Unknown,
}

impl GatewayEventKind {
    /// Parse the gateway's event type string.
    pub fn parse(s: &str) -> Self {
        match s {
            "payment_intent.succeeded" | "checkout.session.completed" => Self::PaymentSucceeded,
            "payment_intent.payment_failed" => Self::PaymentFailed,
            _ => Self::Unknown,
        }
    }
}

impl GatewayEvent {
    /// The parsed event kind.
    pub fn kind(&self) -> GatewayEventKind {
        GatewayEventKind::parse(&self.event_type)
    }

    /// The external payment reference this event is about.
    pub fn payment_reference(&self) -> &str {
        &self.data.object.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(event_type: &str) -> GatewayEvent {
        serde_json::from_value(serde_json::json!({
            "id": "evt_42",
            "type": event_type,
            "created": 1_704_067_200i64,
            "livemode": false,
            "data": {
                "object": {
                    "id": "pi_abc",
                    "amount": 4500,
                    "currency": "usd"
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn succeeded_intent_parses_as_payment_succeeded() {
        let event = sample("payment_intent.succeeded");
        assert_eq!(event.kind(), GatewayEventKind::PaymentSucceeded);
        assert_eq!(event.payment_reference(), "pi_abc");
        assert_eq!(event.data.object.amount, Some(4500));
    }

    #[test]
    fn completed_checkout_also_counts_as_success() {
        let event = sample("checkout.session.completed");
        assert_eq!(event.kind(), GatewayEventKind::PaymentSucceeded);
    }

    #[test]
    fn failed_intent_parses_as_payment_failed() {
        let event = sample("payment_intent.payment_failed");
        assert_eq!(event.kind(), GatewayEventKind::PaymentFailed);
    }

    #[test]
    fn unrelated_event_is_unknown() {
        let event = sample("customer.created");
        assert_eq!(event.kind(), GatewayEventKind::Unknown);
    }

    #[test]
    fn amount_and_currency_are_optional() {
        let event: GatewayEvent = serde_json::from_value(serde_json::json!({
            "id": "evt_1",
            "type": "payment_intent.succeeded",
            "created": 0,
            "data": { "object": { "id": "pi_1" } }
        }))
        .unwrap();

        assert_eq!(event.data.object.amount, None);
        assert_eq!(event.data.object.currency, None);
        assert!(!event.livemode);
    }
}
