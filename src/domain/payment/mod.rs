//! Payment domain - gateway reconciliation contract.
//!
//! Payments are correlated 1:1 with checkout attempts but live apart from
//! registrations: payment status is owned by the webhook handler, and the
//! registration machine reacts to it.

mod gateway_event;
mod payment;
mod webhook_errors;
mod webhook_verifier;

pub use gateway_event::{GatewayEvent, GatewayEventData, GatewayEventKind, GatewayPaymentObject};
pub use payment::{Payment, PaymentPurpose, PaymentStatus};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::WebhookVerifier;

#[cfg(test)]
pub use webhook_verifier::sign_test_payload;
