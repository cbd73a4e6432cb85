//! HandleGatewayWebhookHandler - Command handler for gateway webhook events.

use std::sync::Arc;

use crate::domain::payment::{GatewayEvent, GatewayEventKind, WebhookError, WebhookVerifier};
use crate::domain::registration::RegistrationStatus;
use crate::ports::{
    EmailNotifier, EventDirectory, PaymentRepository, RegistrationRepository, UserDirectory,
};

/// Command carrying a raw webhook request.
#[derive(Debug, Clone)]
pub struct HandleGatewayWebhookCommand {
    /// Raw request body, exactly as received (signatures are computed over
    /// the raw bytes).
    pub payload: Vec<u8>,
    /// Value of the gateway's signature header.
    pub signature: String,
}

/// Result of webhook processing.
#[derive(Debug, Clone)]
pub enum HandleGatewayWebhookResult {
    /// Payment settled; the linked registration is now confirmed.
    PaymentConfirmed {
        payment_reference: String,
        registration_id: Option<String>,
    },
    /// Payment attempt failed; the registration stays pending.
    PaymentFailed { payment_reference: String },
    /// Payment settled after the expiry sweep had already released the
    /// slot. The registration stays expired; the refund sweep returns the
    /// money.
    PaidAfterExpiry {
        payment_reference: String,
        registration_id: String,
    },
    /// Duplicate delivery of an already-settled payment.
    AlreadyProcessed,
    /// Event type we don't act on.
    Ignored,
}

/// Handler for verified webhook deliveries.
///
/// The two rules the gateway contract demands:
/// - never trust an unverified payload (signature check happens first,
///   before anything is parsed into domain state)
/// - deliveries are at-least-once, so a settled Payment makes any repeat
///   event a no-op rather than a double-confirm
///
/// A failed payment leaves the registration in `pending_payment`: gateways
/// retry cards, and the expiry sweep reclaims the slot if nothing lands.
pub struct HandleGatewayWebhookHandler {
    verifier: WebhookVerifier,
    payments: Arc<dyn PaymentRepository>,
    registrations: Arc<dyn RegistrationRepository>,
    events: Arc<dyn EventDirectory>,
    users: Arc<dyn UserDirectory>,
    notifier: Arc<dyn EmailNotifier>,
}

impl HandleGatewayWebhookHandler {
    pub fn new(
        verifier: WebhookVerifier,
        payments: Arc<dyn PaymentRepository>,
        registrations: Arc<dyn RegistrationRepository>,
        events: Arc<dyn EventDirectory>,
        users: Arc<dyn UserDirectory>,
        notifier: Arc<dyn EmailNotifier>,
    ) -> Self {
        Self {
            verifier,
            payments,
            registrations,
            events,
            users,
            notifier,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleGatewayWebhookCommand,
    ) -> Result<HandleGatewayWebhookResult, WebhookError> {
        // 1. Verify the signature before touching the payload
        let event = self.verifier.verify_and_parse(&cmd.payload, &cmd.signature)?;

        // 2. Dispatch on event type
        match event.kind() {
            GatewayEventKind::PaymentSucceeded => self.handle_payment_succeeded(&event).await,
            GatewayEventKind::PaymentFailed => self.handle_payment_failed(&event).await,
            GatewayEventKind::Unknown => {
                tracing::debug!(event_type = %event.event_type, "ignoring webhook event");
                Ok(HandleGatewayWebhookResult::Ignored)
            }
        }
    }

    async fn handle_payment_succeeded(
        &self,
        event: &GatewayEvent,
    ) -> Result<HandleGatewayWebhookResult, WebhookError> {
        let reference = event.payment_reference();

        let mut payment = self
            .payments
            .find_by_external_reference(reference)
            .await
            .map_err(|e| WebhookError::Database(e.to_string()))?
            .ok_or_else(|| WebhookError::UnknownPaymentReference(reference.to_string()))?;

        // Idempotency guard: a settled payment means this delivery is a
        // repeat; acknowledge without re-applying anything.
        if payment.is_settled() {
            return Ok(HandleGatewayWebhookResult::AlreadyProcessed);
        }

        payment
            .mark_paid()
            .map_err(|e| WebhookError::InvalidTransition(e.to_string()))?;
        self.payments
            .update(&payment)
            .await
            .map_err(|e| WebhookError::Database(e.to_string()))?;

        let mut registration_id = None;
        if let Some(reg_id) = payment.registration_id {
            let mut registration = self
                .registrations
                .find_by_id(&reg_id)
                .await
                .map_err(|e| WebhookError::Database(e.to_string()))?
                .ok_or_else(|| WebhookError::RegistrationNotFound(reg_id.to_string()))?;

            // The expiry sweep may have already released the slot. The seat
            // is gone, but the money was taken: leave the registration
            // expired, acknowledge the delivery, and let the refund sweep
            // return the payment.
            if registration.status == RegistrationStatus::Expired {
                tracing::warn!(
                    registration_id = %reg_id,
                    payment_reference = %reference,
                    "payment settled after registration expiry; awaiting refund sweep"
                );
                return Ok(HandleGatewayWebhookResult::PaidAfterExpiry {
                    payment_reference: reference.to_string(),
                    registration_id: reg_id.to_string(),
                });
            }

            registration
                .confirm(payment.amount_cents)
                .map_err(|e| WebhookError::InvalidTransition(e.to_string()))?;
            self.registrations
                .update(&registration)
                .await
                .map_err(|e| WebhookError::Database(e.to_string()))?;

            self.notify_confirmed(&registration).await;
            registration_id = Some(reg_id.to_string());
        }

        Ok(HandleGatewayWebhookResult::PaymentConfirmed {
            payment_reference: reference.to_string(),
            registration_id,
        })
    }

    async fn handle_payment_failed(
        &self,
        event: &GatewayEvent,
    ) -> Result<HandleGatewayWebhookResult, WebhookError> {
        let reference = event.payment_reference();

        let mut payment = self
            .payments
            .find_by_external_reference(reference)
            .await
            .map_err(|e| WebhookError::Database(e.to_string()))?
            .ok_or_else(|| WebhookError::UnknownPaymentReference(reference.to_string()))?;

        if payment.is_settled() {
            // A success already landed; a late failure event changes nothing
            return Ok(HandleGatewayWebhookResult::AlreadyProcessed);
        }

        payment
            .mark_failed()
            .map_err(|e| WebhookError::InvalidTransition(e.to_string()))?;
        self.payments
            .update(&payment)
            .await
            .map_err(|e| WebhookError::Database(e.to_string()))?;

        // Registration deliberately left pending: the gateway may retry the
        // card, and the expiry sweep reclaims the slot otherwise.
        Ok(HandleGatewayWebhookResult::PaymentFailed {
            payment_reference: reference.to_string(),
        })
    }

    async fn notify_confirmed(&self, registration: &crate::domain::registration::Registration) {
        let event = match self.events.find_by_id(&registration.event_id).await {
            Ok(Some(event)) => event,
            _ => return,
        };
        let profile = match self.users.find_by_id(&registration.user_id).await {
            Ok(Some(profile)) => profile,
            _ => return,
        };
        if let Err(err) = self
            .notifier
            .booking_confirmed(&profile.email, registration, &event)
            .await
        {
            tracing::warn!(
                user_id = %registration.user_id,
                error = %err,
                "failed to send booking confirmation email"
            );
        }
    }
}
