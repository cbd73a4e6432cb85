//! Shared waitlist promotion flow.
//!
//! Used wherever capacity frees up: the cancellation handlers and the
//! expiry sweep. Promotion is strictly FIFO per event: heads are promoted
//! in queue order while their parties fit the free capacity, and a head
//! that does not fit blocks everyone behind it. Each promoted member gets
//! a brand-new Payment and checkout session with a fresh expiry window.

use std::sync::Arc;

use crate::domain::events::PlayEvent;
use crate::domain::foundation::{DomainError, PaymentId, Timestamp};
use crate::domain::payment::{Payment, PaymentPurpose};
use crate::domain::registration::Registration;
use crate::ports::{
    CreateCheckoutRequest, EmailNotifier, PaymentGateway, PaymentRepository,
    RegistrationRepository, UserDirectory,
};

use super::create_booking::CheckoutUrls;

/// Promotes an event's waitlist into freed capacity, FIFO, each entry
/// getting a fresh payment window.
pub struct WaitlistPromotion {
    registrations: Arc<dyn RegistrationRepository>,
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    users: Arc<dyn UserDirectory>,
    notifier: Arc<dyn EmailNotifier>,
    checkout_urls: CheckoutUrls,
    payment_timeout_minutes: u32,
}

impl WaitlistPromotion {
    pub fn new(
        registrations: Arc<dyn RegistrationRepository>,
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        users: Arc<dyn UserDirectory>,
        notifier: Arc<dyn EmailNotifier>,
        checkout_urls: CheckoutUrls,
        payment_timeout_minutes: u32,
    ) -> Self {
        Self {
            registrations,
            payments,
            gateway,
            users,
            notifier,
            checkout_urls,
            payment_timeout_minutes,
        }
    }

    /// Promote waitlist entries into freed capacity for `event`, in queue
    /// order, until the queue is empty or the next head does not fit.
    ///
    /// The status flip happens in the repository under the event lock, with
    /// the head and the remaining capacity re-checked there, so a freed solo
    /// slot never admits a larger party and two concurrent slot releases
    /// cannot both take the same head. When the flip loses that re-check the
    /// checkout session goes unused; its idempotency key is the entry id,
    /// so the gateway deduplicates retried sessions for the same entry.
    ///
    /// Returns the promoted registrations. If a gateway call fails the
    /// current head stays waitlisted and the next slot release retries it.
    pub async fn promote_available(
        &self,
        event: &PlayEvent,
    ) -> Result<Vec<Registration>, DomainError> {
        let mut promoted = Vec::new();
        loop {
            let Some(head) = self.registrations.find_first_waitlisted(&event.id).await? else {
                break;
            };

            let amount = event.price_for_party(head.party_size());
            let session = self
                .gateway
                .create_checkout_session(CreateCheckoutRequest {
                    user_id: head.user_id,
                    registration_id: head.id,
                    amount_cents: amount,
                    currency: event.currency.clone(),
                    description: format!("{} (waitlist promotion)", event.name),
                    success_url: self.checkout_urls.success_url.clone(),
                    cancel_url: self.checkout_urls.cancel_url.clone(),
                    idempotency_key: Some(head.id.to_string()),
                })
                .await?;

            let expires = Timestamp::now().plus_minutes(self.payment_timeout_minutes as i64);
            let Some(entry) = self
                .registrations
                .promote_head_if_capacity(&head.id, &event.id, event.capacity, expires, &session.id)
                .await?
            else {
                // Head changed under us or its party does not fit; strict
                // FIFO, so nobody behind it jumps the queue.
                break;
            };

            let payment = Payment::new(
                PaymentId::new(),
                &session.id,
                amount,
                &event.currency,
                PaymentPurpose::Waitlist,
                Some(entry.id),
            );
            self.payments.save(&payment).await?;

            self.notify_promoted(&entry, event).await;
            promoted.push(entry);
        }

        Ok(promoted)
    }

    // Notification failures never fail the promotion.
    async fn notify_promoted(&self, registration: &Registration, event: &PlayEvent) {
        let profile = match self.users.find_by_id(&registration.user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(
                    user_id = %registration.user_id,
                    error = %err,
                    "failed to look up user for promotion email"
                );
                return;
            }
        };
        if let Err(err) = self
            .notifier
            .waitlist_promoted(&profile.email, registration, event)
            .await
        {
            tracing::warn!(
                user_id = %registration.user_id,
                error = %err,
                "failed to send waitlist promotion email"
            );
        }
    }
}
