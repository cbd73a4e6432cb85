//! CreateBookingHandler - Command handler for booking a place at an event.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, EventId, PaymentId, RegistrationId, Timestamp, UserId};
use crate::domain::payment::{Payment, PaymentPurpose};
use crate::domain::registration::Registration;
use crate::ports::{
    CreateCheckoutRequest, EventDirectory, PaymentGateway, PaymentRepository,
    RegistrationRepository,
};

/// Redirect URLs handed to the gateway when opening a checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    pub success_url: String,
    pub cancel_url: String,
}

/// Command to book a place (plus optional guests) at an event.
#[derive(Debug, Clone)]
pub struct CreateBookingCommand {
    /// Authenticated user making the booking.
    pub user_id: UserId,
    /// Event to book.
    pub event_id: EventId,
    /// Guests accompanying the member (0 for a solo booking).
    pub guest_count: u32,
}

/// Result of a booking request.
#[derive(Debug, Clone)]
pub enum CreateBookingResult {
    /// Capacity was reserved; the member must pay within the window.
    PendingPayment {
        registration: Registration,
        checkout_url: String,
    },
    /// Event is full; the member joined the waitlist.
    Waitlisted {
        registration: Registration,
        position: u32,
    },
}

/// Handler for booking requests.
///
/// Reserves capacity atomically (the repository does the check-and-insert in
/// one unit), opens a checkout session for the charge, and records the
/// Payment the webhook will later settle. Full events fall through to the
/// waitlist.
pub struct CreateBookingHandler {
    registrations: Arc<dyn RegistrationRepository>,
    payments: Arc<dyn PaymentRepository>,
    events: Arc<dyn EventDirectory>,
    gateway: Arc<dyn PaymentGateway>,
    checkout_urls: CheckoutUrls,
    payment_timeout_minutes: u32,
}

impl CreateBookingHandler {
    pub fn new(
        registrations: Arc<dyn RegistrationRepository>,
        payments: Arc<dyn PaymentRepository>,
        events: Arc<dyn EventDirectory>,
        gateway: Arc<dyn PaymentGateway>,
        checkout_urls: CheckoutUrls,
        payment_timeout_minutes: u32,
    ) -> Self {
        Self {
            registrations,
            payments,
            events,
            gateway,
            checkout_urls,
            payment_timeout_minutes,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateBookingCommand,
    ) -> Result<CreateBookingResult, DomainError> {
        // 1. Resolve the event
        let event = self
            .events
            .find_by_id(&cmd.event_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::EventNotFound,
                    format!("event {} not found", cmd.event_id),
                )
            })?;

        let now = Timestamp::now();
        if event.has_finished(now) {
            return Err(DomainError::validation(
                "event_id",
                "event has already taken place",
            ));
        }

        // 2. Try to reserve capacity; fall through to the waitlist when full
        let expires = now.plus_minutes(self.payment_timeout_minutes as i64);
        let registration = Registration::new_pending_payment(
            RegistrationId::new(),
            cmd.user_id,
            cmd.event_id,
            cmd.guest_count,
            expires,
        );

        let reserved = self
            .registrations
            .insert_pending_if_capacity(&registration, event.capacity)
            .await?;

        if !reserved {
            let waitlisted = Registration::new_waitlisted(
                RegistrationId::new(),
                cmd.user_id,
                cmd.event_id,
                cmd.guest_count,
                0,
            );
            let position = self.registrations.insert_waitlisted(&waitlisted).await?;
            let mut stored = waitlisted;
            stored.waitlist_position = Some(position);
            return Ok(CreateBookingResult::Waitlisted {
                registration: stored,
                position,
            });
        }

        // 3. Open the checkout session for the charge
        let amount = event.price_for_party(registration.party_size());
        let session = match self
            .gateway
            .create_checkout_session(CreateCheckoutRequest {
                user_id: cmd.user_id,
                registration_id: registration.id,
                amount_cents: amount,
                currency: event.currency.clone(),
                description: format!("{} (party of {})", event.name, registration.party_size()),
                success_url: self.checkout_urls.success_url.clone(),
                cancel_url: self.checkout_urls.cancel_url.clone(),
                idempotency_key: Some(registration.id.to_string()),
            })
            .await
        {
            Ok(session) => session,
            Err(gateway_err) => {
                // The slot was reserved but no payment can arrive for it.
                // Release it now rather than holding it until the sweep.
                self.release_reserved_slot(registration).await;
                return Err(gateway_err.into());
            }
        };

        // 4. Record the payment the webhook will settle
        let payment = Payment::new(
            PaymentId::new(),
            &session.id,
            amount,
            &event.currency,
            PaymentPurpose::PlayBooking,
            Some(registration.id),
        );
        self.payments.save(&payment).await?;

        let mut registration = registration;
        registration.set_payment_reference(&session.id);
        self.registrations.update(&registration).await?;

        Ok(CreateBookingResult::PendingPayment {
            registration,
            checkout_url: session.url,
        })
    }

    // Best effort: if this fails the expiry sweep picks the slot up later.
    async fn release_reserved_slot(&self, mut registration: Registration) {
        if registration.expire().is_err() {
            return;
        }
        if let Err(err) = self.registrations.update(&registration).await {
            tracing::warn!(
                registration_id = %registration.id,
                error = %err,
                "failed to release reserved slot after gateway error"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryEventDirectory, InMemoryPaymentRepository, InMemoryRegistrationRepository,
        ScriptedPaymentGateway,
    };
    use crate::domain::events::PlayEvent;
    use crate::domain::registration::RegistrationStatus;

    fn test_urls() -> CheckoutUrls {
        CheckoutUrls {
            success_url: "https://club.test/bookings/success".to_string(),
            cancel_url: "https://club.test/bookings/cancelled".to_string(),
        }
    }

    fn upcoming_event(capacity: u32) -> PlayEvent {
        PlayEvent {
            id: EventId::new(),
            name: "Tuesday Session".to_string(),
            capacity,
            price_cents: 1200,
            currency: "gbp".to_string(),
            scheduled_at: Timestamp::now().plus_days(3),
            reward_points: 50,
        }
    }

    fn handler_with(
        event: PlayEvent,
    ) -> (
        CreateBookingHandler,
        Arc<InMemoryRegistrationRepository>,
        Arc<InMemoryPaymentRepository>,
        Arc<ScriptedPaymentGateway>,
    ) {
        let registrations = Arc::new(InMemoryRegistrationRepository::new());
        let payments = Arc::new(InMemoryPaymentRepository::new());
        let events = Arc::new(InMemoryEventDirectory::with_event(event));
        let gateway = Arc::new(ScriptedPaymentGateway::new());

        let handler = CreateBookingHandler::new(
            registrations.clone(),
            payments.clone(),
            events.clone(),
            gateway.clone(),
            test_urls(),
            30,
        );
        (handler, registrations, payments, gateway)
    }

    #[tokio::test]
    async fn booking_with_capacity_goes_pending_with_checkout_url() {
        let event = upcoming_event(10);
        let event_id = event.id;
        let (handler, registrations, payments, _gateway) = handler_with(event);

        let result = handler
            .handle(CreateBookingCommand {
                user_id: UserId::new(),
                event_id,
                guest_count: 1,
            })
            .await
            .unwrap();

        match result {
            CreateBookingResult::PendingPayment {
                registration,
                checkout_url,
            } => {
                assert_eq!(registration.status, RegistrationStatus::PendingPayment);
                assert_eq!(registration.party_size(), 2);
                assert!(registration.payment_reference.is_some());
                assert!(checkout_url.starts_with("https://checkout.test/"));
            }
            other => panic!("expected pending payment, got {:?}", other),
        }

        // Payment record charges per seat
        let stored = payments.all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].amount_cents, 2400);

        assert_eq!(registrations.all().len(), 1);
    }

    #[tokio::test]
    async fn full_event_goes_to_waitlist_without_charging() {
        let event = upcoming_event(1);
        let event_id = event.id;
        let (handler, _registrations, payments, gateway) = handler_with(event);

        handler
            .handle(CreateBookingCommand {
                user_id: UserId::new(),
                event_id,
                guest_count: 0,
            })
            .await
            .unwrap();

        let result = handler
            .handle(CreateBookingCommand {
                user_id: UserId::new(),
                event_id,
                guest_count: 0,
            })
            .await
            .unwrap();

        match result {
            CreateBookingResult::Waitlisted { position, .. } => assert_eq!(position, 1),
            other => panic!("expected waitlisted, got {:?}", other),
        }

        // Only the first booking opened a session and recorded a payment
        assert_eq!(gateway.checkout_requests().len(), 1);
        assert_eq!(payments.all().len(), 1);
    }

    #[tokio::test]
    async fn unknown_event_is_rejected() {
        let (handler, _, _, _) = handler_with(upcoming_event(10));

        let err = handler
            .handle(CreateBookingCommand {
                user_id: UserId::new(),
                event_id: EventId::new(),
                guest_count: 0,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EventNotFound);
    }

    #[tokio::test]
    async fn past_event_is_rejected() {
        let mut event = upcoming_event(10);
        event.scheduled_at = Timestamp::now().minus_days(1);
        let event_id = event.id;
        let (handler, _, _, _) = handler_with(event);

        let err = handler
            .handle(CreateBookingCommand {
                user_id: UserId::new(),
                event_id,
                guest_count: 0,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn second_active_booking_for_same_event_is_rejected() {
        let event = upcoming_event(10);
        let event_id = event.id;
        let (handler, _, _, _) = handler_with(event);
        let user = UserId::new();

        handler
            .handle(CreateBookingCommand {
                user_id: user,
                event_id,
                guest_count: 0,
            })
            .await
            .unwrap();

        let err = handler
            .handle(CreateBookingCommand {
                user_id: user,
                event_id,
                guest_count: 0,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateRegistration);
    }

    #[tokio::test]
    async fn gateway_failure_releases_the_reserved_slot() {
        let event = upcoming_event(1);
        let event_id = event.id;
        let (handler, registrations, payments, gateway) = handler_with(event);
        gateway.fail_next_checkouts();

        let err = handler
            .handle(CreateBookingCommand {
                user_id: UserId::new(),
                event_id,
                guest_count: 0,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::GatewayError);
        assert!(payments.all().is_empty());

        // The reservation was expired, so the slot is free again
        let stored = registrations.all();
        assert_eq!(stored[0].status, RegistrationStatus::Expired);
    }
}
