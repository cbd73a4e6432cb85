//! CancelRegistrationHandler - Command handler for cancelling a booking.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, RegistrationId, UserId};
use crate::domain::registration::Registration;
use crate::ports::{EventDirectory, RegistrationRepository};

use super::waitlist_promotion::WaitlistPromotion;

/// Command to cancel a confirmed or waitlisted registration.
#[derive(Debug, Clone)]
pub struct CancelRegistrationCommand {
    pub registration_id: RegistrationId,
    /// The authenticated caller. `None` for admin-initiated cancellations,
    /// which skip the ownership check.
    pub acting_user: Option<UserId>,
}

/// Result of a cancellation.
#[derive(Debug, Clone)]
pub struct CancelRegistrationResult {
    pub registration: Registration,
    /// Waitlist entries promoted into the freed capacity, in queue order.
    /// A cancelled party can free room for more than one entry.
    pub promoted: Vec<Registration>,
}

/// Handler for booking cancellations.
///
/// Cancelling a confirmed registration frees capacity, so the event's
/// waitlist is promoted in the same request. Money is not returned
/// here: any refund owed waits for the refund sweep, after the event has
/// concluded, so admins can still adjust up to event time.
pub struct CancelRegistrationHandler {
    registrations: Arc<dyn RegistrationRepository>,
    events: Arc<dyn EventDirectory>,
    promotion: Arc<WaitlistPromotion>,
}

impl CancelRegistrationHandler {
    pub fn new(
        registrations: Arc<dyn RegistrationRepository>,
        events: Arc<dyn EventDirectory>,
        promotion: Arc<WaitlistPromotion>,
    ) -> Self {
        Self {
            registrations,
            events,
            promotion,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelRegistrationCommand,
    ) -> Result<CancelRegistrationResult, DomainError> {
        let mut registration = self
            .registrations
            .find_by_id(&cmd.registration_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::RegistrationNotFound,
                    format!("registration {} not found", cmd.registration_id),
                )
            })?;

        if let Some(acting_user) = &cmd.acting_user {
            if &registration.user_id != acting_user {
                return Err(DomainError::new(
                    ErrorCode::Forbidden,
                    "registration belongs to another user",
                ));
            }
        }

        let held_slot = registration.status.holds_capacity_slot();
        registration.cancel()?;
        self.registrations.update(&registration).await?;

        // Freed capacity goes to the waitlist in queue order. Promotion
        // failure is not fatal: the next slot release retries it.
        let mut promoted = Vec::new();
        if held_slot {
            match self.events.find_by_id(&registration.event_id).await {
                Ok(Some(event)) => match self.promotion.promote_available(&event).await {
                    Ok(entries) => promoted = entries,
                    Err(err) => {
                        tracing::warn!(
                            event_id = %registration.event_id,
                            error = %err,
                            "waitlist promotion after cancellation failed"
                        );
                    }
                },
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(
                        event_id = %registration.event_id,
                        error = %err,
                        "event lookup for promotion failed"
                    );
                }
            }
        }

        Ok(CancelRegistrationResult {
            registration,
            promoted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryEventDirectory, InMemoryPaymentRepository, InMemoryRegistrationRepository,
        InMemoryUserDirectory, RecordingEmailNotifier, ScriptedPaymentGateway,
    };
    use crate::domain::events::PlayEvent;
    use crate::domain::foundation::{EventId, Timestamp};
    use crate::domain::registration::RegistrationStatus;
    use crate::application::handlers::booking::create_booking::CheckoutUrls;

    struct Fixture {
        handler: CancelRegistrationHandler,
        registrations: Arc<InMemoryRegistrationRepository>,
        event: PlayEvent,
    }

    fn fixture() -> Fixture {
        let event = PlayEvent {
            id: EventId::new(),
            name: "Saturday League".to_string(),
            capacity: 2,
            price_cents: 2000,
            currency: "gbp".to_string(),
            scheduled_at: Timestamp::now().plus_days(5),
            reward_points: 60,
        };

        let registrations = Arc::new(InMemoryRegistrationRepository::new());
        let events = Arc::new(InMemoryEventDirectory::with_event(event.clone()));
        let promotion = Arc::new(WaitlistPromotion::new(
            registrations.clone(),
            Arc::new(InMemoryPaymentRepository::new()),
            Arc::new(ScriptedPaymentGateway::new()),
            Arc::new(InMemoryUserDirectory::new()),
            Arc::new(RecordingEmailNotifier::new()),
            CheckoutUrls {
                success_url: "https://club.test/ok".to_string(),
                cancel_url: "https://club.test/no".to_string(),
            },
            30,
        ));

        let handler =
            CancelRegistrationHandler::new(registrations.clone(), events, promotion);

        Fixture {
            handler,
            registrations,
            event,
        }
    }

    async fn confirmed_registration(fx: &Fixture, user: UserId) -> Registration {
        let mut registration = Registration::new_pending_payment(
            RegistrationId::new(),
            user,
            fx.event.id,
            0,
            Timestamp::now().plus_minutes(30),
        );
        fx.registrations
            .insert_pending_if_capacity(&registration, fx.event.capacity)
            .await
            .unwrap();
        registration.confirm(2000).unwrap();
        fx.registrations.update(&registration).await.unwrap();
        registration
    }

    #[tokio::test]
    async fn owner_can_cancel_confirmed_registration() {
        let fx = fixture();
        let user = UserId::new();
        let registration = confirmed_registration(&fx, user).await;

        let result = fx
            .handler
            .handle(CancelRegistrationCommand {
                registration_id: registration.id,
                acting_user: Some(user),
            })
            .await
            .unwrap();

        assert_eq!(result.registration.status, RegistrationStatus::Cancelled);
        assert!(result.registration.cancelled_at.is_some());
    }

    #[tokio::test]
    async fn cancelling_someone_elses_booking_is_forbidden() {
        let fx = fixture();
        let registration = confirmed_registration(&fx, UserId::new()).await;

        let err = fx
            .handler
            .handle(CancelRegistrationCommand {
                registration_id: registration.id,
                acting_user: Some(UserId::new()),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn admin_cancellation_skips_ownership_check() {
        let fx = fixture();
        let registration = confirmed_registration(&fx, UserId::new()).await;

        let result = fx
            .handler
            .handle(CancelRegistrationCommand {
                registration_id: registration.id,
                acting_user: None,
            })
            .await
            .unwrap();
        assert_eq!(result.registration.status, RegistrationStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancelling_a_confirmed_slot_promotes_the_waitlist_head() {
        let fx = fixture();
        let registration = confirmed_registration(&fx, UserId::new()).await;

        let waiting =
            Registration::new_waitlisted(RegistrationId::new(), UserId::new(), fx.event.id, 0, 0);
        fx.registrations.insert_waitlisted(&waiting).await.unwrap();

        let result = fx
            .handler
            .handle(CancelRegistrationCommand {
                registration_id: registration.id,
                acting_user: None,
            })
            .await
            .unwrap();

        assert_eq!(result.promoted.len(), 1);
        assert_eq!(result.promoted[0].id, waiting.id);
        assert_eq!(result.promoted[0].status, RegistrationStatus::PendingPayment);
    }

    #[tokio::test]
    async fn oversized_waitlist_head_stays_queued_after_cancellation() {
        let fx = fixture();
        let registration = confirmed_registration(&fx, UserId::new()).await;

        // Party of three queued against a capacity-2 event; the single
        // freed slot must not admit it.
        let waiting =
            Registration::new_waitlisted(RegistrationId::new(), UserId::new(), fx.event.id, 2, 0);
        fx.registrations.insert_waitlisted(&waiting).await.unwrap();

        let result = fx
            .handler
            .handle(CancelRegistrationCommand {
                registration_id: registration.id,
                acting_user: None,
            })
            .await
            .unwrap();

        assert!(result.promoted.is_empty());
        let stored = fx
            .registrations
            .find_by_id(&waiting.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, RegistrationStatus::Waitlisted);

        let used: u32 = fx
            .registrations
            .all()
            .iter()
            .filter(|r| r.status.holds_capacity_slot())
            .map(|r| r.party_size())
            .sum();
        assert!(used <= fx.event.capacity);
    }

    #[tokio::test]
    async fn cancelling_a_party_can_promote_several_entries() {
        let fx = fixture();
        let user = UserId::new();

        // A confirmed party of two fills the capacity-2 event.
        let mut registration = Registration::new_pending_payment(
            RegistrationId::new(),
            user,
            fx.event.id,
            1,
            Timestamp::now().plus_minutes(30),
        );
        fx.registrations
            .insert_pending_if_capacity(&registration, fx.event.capacity)
            .await
            .unwrap();
        registration.confirm(4000).unwrap();
        fx.registrations.update(&registration).await.unwrap();

        let first =
            Registration::new_waitlisted(RegistrationId::new(), UserId::new(), fx.event.id, 0, 0);
        let second =
            Registration::new_waitlisted(RegistrationId::new(), UserId::new(), fx.event.id, 0, 0);
        fx.registrations.insert_waitlisted(&first).await.unwrap();
        fx.registrations.insert_waitlisted(&second).await.unwrap();

        let result = fx
            .handler
            .handle(CancelRegistrationCommand {
                registration_id: registration.id,
                acting_user: Some(user),
            })
            .await
            .unwrap();

        // Both freed slots filled, FIFO.
        assert_eq!(result.promoted.len(), 2);
        assert_eq!(result.promoted[0].id, first.id);
        assert_eq!(result.promoted[1].id, second.id);
    }

    #[tokio::test]
    async fn cancelling_a_waitlist_entry_does_not_promote() {
        let fx = fixture();
        let user = UserId::new();
        let waiting =
            Registration::new_waitlisted(RegistrationId::new(), user, fx.event.id, 0, 0);
        fx.registrations.insert_waitlisted(&waiting).await.unwrap();

        let result = fx
            .handler
            .handle(CancelRegistrationCommand {
                registration_id: waiting.id,
                acting_user: Some(user),
            })
            .await
            .unwrap();

        assert_eq!(result.registration.status, RegistrationStatus::Cancelled);
        assert!(result.promoted.is_empty());
    }

    #[tokio::test]
    async fn unknown_registration_is_rejected() {
        let fx = fixture();
        let err = fx
            .handler
            .handle(CancelRegistrationCommand {
                registration_id: RegistrationId::new(),
                acting_user: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RegistrationNotFound);
    }
}
