//! ClaimPointsHandler - Command handler for claiming attendance points.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, EventId, UserId};
use crate::domain::rewards::{RewardBalance, RewardPointTransaction};
use crate::ports::{EventDirectory, LedgerStore, RegistrationRepository};

/// Command to claim points for an attended event.
#[derive(Debug, Clone)]
pub struct ClaimPointsCommand {
    pub user_id: UserId,
    pub event_id: EventId,
}

/// Result of a successful claim.
#[derive(Debug, Clone)]
pub struct ClaimPointsResult {
    pub points_credited: i64,
    pub balance: RewardBalance,
}

/// Handler for point claims.
///
/// A claim requires a `completed` registration belonging to the caller.
/// Double-claim protection lives in the ledger, not here: the store rejects
/// a second event_attendance entry for the same (user, event), so two
/// concurrent claims cannot both credit.
pub struct ClaimPointsHandler {
    registrations: Arc<dyn RegistrationRepository>,
    events: Arc<dyn EventDirectory>,
    ledger: Arc<dyn LedgerStore>,
}

impl ClaimPointsHandler {
    pub fn new(
        registrations: Arc<dyn RegistrationRepository>,
        events: Arc<dyn EventDirectory>,
        ledger: Arc<dyn LedgerStore>,
    ) -> Self {
        Self {
            registrations,
            events,
            ledger,
        }
    }

    pub async fn handle(&self, cmd: ClaimPointsCommand) -> Result<ClaimPointsResult, DomainError> {
        let registration = self
            .registrations
            .find_completed_for_user_event(&cmd.user_id, &cmd.event_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::RegistrationNotFound,
                    "no completed registration for this event",
                )
            })?;

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

        if event.reward_points <= 0 {
            return Err(DomainError::validation(
                "event_id",
                "event does not award points",
            ));
        }

        let credit = RewardPointTransaction::attendance_credit(
            cmd.user_id,
            cmd.event_id,
            registration.id,
            event.reward_points,
        );
        let balance = self.ledger.append(&credit).await?;

        Ok(ClaimPointsResult {
            points_credited: event.reward_points,
            balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryEventDirectory, InMemoryLedgerStore, InMemoryRegistrationRepository,
    };
    use crate::domain::events::PlayEvent;
    use crate::domain::foundation::{RegistrationId, Timestamp};
    use crate::domain::registration::Registration;

    struct Fixture {
        handler: ClaimPointsHandler,
        registrations: Arc<InMemoryRegistrationRepository>,
        ledger: Arc<InMemoryLedgerStore>,
        event: PlayEvent,
    }

    fn fixture(reward_points: i64) -> Fixture {
        let event = PlayEvent {
            id: EventId::new(),
            name: "Wednesday Ladder".to_string(),
            capacity: 10,
            price_cents: 1000,
            currency: "gbp".to_string(),
            scheduled_at: Timestamp::now().minus_days(1),
            reward_points,
        };
        let registrations = Arc::new(InMemoryRegistrationRepository::new());
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let handler = ClaimPointsHandler::new(
            registrations.clone(),
            Arc::new(InMemoryEventDirectory::with_event(event.clone())),
            ledger.clone(),
        );
        Fixture {
            handler,
            registrations,
            ledger,
            event,
        }
    }

    async fn completed_registration(fx: &Fixture, user: UserId) {
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
        registration.confirm(1000).unwrap();
        registration.complete().unwrap();
        fx.registrations.update(&registration).await.unwrap();
    }

    #[tokio::test]
    async fn claim_credits_event_points() {
        let fx = fixture(50);
        let user = UserId::new();
        completed_registration(&fx, user).await;

        let result = fx
            .handler
            .handle(ClaimPointsCommand {
                user_id: user,
                event_id: fx.event.id,
            })
            .await
            .unwrap();

        assert_eq!(result.points_credited, 50);
        assert_eq!(result.balance.reward_points, 50);
    }

    #[tokio::test]
    async fn second_claim_conflicts_and_log_gains_one_entry() {
        let fx = fixture(50);
        let user = UserId::new();
        completed_registration(&fx, user).await;

        let cmd = ClaimPointsCommand {
            user_id: user,
            event_id: fx.event.id,
        };
        fx.handler.handle(cmd.clone()).await.unwrap();

        let err = fx.handler.handle(cmd).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyClaimed);
        assert_eq!(fx.ledger.all_transactions().len(), 1);
    }

    #[tokio::test]
    async fn claim_without_completed_registration_is_not_found() {
        let fx = fixture(50);

        let err = fx
            .handler
            .handle(ClaimPointsCommand {
                user_id: UserId::new(),
                event_id: fx.event.id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RegistrationNotFound);
    }

    #[tokio::test]
    async fn confirmed_but_not_completed_is_not_claimable() {
        let fx = fixture(50);
        let user = UserId::new();

        let mut registration = Registration::new_pending_payment(
            RegistrationId::new(),
            user,
            fx.event.id,
            0,
            Timestamp::now().plus_minutes(30),
        );
        fx.registrations
            .insert_pending_if_capacity(&registration, 10)
            .await
            .unwrap();
        registration.confirm(1000).unwrap();
        fx.registrations.update(&registration).await.unwrap();

        let err = fx
            .handler
            .handle(ClaimPointsCommand {
                user_id: user,
                event_id: fx.event.id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RegistrationNotFound);
    }

    #[tokio::test]
    async fn zero_point_event_is_not_claimable() {
        let fx = fixture(0);
        let user = UserId::new();
        completed_registration(&fx, user).await;

        let err = fx
            .handler
            .handle(ClaimPointsCommand {
                user_id: user,
                event_id: fx.event.id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
