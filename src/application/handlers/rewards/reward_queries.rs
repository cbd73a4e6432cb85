//! Read-side handlers for the rewards account.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::registration::RegistrationStatus;
use crate::domain::rewards::{RewardBalance, RewardPointTransaction};
use crate::ports::{EventDirectory, LedgerStore, RegistrationRepository};

/// A user's reward account: current balance plus transaction history.
#[derive(Debug, Clone)]
pub struct RewardAccount {
    pub balance: RewardBalance,
    pub transactions: Vec<RewardPointTransaction>,
}

/// Fetches a user's balance and ledger history.
pub struct GetRewardAccountHandler {
    ledger: Arc<dyn LedgerStore>,
}

impl GetRewardAccountHandler {
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<RewardAccount, DomainError> {
        let balance = self.ledger.balance_of(user_id).await?;
        let transactions = self.ledger.transactions_for(user_id).await?;
        Ok(RewardAccount {
            balance,
            transactions,
        })
    }
}

/// Unclaimed attendance summary: completed registrations the user has not
/// yet converted into points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnclaimedPoints {
    /// Number of claimable registrations.
    pub count: u32,
    /// Points those claims would credit in total.
    pub points: i64,
}

/// Projects a user's unclaimed attendance points. Read-only, no mutation.
pub struct GetUnclaimedPointsHandler {
    registrations: Arc<dyn RegistrationRepository>,
    events: Arc<dyn EventDirectory>,
    ledger: Arc<dyn LedgerStore>,
}

impl GetUnclaimedPointsHandler {
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

    pub async fn handle(&self, user_id: &UserId) -> Result<UnclaimedPoints, DomainError> {
        let registrations = self.registrations.list_for_user(user_id).await?;

        let mut count = 0u32;
        let mut points = 0i64;
        for registration in registrations
            .iter()
            .filter(|r| r.status == RegistrationStatus::Completed)
        {
            if self
                .ledger
                .has_claim_for_event(user_id, &registration.event_id)
                .await?
            {
                continue;
            }
            let Some(event) = self.events.find_by_id(&registration.event_id).await? else {
                continue;
            };
            if event.reward_points > 0 {
                count += 1;
                points += event.reward_points;
            }
        }

        Ok(UnclaimedPoints { count, points })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryEventDirectory, InMemoryLedgerStore, InMemoryRegistrationRepository,
    };
    use crate::domain::events::PlayEvent;
    use crate::domain::foundation::{EventId, RegistrationId, Timestamp};
    use crate::domain::registration::Registration;

    fn past_event(points: i64) -> PlayEvent {
        PlayEvent {
            id: EventId::new(),
            name: "Past Session".to_string(),
            capacity: 10,
            price_cents: 1000,
            currency: "gbp".to_string(),
            scheduled_at: Timestamp::now().minus_days(2),
            reward_points: points,
        }
    }

    async fn completed(
        registrations: &InMemoryRegistrationRepository,
        user: UserId,
        event: &PlayEvent,
    ) -> Registration {
        let mut registration = Registration::new_pending_payment(
            RegistrationId::new(),
            user,
            event.id,
            0,
            Timestamp::now().plus_minutes(30),
        );
        registrations
            .insert_pending_if_capacity(&registration, event.capacity)
            .await
            .unwrap();
        registration.confirm(1000).unwrap();
        registration.complete().unwrap();
        registrations.update(&registration).await.unwrap();
        registration
    }

    #[tokio::test]
    async fn unclaimed_projection_counts_only_unclaimed_completed() {
        let user = UserId::new();
        let claimed_event = past_event(50);
        let unclaimed_event = past_event(30);

        let registrations = Arc::new(InMemoryRegistrationRepository::new());
        let events = Arc::new(InMemoryEventDirectory::with_event(claimed_event.clone()));
        events.add_event(unclaimed_event.clone());
        let ledger = Arc::new(InMemoryLedgerStore::new());

        let claimed_reg = completed(&registrations, user, &claimed_event).await;
        completed(&registrations, user, &unclaimed_event).await;

        // Claim one of the two
        let credit = RewardPointTransaction::attendance_credit(
            user,
            claimed_event.id,
            claimed_reg.id,
            50,
        );
        ledger.append(&credit).await.unwrap();

        let handler = GetUnclaimedPointsHandler::new(registrations, events, ledger);
        let unclaimed = handler.handle(&user).await.unwrap();
        assert_eq!(
            unclaimed,
            UnclaimedPoints {
                count: 1,
                points: 30
            }
        );
    }

    #[tokio::test]
    async fn account_returns_balance_and_history_newest_first() {
        let user = UserId::new();
        let ledger = Arc::new(InMemoryLedgerStore::new());

        let first = RewardPointTransaction::attendance_credit(
            user,
            EventId::new(),
            RegistrationId::new(),
            50,
        );
        ledger.append(&first).await.unwrap();
        let second = RewardPointTransaction::booking_debit(user, 20, "BK-1");
        ledger.append(&second).await.unwrap();

        let handler = GetRewardAccountHandler::new(ledger);
        let account = handler.handle(&user).await.unwrap();

        assert_eq!(account.balance.reward_points, 30);
        assert_eq!(account.transactions.len(), 2);
        assert_eq!(account.transactions[0].id, second.id);
    }
}
