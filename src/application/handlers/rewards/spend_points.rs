//! SpendPointsHandler - Command handler for spending points on a booking.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::rewards::{RewardBalance, RewardPointTransaction};
use crate::ports::LedgerStore;

/// Command to spend points as partial or full payment on a booking.
#[derive(Debug, Clone)]
pub struct SpendPointsCommand {
    pub user_id: UserId,
    /// Points to spend; must be at least 1.
    pub points: i64,
    /// Booking reference the spend pays towards.
    pub booking_ref: String,
}

/// Result of a successful spend.
#[derive(Debug, Clone)]
pub struct SpendPointsResult {
    pub points_spent: i64,
    pub balance: RewardBalance,
}

/// Handler for point spends.
///
/// The balance check and the debit happen in one atomic ledger append, so
/// two concurrent spends cannot both drain the same points.
pub struct SpendPointsHandler {
    ledger: Arc<dyn LedgerStore>,
}

impl SpendPointsHandler {
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    pub async fn handle(&self, cmd: SpendPointsCommand) -> Result<SpendPointsResult, DomainError> {
        if cmd.points < 1 {
            return Err(DomainError::validation(
                "points",
                "must spend at least 1 point",
            ));
        }
        if cmd.booking_ref.trim().is_empty() {
            return Err(DomainError::validation(
                "booking_ref",
                "booking reference is required",
            ));
        }

        let debit =
            RewardPointTransaction::booking_debit(cmd.user_id, cmd.points, cmd.booking_ref);
        let balance = self.ledger.append(&debit).await?;

        Ok(SpendPointsResult {
            points_spent: cmd.points,
            balance,
        })
    }
}
