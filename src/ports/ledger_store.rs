//! Reward ledger store port.
//!
//! The ledger is append-only. `append` is the single write path: it must
//! record the transaction and update the cached balance atomically, and it
//! is where the non-negative-balance and double-claim rules are enforced at
//! the storage boundary.

use crate::domain::foundation::{DomainError, EventId, UserId};
use crate::domain::rewards::{RewardBalance, RewardPointTransaction};
use async_trait::async_trait;

/// Storage port for the reward-point ledger.
///
/// Implementations must ensure:
/// - Transaction row insert and balance update happen atomically
/// - A negative resulting balance is rejected with `InsufficientBalance`
/// - At most one event_attendance entry per (user, event), rejected with
///   `AlreadyClaimed` on conflict
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Append a transaction and return the user's updated balance.
    ///
    /// # Errors
    ///
    /// - `InsufficientBalance` if the delta would take the balance negative
    /// - `AlreadyClaimed` if an event_attendance entry already exists for
    ///   the same (user, event)
    /// - `DatabaseError` on persistence failure
    async fn append(
        &self,
        transaction: &RewardPointTransaction,
    ) -> Result<RewardBalance, DomainError>;

    /// Current balance of a user. Users with no ledger history have the
    /// zero balance.
    async fn balance_of(&self, user_id: &UserId) -> Result<RewardBalance, DomainError>;

    /// A user's transactions, newest first.
    async fn transactions_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RewardPointTransaction>, DomainError>;

    /// Whether the user has already claimed attendance points for an event.
    async fn has_claim_for_event(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn ledger_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn LedgerStore) {}
    }
}
