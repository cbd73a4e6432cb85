//! In-memory reward ledger store.

use crate::domain::foundation::{DomainError, ErrorCode, EventId, UserId};
use crate::domain::rewards::{RewardBalance, RewardPointTransaction};
use crate::ports::LedgerStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

struct LedgerState {
    transactions: Vec<RewardPointTransaction>,
    balances: HashMap<UserId, RewardBalance>,
}

/// Mutex-backed ledger for tests and local development.
///
/// Enforces the same rules as the postgres adapter: atomic append,
/// non-negative balances and one attendance claim per (user, event).
pub struct InMemoryLedgerStore {
    state: Mutex<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState {
                transactions: Vec::new(),
                balances: HashMap::new(),
            }),
        }
    }

    /// Snapshot of every stored transaction.
    pub fn all_transactions(&self) -> Vec<RewardPointTransaction> {
        self.state.lock().unwrap().transactions.clone()
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn append(
        &self,
        transaction: &RewardPointTransaction,
    ) -> Result<RewardBalance, DomainError> {
        let mut state = self.state.lock().unwrap();

        if transaction.is_claim() {
            let duplicate = state.transactions.iter().any(|t| {
                t.is_claim()
                    && t.user_id == transaction.user_id
                    && t.event_id == transaction.event_id
            });
            if duplicate {
                return Err(DomainError::new(
                    ErrorCode::AlreadyClaimed,
                    "points already claimed for this event",
                ));
            }
        }

        let current = state
            .balances
            .get(&transaction.user_id)
            .copied()
            .unwrap_or_default();
        let updated = current.apply(transaction.delta)?;

        state.transactions.push(transaction.clone());
        state.balances.insert(transaction.user_id, updated);
        Ok(updated)
    }

    async fn balance_of(&self, user_id: &UserId) -> Result<RewardBalance, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.balances.get(user_id).copied().unwrap_or_default())
    }

    async fn transactions_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RewardPointTransaction>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut matching: Vec<RewardPointTransaction> = state
            .transactions
            .iter()
            .filter(|t| &t.user_id == user_id)
            .cloned()
            .collect();
        matching.reverse();
        Ok(matching)
    }

    async fn has_claim_for_event(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<bool, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.transactions.iter().any(|t| {
            t.is_claim() && &t.user_id == user_id && t.event_id.as_ref() == Some(event_id)
        }))
    }
}
