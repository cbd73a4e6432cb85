//! Reward points domain: the append-only ledger and balance arithmetic.

mod balance;
mod transaction;

pub use balance::RewardBalance;
pub use transaction::{RewardPointTransaction, RewardReason};
