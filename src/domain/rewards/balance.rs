//! Reward balance value object.

use crate::domain::foundation::{DomainError, ErrorCode};
use serde::{Deserialize, Serialize};

/// A user's point balance alongside lifetime totals.
///
/// Invariant: `reward_points == total_points_earned - total_points_spent`,
/// and `reward_points >= 0`. Both are enforced on every application of a
/// delta, so a corrupted cache surfaces as an error instead of a silently
/// wrong balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardBalance {
    pub reward_points: i64,
    pub total_points_earned: i64,
    pub total_points_spent: i64,
}

impl RewardBalance {
    /// A fresh balance with no history.
    pub fn zero() -> Self {
        Self {
            reward_points: 0,
            total_points_earned: 0,
            total_points_spent: 0,
        }
    }

    /// Reconstructs a balance from stored fields, validating the invariant.
    pub fn from_totals(earned: i64, spent: i64, current: i64) -> Result<Self, DomainError> {
        let balance = Self {
            reward_points: current,
            total_points_earned: earned,
            total_points_spent: spent,
        };
        balance.check_invariant()?;
        Ok(balance)
    }

    /// Applies a signed delta, returning the updated balance.
    ///
    /// A zero delta is rejected: every ledger entry must move the balance.
    pub fn apply(&self, delta: i64) -> Result<Self, DomainError> {
        if delta == 0 {
            return Err(DomainError::validation(
                "delta",
                "point delta must be non-zero",
            ));
        }

        let next = if delta > 0 {
            Self {
                reward_points: self.reward_points + delta,
                total_points_earned: self.total_points_earned + delta,
                total_points_spent: self.total_points_spent,
            }
        } else {
            let spend = -delta;
            if spend > self.reward_points {
                return Err(DomainError::new(
                    ErrorCode::InsufficientBalance,
                    format!(
                        "cannot spend {} points, balance is {}",
                        spend, self.reward_points
                    ),
                ));
            }
            Self {
                reward_points: self.reward_points - spend,
                total_points_earned: self.total_points_earned,
                total_points_spent: self.total_points_spent + spend,
            }
        };

        next.check_invariant()?;
        Ok(next)
    }

    fn check_invariant(&self) -> Result<(), DomainError> {
        if self.reward_points < 0 {
            return Err(DomainError::invariant(format!(
                "reward balance is negative: {}",
                self.reward_points
            )));
        }
        if self.reward_points != self.total_points_earned - self.total_points_spent {
            return Err(DomainError::invariant(format!(
                "balance {} does not equal earned {} minus spent {}",
                self.reward_points, self.total_points_earned, self.total_points_spent
            )));
        }
        Ok(())
    }
}

impl Default for RewardBalance {
    fn default() -> Self {
        Self::zero()
    }
}
