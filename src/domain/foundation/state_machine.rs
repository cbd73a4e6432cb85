//! State machine trait for status enums.
//!
//! Registration and payment statuses are explicit finite-state machines with
//! a transition table (state x target -> allow | reject). Implementors define
//! the table once and get validated transitions for free; an attempted
//! transition outside the table is rejected as a conflict error, never
//! silently ignored.

use super::{DomainError, ErrorCode};

/// Trait for status enums that represent state machines.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if the transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs the transition with validation.
    ///
    /// This is the only sanctioned way to change state; it keeps every
    /// mutation path (webhook, admin update, reconciliation sweep) inside
    /// the same transition table.
    fn transition_to(&self, target: Self) -> Result<Self, DomainError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot transition from {:?} to {:?}", self, target),
            )
            .with_detail("from", format!("{:?}", self))
            .with_detail("to", format!("{:?}", target)))
        }
    }

    /// Checks if the current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
