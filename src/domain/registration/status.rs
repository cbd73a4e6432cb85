//! Registration status state machine.
//!
//! Encodes the full booking lifecycle as an explicit transition table.
//! Payment webhooks, user/admin actions, and reconciliation sweeps all drive
//! status changes through this table; nothing mutates the status directly.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Capacity slot reserved, awaiting payment within the expiry window.
    PendingPayment,

    /// Event was at capacity; queued FIFO for promotion.
    Waitlisted,

    /// Payment succeeded; slot is held until the event occurs.
    Confirmed,

    /// Cancelled by user or admin before the event.
    /// Terminal unless a refund is still owed.
    Cancelled,

    /// Payment window elapsed without a successful payment.
    /// The slot has been released. Terminal unless a late payment settled
    /// anyway, in which case the money still has to come back.
    Expired,

    /// Collected payment returned after the event concluded. Terminal.
    Refunded,

    /// Event occurred with this registration confirmed.
    /// Final history, eligible for point claim. Terminal.
    Completed,
}

impl RegistrationStatus {
    /// Returns true if this registration consumes one of the event's
    /// capacity slots.
    pub fn holds_capacity_slot(&self) -> bool {
        matches!(
            self,
            RegistrationStatus::PendingPayment | RegistrationStatus::Confirmed
        )
    }

    /// Returns true if the registration still counts as active for the
    /// one-active-registration-per-(user, event) rule.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            RegistrationStatus::PendingPayment
                | RegistrationStatus::Waitlisted
                | RegistrationStatus::Confirmed
        )
    }
}

impl StateMachine for RegistrationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use RegistrationStatus::*;
        matches!(
            (self, target),
            // From PENDING_PAYMENT
            (PendingPayment, Confirmed)       // payment webhook
                | (PendingPayment, Expired)   // reconciliation sweep
            // From WAITLISTED
                | (Waitlisted, PendingPayment) // promotion, fresh payment window
                | (Waitlisted, Cancelled)      // user leaves the queue
            // From CONFIRMED
                | (Confirmed, Cancelled)
                | (Confirmed, Completed)       // event date passed
            // From CANCELLED
                | (Cancelled, Refunded)        // deferred refund after event
            // From EXPIRED
                | (Expired, Refunded)          // payment settled after expiry
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use RegistrationStatus::*;
        match self {
            PendingPayment => vec![Confirmed, Expired],
            Waitlisted => vec![PendingPayment, Cancelled],
            Confirmed => vec![Cancelled, Completed],
            Cancelled => vec![Refunded],
            Expired => vec![Refunded],
            Refunded => vec![],
            Completed => vec![],
        }
    }
}
