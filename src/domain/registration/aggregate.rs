//! Registration aggregate entity.
//!
//! A Registration is a user's claim on a capacity slot for an event/play
//! slot. It is created either holding a slot (`pending_payment`) or queued
//! (`waitlisted`), is mutated by payment webhooks, user/admin actions, and
//! reconciliation sweeps, and is never physically deleted: terminal states
//! are retained for audit and point-claim history.
//!
//! # Invariants
//!
//! - At most one active registration per (user, event); enforced by the
//!   repository, asserted here via `status.is_active()`.
//! - Waitlist entries are ordered FIFO per event via `waitlist_position`.
//! - All monetary values are i64 cents.

use crate::domain::foundation::{
    DomainError, EventId, RegistrationId, StateMachine, Timestamp, UserId,
};
use serde::{Deserialize, Serialize};

use super::RegistrationStatus;

/// Registration aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Unique identifier.
    pub id: RegistrationId,

    /// User who made the booking.
    pub user_id: UserId,

    /// Event/play slot being booked.
    pub event_id: EventId,

    /// Current lifecycle status.
    pub status: RegistrationStatus,

    /// Number of guests accompanying the user.
    pub guest_count: u32,

    /// Amount actually collected, in cents. Zero until payment succeeds.
    pub amount_paid_cents: i64,

    /// External gateway reference for the linked payment attempt.
    pub payment_reference: Option<String>,

    /// FIFO queue position while waitlisted.
    pub waitlist_position: Option<u32>,

    /// Deadline for completing payment while in `pending_payment`.
    pub payment_expires_at: Option<Timestamp>,

    /// When the booking request was accepted.
    pub created_at: Timestamp,

    /// When the registration was last mutated.
    pub updated_at: Timestamp,

    /// When the registration was cancelled, if it was.
    pub cancelled_at: Option<Timestamp>,
}

impl Registration {
    /// Create a registration holding a capacity slot, awaiting payment.
    pub fn new_pending_payment(
        id: RegistrationId,
        user_id: UserId,
        event_id: EventId,
        guest_count: u32,
        payment_expires_at: Timestamp,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            user_id,
            event_id,
            status: RegistrationStatus::PendingPayment,
            guest_count,
            amount_paid_cents: 0,
            payment_reference: None,
            waitlist_position: None,
            payment_expires_at: Some(payment_expires_at),
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        }
    }

    /// Create a waitlisted registration. The position is assigned by the
    /// repository inside the same transaction as the insert.
    pub fn new_waitlisted(
        id: RegistrationId,
        user_id: UserId,
        event_id: EventId,
        guest_count: u32,
        waitlist_position: u32,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            user_id,
            event_id,
            status: RegistrationStatus::Waitlisted,
            guest_count,
            amount_paid_cents: 0,
            payment_reference: None,
            waitlist_position: Some(waitlist_position),
            payment_expires_at: None,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        }
    }

    /// Total occupancy this registration claims against event capacity.
    pub fn party_size(&self) -> u32 {
        self.guest_count + 1
    }

    /// Attach the gateway reference for the current payment attempt.
    pub fn set_payment_reference(&mut self, reference: impl Into<String>) {
        self.payment_reference = Some(reference.into());
        self.updated_at = Timestamp::now();
    }

    /// Confirm after a successful payment webhook.
    ///
    /// # Errors
    ///
    /// Conflict error if the current status does not permit confirmation.
    pub fn confirm(&mut self, amount_paid_cents: i64) -> Result<(), DomainError> {
        self.status = self.status.transition_to(RegistrationStatus::Confirmed)?;
        self.amount_paid_cents = amount_paid_cents;
        self.payment_expires_at = None;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Expire a stale pending-payment registration, releasing its slot.
    ///
    /// # Errors
    ///
    /// Conflict error unless the registration is in `pending_payment`.
    pub fn expire(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(RegistrationStatus::Expired)?;
        self.payment_expires_at = None;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Promote a waitlisted registration to `pending_payment` with a fresh
    /// payment window. The expiry clock is reset; the queue position is
    /// cleared.
    ///
    /// # Errors
    ///
    /// Conflict error unless the registration is waitlisted.
    pub fn promote(&mut self, payment_expires_at: Timestamp) -> Result<(), DomainError> {
        self.status = self.status.transition_to(RegistrationStatus::PendingPayment)?;
        self.waitlist_position = None;
        self.payment_expires_at = Some(payment_expires_at);
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Cancel a confirmed or waitlisted registration before the event.
    ///
    /// Any refund owed is issued later by the refund sweep, after the event
    /// has concluded.
    ///
    /// # Errors
    ///
    /// Conflict error if the current status does not permit cancellation.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(RegistrationStatus::Cancelled)?;
        let now = Timestamp::now();
        self.cancelled_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Mark history final once the event's date has passed.
    ///
    /// # Errors
    ///
    /// Conflict error unless the registration is confirmed.
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(RegistrationStatus::Completed)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Record that the collected payment was returned.
    ///
    /// # Errors
    ///
    /// Conflict error unless the registration is cancelled, or expired
    /// with a payment that settled too late to confirm.
    pub fn refund(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(RegistrationStatus::Refunded)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Apply an arbitrary target status through the transition table.
    ///
    /// Used by the admin surface so dashboard edits re-enter the same
    /// validation as every other path.
    pub fn apply_transition(&mut self, target: RegistrationStatus) -> Result<(), DomainError> {
        match target {
            RegistrationStatus::Confirmed => self.confirm(self.amount_paid_cents),
            RegistrationStatus::Expired => self.expire(),
            RegistrationStatus::PendingPayment => {
                // Admin promotion reuses the default window of the sweep;
                // callers supply a concrete expiry via `promote` instead.
                Err(DomainError::validation(
                    "status",
                    "Waitlist promotion must go through the promotion flow",
                ))
            }
            RegistrationStatus::Cancelled => self.cancel(),
            RegistrationStatus::Completed => self.complete(),
            RegistrationStatus::Refunded => self.refund(),
            RegistrationStatus::Waitlisted => Err(DomainError::validation(
                "status",
                "Registrations cannot be moved back onto the waitlist",
            )),
        }
    }
}
