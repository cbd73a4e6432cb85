//! Registration repository port.
//!
//! Defines the contract for persisting Registration aggregates and for the
//! lookup queries the booking handlers and sweep jobs need.
//!
//! # Design
//!
//! - **Capacity-aware inserts**: `insert_pending_if_capacity` performs the
//!   capacity check and the insert atomically, so two concurrent bookings
//!   cannot both take the last slot.
//! - **Waitlist ordering**: positions are assigned by the store at insert
//!   time, inside the same transaction.

use crate::domain::foundation::{DomainError, EventId, RegistrationId, Timestamp, UserId};
use crate::domain::registration::Registration;
use async_trait::async_trait;

/// Repository port for Registration aggregate persistence.
///
/// Implementations must ensure:
/// - At most one active registration per (user, event)
/// - Atomic capacity check on pending inserts
/// - Gap-free waitlist position assignment per event
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Insert a pending-payment registration if, and only if, the event has
    /// at least `registration.party_size()` slots free.
    ///
    /// Slot usage counts the party sizes of all registrations that hold
    /// capacity (pending_payment and confirmed). Returns `true` if the
    /// insert happened, `false` if the event is full.
    ///
    /// # Errors
    ///
    /// - `DuplicateRegistration` if the user already has an active
    ///   registration for the event
    /// - `DatabaseError` on persistence failure
    async fn insert_pending_if_capacity(
        &self,
        registration: &Registration,
        max_capacity: u32,
    ) -> Result<bool, DomainError>;

    /// Insert a waitlisted registration, assigning it the next position in
    /// the event's waitlist. Returns the assigned position (1-based).
    ///
    /// # Errors
    ///
    /// - `DuplicateRegistration` if the user already has an active
    ///   registration for the event
    /// - `DatabaseError` on persistence failure
    async fn insert_waitlisted(&self, registration: &Registration) -> Result<u32, DomainError>;

    /// Update an existing registration.
    ///
    /// # Errors
    ///
    /// - `RegistrationNotFound` if the registration doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, registration: &Registration) -> Result<(), DomainError>;

    /// Find a registration by its ID. Returns `None` if not found.
    async fn find_by_id(&self, id: &RegistrationId)
        -> Result<Option<Registration>, DomainError>;

    /// Find the user's active registration for an event, if any.
    ///
    /// Active means pending_payment, waitlisted or confirmed. Cancelled and
    /// expired registrations do not block a new booking.
    async fn find_active_for_user_event(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<Option<Registration>, DomainError>;

    /// Find the user's completed registration for an event, if any.
    ///
    /// Used by the claim handler to check attendance.
    async fn find_completed_for_user_event(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<Option<Registration>, DomainError>;

    /// List all of a user's registrations, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Registration>, DomainError>;

    /// List all registrations for an event, waitlist in position order.
    async fn list_for_event(&self, event_id: &EventId)
        -> Result<Vec<Registration>, DomainError>;

    /// Find pending_payment registrations whose payment window has closed.
    ///
    /// Used by the expiry sweep. Returns registrations whose
    /// `payment_expires_at` is at or before `cutoff`.
    async fn find_pending_expired(
        &self,
        cutoff: &Timestamp,
    ) -> Result<Vec<Registration>, DomainError>;

    /// Find the head of an event's waitlist (lowest position), if any.
    async fn find_first_waitlisted(
        &self,
        event_id: &EventId,
    ) -> Result<Option<Registration>, DomainError>;

    /// Atomically promote a waitlist head to `pending_payment`, but only
    /// if the promotion still fits.
    ///
    /// Re-checks, under the same lock as `insert_pending_if_capacity`, that
    /// the registration is still waitlisted, is still the head of the
    /// event's queue, and that its whole party fits the remaining capacity.
    /// On success the entry gets the given payment window and gateway
    /// reference and the updated registration is returned; `None` means one
    /// of the conditions no longer held and nothing was changed.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn promote_head_if_capacity(
        &self,
        registration_id: &RegistrationId,
        event_id: &EventId,
        max_capacity: u32,
        payment_expires_at: Timestamp,
        payment_reference: &str,
    ) -> Result<Option<Registration>, DomainError>;

    /// Find registrations that may be owed money: cancelled or expired,
    /// holding a settled payment.
    ///
    /// Candidates for the refund sweep; the sweep filters further on event
    /// date. Never-paid cancellations are terminal and must not be
    /// returned, so the working set stays bounded.
    async fn find_refund_candidates(&self) -> Result<Vec<Registration>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn registration_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn RegistrationRepository) {}
    }
}
