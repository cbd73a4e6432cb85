//! Email notifier port.
//!
//! Transactional emails sent on booking lifecycle changes. Notification
//! failures never fail the triggering operation; handlers log and continue.

use crate::domain::events::PlayEvent;
use crate::domain::foundation::DomainError;
use crate::domain::registration::Registration;
use async_trait::async_trait;

/// Port for sending transactional booking emails.
#[async_trait]
pub trait EmailNotifier: Send + Sync {
    /// Sent when a payment settles and the registration is confirmed.
    async fn booking_confirmed(
        &self,
        recipient: &str,
        registration: &Registration,
        event: &PlayEvent,
    ) -> Result<(), DomainError>;

    /// Sent when a waitlisted member is promoted and given a payment window.
    async fn waitlist_promoted(
        &self,
        recipient: &str,
        registration: &Registration,
        event: &PlayEvent,
    ) -> Result<(), DomainError>;

    /// Sent when the refund sweep returns money for a cancelled booking.
    async fn refund_issued(
        &self,
        recipient: &str,
        registration: &Registration,
        amount_cents: i64,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn email_notifier_is_object_safe() {
        fn _accepts_dyn(_notifier: &dyn EmailNotifier) {}
    }
}
