//! Payment repository port.
//!
//! Persists Payment records keyed by the gateway's external reference, which
//! is what webhook events carry.

use crate::domain::foundation::{DomainError, PaymentId, RegistrationId};
use crate::domain::payment::Payment;
use async_trait::async_trait;

/// Repository port for Payment record persistence.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Save a new payment.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the external reference is already recorded
    /// - `DatabaseError` on persistence failure
    async fn save(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Update an existing payment.
    ///
    /// # Errors
    ///
    /// - `PaymentNotFound` if the payment doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Find a payment by its ID. Returns `None` if not found.
    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError>;

    /// Find a payment by the gateway's reference (checkout session or
    /// payment intent id). The webhook handler's primary lookup.
    async fn find_by_external_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Payment>, DomainError>;

    /// Find the paid payment attached to a registration, if any.
    ///
    /// Used by the refund sweep to decide whether there is money to return.
    async fn find_paid_for_registration(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<Option<Payment>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn payment_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PaymentRepository) {}
    }
}
