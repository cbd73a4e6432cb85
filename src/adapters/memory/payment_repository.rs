//! In-memory payment repository.

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, RegistrationId};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::ports::PaymentRepository;
use async_trait::async_trait;
use std::sync::Mutex;

/// Mutex-backed payment store for tests and local development.
#[derive(Default)]
pub struct InMemoryPaymentRepository {
    payments: Mutex<Vec<Payment>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payments(payments: Vec<Payment>) -> Self {
        Self {
            payments: Mutex::new(payments),
        }
    }

    /// Snapshot of all stored payments.
    pub fn all(&self) -> Vec<Payment> {
        self.payments.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
        let mut payments = self.payments.lock().unwrap();
        if payments
            .iter()
            .any(|p| p.external_reference == payment.external_reference)
        {
            return Err(DomainError::validation(
                "external_reference",
                "payment with this reference already exists",
            ));
        }
        payments.push(payment.clone());
        Ok(())
    }

    async fn update(&self, payment: &Payment) -> Result<(), DomainError> {
        let mut payments = self.payments.lock().unwrap();
        match payments.iter_mut().find(|p| p.id == payment.id) {
            Some(existing) => {
                *existing = payment.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::PaymentNotFound,
                format!("payment {} not found", payment.id),
            )),
        }
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        let payments = self.payments.lock().unwrap();
        Ok(payments.iter().find(|p| &p.id == id).cloned())
    }

    async fn find_by_external_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let payments = self.payments.lock().unwrap();
        Ok(payments
            .iter()
            .find(|p| p.external_reference == reference)
            .cloned())
    }

    async fn find_paid_for_registration(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<Option<Payment>, DomainError> {
        let payments = self.payments.lock().unwrap();
        Ok(payments
            .iter()
            .find(|p| {
                p.registration_id.as_ref() == Some(registration_id)
                    && p.status == PaymentStatus::Paid
            })
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentPurpose;

    fn sample_payment(reference: &str) -> Payment {
        Payment::new(
            PaymentId::new(),
            reference,
            1500,
            "gbp",
            PaymentPurpose::PlayBooking,
            Some(RegistrationId::new()),
        )
    }

    #[tokio::test]
    async fn duplicate_reference_is_rejected() {
        let repo = InMemoryPaymentRepository::new();
        repo.save(&sample_payment("cs_123")).await.unwrap();

        let err = repo.save(&sample_payment("cs_123")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn paid_lookup_ignores_unsettled_payments() {
        let repo = InMemoryPaymentRepository::new();
        let mut payment = sample_payment("cs_456");
        let registration_id = payment.registration_id.unwrap();
        repo.save(&payment).await.unwrap();

        assert!(repo
            .find_paid_for_registration(&registration_id)
            .await
            .unwrap()
            .is_none());

        payment.mark_paid().unwrap();
        repo.update(&payment).await.unwrap();

        assert!(repo
            .find_paid_for_registration(&registration_id)
            .await
            .unwrap()
            .is_some());
    }
}
